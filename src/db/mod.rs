pub mod kv_repo;
pub mod migrations;
