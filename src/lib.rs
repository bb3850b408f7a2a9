pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod kv;
pub mod models;
pub mod repl;
pub mod state;
pub mod store;
pub mod view;

/// Install the `env_logger` backend for the `log` facade. `RUST_LOG` overrides the default level.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose || cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .try_init()
        .ok();
}
