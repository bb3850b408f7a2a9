pub mod ask;
pub mod breach;
pub mod chat;
pub mod message;
pub mod mode;
pub mod session;
