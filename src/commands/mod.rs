//! Handlers behind the CLI subcommands and REPL slash-commands.

pub mod chat_commands;
pub mod session_commands;
pub mod settings_commands;
