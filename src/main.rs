use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use shieldmate_lib::commands::{chat_commands, session_commands, settings_commands};
use shieldmate_lib::config::{AppConfig, ConfigOverrides};
use shieldmate_lib::gateway::AskOptions;
use shieldmate_lib::models::mode::Mode;
use shieldmate_lib::state::AppState;
use shieldmate_lib::view::breach::BreachTable;
use shieldmate_lib::view::{SendOutcome, SidebarItem};

#[derive(Parser)]
#[command(name = "shieldmate")]
#[command(about = "Shield Mate - cybersecurity assistant chat client", long_about = None)]
struct Cli {
    /// Profile directory (default: ~/.shieldmate)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// API base URL (default: $SHIELDMATE_API_BASE_URL or http://localhost:5000)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage chats
    Chats {
        #[command(subcommand)]
        action: ChatAction,
    },
    /// List the available functions
    Modes,
    /// Lock the active chat to a function
    Mode { key: Mode },
    /// Send a message in the active chat
    Send {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Breach check: include unverified breaches
        #[arg(long)]
        include_unverified: bool,
        /// Breach check: ask the API for truncated records
        #[arg(long)]
        truncate: bool,
        /// Breach check: only breaches of this domain
        #[arg(long)]
        domain: Option<String>,
    },
    /// Show the active chat
    Show,
    /// Show or change the data-sharing opt-in
    Share { state: Option<Toggle> },
    /// Print the client identifier
    ClientId,
    /// Check that the API is reachable
    Health,
    /// Interactive session
    Repl,
}

#[derive(Subcommand)]
enum ChatAction {
    /// List chats, newest first
    List,
    /// Start a new chat and make it active
    New,
    /// Make a chat active (list number, id or id prefix)
    Select { chat: String },
    /// Rename a chat
    Rename { chat: String, title: Vec<String> },
    /// Delete a chat
    Delete { chat: String },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Toggle {
    On,
    Off,
    Status,
}

fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}

fn print_chat_list(items: &Vec<SidebarItem>) {
    if items.is_empty() {
        println!("(no chats)");
    }
    for (i, item) in items.iter().enumerate() {
        let marker = if item.active { "*" } else { " " };
        println!("{marker} {:>2}. {}  {}", i + 1, item.title, item.id);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    shieldmate_lib::init_logging(cli.verbose);

    let config = AppConfig::from_env(ConfigOverrides {
        api_base_url: cli.api_base,
        data_dir: cli.data_dir,
        timeout_secs: cli.timeout_secs,
    })?;
    let state = AppState::open(config).context("Failed to open profile")?;
    let json = cli.json;

    match cli.command {
        Commands::Chats { action } => match action {
            ChatAction::List => {
                let items = session_commands::list_chats(&state)?;
                emit(json, &items, print_chat_list)?;
            }
            ChatAction::New => {
                let chat = session_commands::create_chat(&state)?;
                emit(json, &chat, |c| println!("Started {} ({})", c.display_title(), c.id))?;
            }
            ChatAction::Select { chat } => {
                let chat = session_commands::select_chat(&state, &chat)?;
                emit(json, &chat, |c| println!("Active: {}", c.display_title()))?;
            }
            ChatAction::Rename { chat, title } => {
                let chat = session_commands::rename_chat(&state, &chat, &title.join(" "))?;
                emit(json, &chat, |c| println!("Renamed to {}", c.display_title()))?;
            }
            ChatAction::Delete { chat } => {
                let items = session_commands::delete_chat(&state, &chat)?;
                emit(json, &items, print_chat_list)?;
            }
        },
        Commands::Modes => {
            let modes: Vec<Mode> = Mode::ALL.to_vec();
            emit(json, &modes, |modes| {
                for m in modes {
                    println!("{:<14} {:<17} {}", m.key(), m.label(), m.hint());
                }
            })?;
        }
        Commands::Mode { key } => {
            let view = chat_commands::choose_mode(&state, key)?;
            emit(json, &view, |v| print!("{v}"))?;
        }
        Commands::Send {
            text,
            include_unverified,
            truncate,
            domain,
        } => {
            let options = AskOptions {
                include_unverified,
                truncate,
                domain,
            };
            let outcome = chat_commands::send_message(&state, &text.join(" "), options).await?;
            emit(json, &outcome, |outcome| match outcome {
                SendOutcome::Replied(reply) => match reply.email_check_payload() {
                    Some(payload) => print!("{}", BreachTable::from_response(payload)),
                    None => println!("{}", reply.content),
                },
                SendOutcome::NeedsMode => {
                    println!("This chat has no function yet. Pick one with `shieldmate mode <key>`.")
                }
                SendOutcome::Ignored => println!("Nothing to send."),
                SendOutcome::Superseded => {}
            })?;
        }
        Commands::Show => {
            let view = chat_commands::show_chat(&state)?;
            emit(json, &view, |v| print!("{v}"))?;
        }
        Commands::Share { state: toggle } => {
            let profile = match toggle {
                Some(Toggle::On) => settings_commands::update_share(&state, true)?,
                Some(Toggle::Off) => settings_commands::update_share(&state, false)?,
                Some(Toggle::Status) | None => settings_commands::get_profile(&state)?,
            };
            emit(json, &profile, |p| {
                println!("Share data: {}", if p.share { "on" } else { "off" })
            })?;
        }
        Commands::ClientId => {
            let profile = settings_commands::get_profile(&state)?;
            emit(json, &profile, |p| println!("{}", p.client_id))?;
        }
        Commands::Health => {
            let healthy = settings_commands::check_health(&state).await?;
            emit(json, &healthy, |ok| {
                println!("{}: {}", state.config.api_base_url, if *ok { "ok" } else { "unhealthy" })
            })?;
        }
        Commands::Repl => {
            shieldmate_lib::repl::run(state, AskOptions::default()).await?;
        }
    }

    Ok(())
}
