//! Interactive session: sidebar and chat panel mounted side by side over one store.

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::session_commands::resolve_chat;
use crate::error::AppResult;
use crate::gateway::AskOptions;
use crate::models::mode::Mode;
use crate::state::AppState;
use crate::view::breach::BreachTable;
use crate::view::{ChatPanel, SendOutcome, Sidebar};

const HELP: &str = "\
/chats                list chats
/new                  start a new chat
/open <chat>          switch to a chat (number, id or id prefix)
/rename <chat> <title>
/delete <chat>
/mode <key>           lock this chat to phishng | wifisec | cybersec | emailbreached
/share on|off         data-sharing opt-in
/help
/quit
Anything else is sent to the assistant.";

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Chats,
    New,
    Open(&'a str),
    Rename(&'a str, &'a str),
    Delete(&'a str),
    Mode(&'a str),
    Share(bool),
    Help,
    Quit,
    Send(&'a str),
}

fn parse(line: &str) -> Result<Input<'_>, String> {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return Ok(Input::Send(line));
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };
    let need = |what: &str| format!("/{name} needs {what}");

    match name {
        "chats" => Ok(Input::Chats),
        "new" => Ok(Input::New),
        "open" if !rest.is_empty() => Ok(Input::Open(rest)),
        "open" => Err(need("a chat")),
        "rename" => match rest.split_once(char::is_whitespace) {
            Some((chat, title)) => Ok(Input::Rename(chat, title.trim())),
            None => Err(need("a chat and a title")),
        },
        "delete" if !rest.is_empty() => Ok(Input::Delete(rest)),
        "delete" => Err(need("a chat")),
        "mode" if !rest.is_empty() => Ok(Input::Mode(rest)),
        "mode" => Err(need("a mode key")),
        "share" => match rest {
            "on" => Ok(Input::Share(true)),
            "off" => Ok(Input::Share(false)),
            _ => Err(need("on or off")),
        },
        "help" => Ok(Input::Help),
        "quit" | "exit" => Ok(Input::Quit),
        other => Err(format!("Unknown command /{other}, try /help")),
    }
}

fn print_chats(sidebar: &Sidebar) {
    if sidebar.chats().is_empty() {
        println!("(no chats)");
    }
    for (i, item) in sidebar.items().iter().enumerate() {
        let marker = if item.active { "*" } else { " " };
        println!("{marker} {:>2}. {}", i + 1, item.title);
    }
}

/// Apply one line of input. Returns `false` when the session should end.
async fn handle(input: Input<'_>, sidebar: &mut Sidebar, panel: &ChatPanel) -> AppResult<bool> {
    match input {
        Input::Quit => return Ok(false),
        Input::Help => println!("{HELP}"),
        Input::Chats => {
            sidebar.refresh();
            print_chats(sidebar);
        }
        Input::New => {
            sidebar.new_chat()?;
            print!("{}", panel.view());
        }
        Input::Open(reference) => {
            sidebar.refresh();
            let id = resolve_chat(sidebar.chats(), reference)?;
            sidebar.select(&id)?;
            print!("{}", panel.view());
        }
        Input::Rename(reference, title) => {
            sidebar.refresh();
            let id = resolve_chat(sidebar.chats(), reference)?;
            sidebar.rename(&id, title)?;
            print_chats(sidebar);
        }
        Input::Delete(reference) => {
            sidebar.refresh();
            let id = resolve_chat(sidebar.chats(), reference)?;
            sidebar.delete(&id)?;
            print_chats(sidebar);
        }
        Input::Mode(key) => {
            let mode: Mode = key.parse()?;
            panel.choose_mode(mode)?;
            println!("{}", panel.locked_note());
        }
        Input::Share(share) => {
            sidebar.set_share(share)?;
            println!("Share data: {}", if share { "on" } else { "off" });
        }
        Input::Send(text) => match panel.send(text).await? {
            SendOutcome::Replied(reply) => match reply.email_check_payload() {
                Some(payload) => print!("{}", BreachTable::from_response(payload)),
                None => println!("{}", reply.content),
            },
            SendOutcome::NeedsMode => {
                println!("Pick a function first with /mode <key>:");
                print!("{}", panel.view());
            }
            SendOutcome::Ignored | SendOutcome::Superseded => {}
        },
    }
    Ok(true)
}

pub async fn run(state: AppState, options: AskOptions) -> AppResult<()> {
    let mut sidebar = Sidebar::mount(state.store.clone())?;
    let panel = ChatPanel::mount(state.store.clone(), state.gateway.clone(), options)?;
    sidebar.refresh();

    println!("Shield Mate - client {}", sidebar.client_id_short());
    print!("{}", panel.view());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = match parse(&line) {
            Ok(input) => input,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };

        let result = handle(input, &mut sidebar, &panel).await;

        match result {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("{e}"),
        }
    }

    log::debug!("REPL finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("hello there").unwrap(), Input::Send("hello there"));
        assert_eq!(parse("/open 2").unwrap(), Input::Open("2"));
        assert_eq!(parse("/rename 1  Home router ").unwrap(), Input::Rename("1", "Home router"));
        assert_eq!(parse("/share on").unwrap(), Input::Share(true));
        assert_eq!(parse("/mode wifisec").unwrap(), Input::Mode("wifisec"));
        assert_eq!(parse("/quit").unwrap(), Input::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("/open").unwrap_err(), "/open needs a chat");
        assert_eq!(parse("/share maybe").unwrap_err(), "/share needs on or off");
        assert!(parse("/frobnicate").unwrap_err().starts_with("Unknown command"));
    }
}
