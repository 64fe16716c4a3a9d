//! Line-oriented front end driving the controller one command at a time.

use std::{str::FromStr, sync::Arc};

use client_core::{ControllerEvent, DeleteOutcome, ItemListController, SubmitOutcome};
use shared::domain::{DraftField, ItemId};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    sync::broadcast::{self, error::RecvError},
};
use tracing::{debug, warn};

use crate::render::render_view;

pub const HELP: &str = "\
commands:
  list                      reload items from the server
  new                       open the Add Item dialog
  edit <id>                 open the Edit Item dialog for a listed item
  set <name|description> <text>
                            change a field of the open dialog
  submit                    save the open dialog
  cancel                    close the dialog without saving
  delete <id>               delete an item
  show                      print the current view
  help                      print this help
  quit                      leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    New,
    Edit(ItemId),
    Set(DraftField, String),
    Submit,
    Cancel,
    Delete(ItemId),
    Show,
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let required_id = |rest: &str| {
            if rest.is_empty() {
                Err(format!("'{verb}' needs an item id"))
            } else {
                Ok(ItemId::new(rest))
            }
        };

        match verb.to_ascii_lowercase().as_str() {
            "list" | "refresh" => Ok(Self::List),
            "new" | "add" => Ok(Self::New),
            "edit" => required_id(rest).map(Self::Edit),
            "set" => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let field = field.parse::<DraftField>()?;
                // Empty values are allowed; the server decides what it accepts.
                Ok(Self::Set(field, value.trim().to_string()))
            }
            "submit" | "save" => Ok(Self::Submit),
            "cancel" | "close" => Ok(Self::Cancel),
            "delete" | "rm" => required_id(rest).map(Self::Delete),
            "show" | "" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}', try 'help'")),
        }
    }
}

/// Applies one command and renders the resulting view. The flag is `false` once the shell should stop.
pub async fn execute(controller: &ItemListController, command: ShellCommand) -> (bool, String) {
    let note = match command {
        ShellCommand::Quit => return (false, String::new()),
        ShellCommand::Help => return (true, format!("{HELP}\n")),
        ShellCommand::List => {
            controller.load().await;
            None
        }
        ShellCommand::New => {
            controller.open_create_dialog().await;
            None
        }
        ShellCommand::Edit(id) => {
            if controller.open_edit_dialog_by_id(&id).await {
                None
            } else {
                Some(format!("no listed item with id '{id}'"))
            }
        }
        ShellCommand::Set(field, value) => {
            if controller.snapshot().await.dialog_open {
                controller.update_draft_field(field, value).await;
                None
            } else {
                Some("no dialog is open; use 'new' or 'edit <id>'".to_string())
            }
        }
        ShellCommand::Submit => match controller.submit().await {
            SubmitOutcome::Saved | SubmitOutcome::SavedAfterClose => Some("saved".to_string()),
            SubmitOutcome::Failed => None,
            SubmitOutcome::AlreadySubmitting => Some("a save is already in progress".to_string()),
            SubmitOutcome::DialogClosed => Some("no dialog is open".to_string()),
        },
        ShellCommand::Cancel => {
            controller.close_dialog().await;
            None
        }
        ShellCommand::Delete(id) => match controller.delete(&id).await {
            DeleteOutcome::Deleted => Some(format!("deleted {id}")),
            DeleteOutcome::Failed => None,
        },
        ShellCommand::Show => None,
    };

    let mut out = render_view(&controller.snapshot().await);
    if let Some(note) = note {
        out.push_str(&format!("{note}\n"));
    }
    (true, out)
}

/// Logs controller events until the controller is dropped. Returns how many were logged.
pub async fn log_events(mut events: broadcast::Receiver<ControllerEvent>) -> usize {
    let mut logged = 0;
    loop {
        match events.recv().await {
            Ok(event) => {
                debug!(?event, "controller event");
                logged += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "controller event log fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
    logged
}

pub async fn run(controller: Arc<ItemListController>) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let event_log = tokio::spawn(log_events(controller.subscribe_events()));

    stdout.write_all(format!("{HELP}\n\n").as_bytes()).await?;
    let (_, view) = execute(&controller, ShellCommand::Show).await;
    stdout.write_all(view.as_bytes()).await?;

    loop {
        stdout.write_all(b"items> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let output = match line.parse::<ShellCommand>() {
            Ok(command) => {
                let (keep_going, output) = execute(&controller, command).await;
                if !keep_going {
                    break;
                }
                output
            }
            Err(message) => format!("{message}\n"),
        };
        stdout.write_all(output.as_bytes()).await?;
    }

    event_log.abort();
    Ok(())
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
