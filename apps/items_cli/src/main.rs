use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    DeleteOutcome, HttpItemsApi, ItemListController, LoadOutcome, SubmitOutcome, ViewSnapshot,
};
use shared::domain::{DraftField, ItemId};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod shell;

use config::{load_settings, normalize_base_url};
use render::{render_table, render_view};

#[derive(Parser, Debug)]
#[command(about = "List, add, edit and delete items on a remote /api/items server")]
struct Cli {
    /// Config file (defaults to ./items.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base url of the items server; overrides config and environment.
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the item table.
    List,
    /// Create an item.
    Add {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Change the fields of an existing item; omitted fields keep their value.
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
    /// Interactive shell (the default).
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(api_url) = &cli.api_url {
        settings.api_base_url = normalize_base_url(api_url);
    }

    let api = HttpItemsApi::with_timeout(&settings.api_base_url, settings.request_timeout())
        .context("failed to build items api client")?;
    info!(base_url = %api.base_url(), "using items server");
    let controller = ItemListController::new(Arc::new(api));

    if controller.load().await == LoadOutcome::Failed
        && !matches!(cli.command, None | Some(Command::Shell))
    {
        bail!("{}", failure_text(&controller.snapshot().await));
    }

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => shell::run(controller).await?,
        Command::List => print!("{}", render_table(&controller.snapshot().await.items)),
        Command::Add { name, description } => {
            controller.open_create_dialog().await;
            controller.update_draft_field(DraftField::Name, name).await;
            controller
                .update_draft_field(DraftField::Description, description)
                .await;
            finish_submit(&controller).await?;
        }
        Command::Edit {
            id,
            name,
            description,
        } => {
            let id = ItemId::new(id);
            if !controller.open_edit_dialog_by_id(&id).await {
                bail!("no item with id '{id}'");
            }
            if let Some(name) = name {
                controller.update_draft_field(DraftField::Name, name).await;
            }
            if let Some(description) = description {
                controller
                    .update_draft_field(DraftField::Description, description)
                    .await;
            }
            finish_submit(&controller).await?;
        }
        Command::Delete { id } => {
            let id = ItemId::new(id);
            if controller.delete(&id).await == DeleteOutcome::Failed {
                bail!("{}", failure_text(&controller.snapshot().await));
            }
            print!("{}", render_view(&controller.snapshot().await));
        }
    }

    Ok(())
}

async fn finish_submit(controller: &ItemListController) -> Result<()> {
    match controller.submit().await {
        SubmitOutcome::Saved | SubmitOutcome::SavedAfterClose => {
            print!("{}", render_view(&controller.snapshot().await));
            Ok(())
        }
        _ => bail!("{}", failure_text(&controller.snapshot().await)),
    }
}

fn failure_text(snapshot: &ViewSnapshot) -> String {
    snapshot
        .last_error
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "operation did not complete".to_string())
}
