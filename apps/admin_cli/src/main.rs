use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{CatalogEvent, CatalogScreen, FormField, HttpProductClient, RefreshOutcome};
use shared::{domain::ProductId, protocol::PageShape};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast,
};
use tracing_subscriber::EnvFilter;

mod browse;
mod config;
mod render;

use browse::{flush_events, Flushed};
use config::load_settings;
use render::{product_table, render_list};

#[derive(Parser, Debug)]
#[command(name = "catalog-admin", about = "Manage the product catalog over its REST API")]
struct Args {
    /// Settings file (defaults to ./catalog.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Product resource base URL, e.g. http://localhost:8080/api/products
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Where the paged endpoint reports its total: auto, flat or nested
    #[arg(long, global = true)]
    page_shape: Option<PageShape>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show one page of products
    List {
        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: i64,
        #[arg(long)]
        size: Option<u32>,
    },
    /// Show every product
    All,
    /// Show a single product
    Get { id: i64 },
    /// Show products with exactly this price
    ByPrice { price: f64 },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Change some fields of a product; the rest keep their stored values
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Interactive paging and editing session
    Browse,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    settings.apply_overrides(args.api_url, args.page_shape);
    if let Command::List {
        size: Some(size), ..
    } = args.command
    {
        settings.page_size = size;
    }

    let client = HttpProductClient::with_options(&settings.api_base_url, settings.client_options())
        .context("failed to build product api client")?;
    let mut screen = CatalogScreen::new(Arc::new(client), settings.screen_options());
    let mut events = screen.subscribe();

    let result = run(args.command, &mut screen, &mut events).await;
    let flushed = flush_events(&mut events);
    exit_status(result, flushed)
}

/// A failed command whose failure was already printed as a notice exits
/// non-zero without repeating it; any other error is returned to be printed.
fn exit_status(result: Result<()>, flushed: Flushed) -> Result<ExitCode> {
    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) if flushed.failures > 0 => {
            tracing::debug!(error = %err, "command failed after reporting a notice");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err),
    }
}

async fn run(
    command: Command,
    screen: &mut CatalogScreen,
    events: &mut broadcast::Receiver<CatalogEvent>,
) -> Result<()> {
    match command {
        Command::List { page, .. } => {
            let outcome = screen.list().open_page(page).await;
            if outcome == RefreshOutcome::Failed {
                bail!("failed to fetch products");
            }
            println!("{}", render_list(&screen.list().snapshot().await));
        }
        Command::All => {
            let products = screen.api().get_all().await?;
            println!("{}", product_table(&products));
        }
        Command::Get { id } => {
            let product = screen.api().get_by_id(ProductId(id)).await?;
            println!("{}", product_table(std::slice::from_ref(&product)));
        }
        Command::ByPrice { price } => {
            let products = screen.api().get_by_price(price).await?;
            println!("{}", product_table(&products));
        }
        Command::Create {
            name,
            price,
            description,
        } => {
            screen.open_create();
            screen.set_field(FormField::Name, &name)?;
            screen.set_field(FormField::Price, &price)?;
            if let Some(description) = description {
                screen.set_field(FormField::Description, &description)?;
            }
            let created = screen.submit_form().await?;
            println!("{}", product_table(std::slice::from_ref(&created)));
        }
        Command::Update {
            id,
            name,
            price,
            description,
        } => {
            let current = screen.api().get_by_id(ProductId(id)).await?;
            screen.open_edit(current);
            let edits = [
                (FormField::Name, name),
                (FormField::Price, price),
                (FormField::Description, description),
            ];
            for (field, value) in edits {
                if let Some(value) = value {
                    screen.set_field(field, &value)?;
                }
            }
            let updated = screen.submit_form().await?;
            println!("{}", product_table(std::slice::from_ref(&updated)));
        }
        Command::Delete { id, yes } => {
            let id = ProductId(id);
            screen.request_delete(id);
            if !yes && !confirm(&format!("Delete product {id}? [y/N] ")).await? {
                screen.cancel_delete();
                println!("cancelled");
                return Ok(());
            }
            screen.confirm_delete().await?;
        }
        Command::Browse => browse::run(screen, events, tokio::io::stdin()).await?,
    }
    Ok(())
}

async fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{prompt}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
