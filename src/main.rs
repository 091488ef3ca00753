//! Asset catalog command-line client.
//!
//! Drives the catalog library against the configured backend.

use std::path::PathBuf;

use asset_catalog::{
    Catalog, CatalogConfig, CatalogState, CategoryId, DragEnd, DragOutcome, LoadState,
};
use clap::{Parser, Subcommand};
use rolling_logger::LoggerOptions;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "asset-catalog")]
#[command(about = "Asset catalog with category board")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $ASSET_CATALOG_CONFIG or ./asset-catalog.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a session
    Login,
    /// End the session
    Logout,
    /// List categories and items
    List,
    /// Show items grouped by category in board order
    Board,
    /// Create a category
    AddCategory { name: String },
    /// Delete a category; its items become unassigned
    DeleteCategory { id: String },
    /// Move an item into another category
    MoveItem { item_id: String, category_id: String },
    /// Move a category column to another board position
    Reorder { from: usize, to: usize },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CatalogConfig::load(path)?,
        None => CatalogConfig::from_env()?,
    };

    let mut log_options = LoggerOptions::new(config.log_dir.clone(), "asset-catalog");
    log_options.max_bytes = config.log_max_bytes;
    log_options.max_files = config.log_max_files;
    if let Err(e) = rolling_logger::init_with(log_options) {
        eprintln!("logging disabled: {}", e);
    }

    let catalog = Catalog::from_config(&config)?;

    match cli.command {
        Command::Login => {
            catalog.session().login();
            println!("Signed in.");
            return Ok(());
        }
        Command::Logout => {
            catalog.session().logout();
            println!("Signed out.");
            return Ok(());
        }
        _ => {}
    }

    if !catalog.session().is_authenticated() {
        return Err("not signed in; run `asset-catalog login` first".into());
    }
    if let LoadState::Failed(message) = catalog.fetch_data().await {
        return Err(format!("could not load catalog: {}", message).into());
    }

    match cli.command {
        Command::Login | Command::Logout => {}
        Command::List => print_list(&catalog.snapshot()),
        Command::Board => print_board(&catalog.snapshot()),
        Command::AddCategory { name } => {
            let category = catalog.add_category(&name).await?;
            println!("Added category {} ({})", category.name, category.id);
        }
        Command::DeleteCategory { id } => {
            let orphaned = catalog.delete_category(&CategoryId::from(id.as_str())).await?;
            println!("Deleted category {}; {} item(s) now unassigned", id, orphaned);
        }
        Command::MoveItem {
            item_id,
            category_id,
        } => {
            let outcome = catalog
                .on_drag_end(DragEnd::item(item_id.as_str(), category_id.as_str(), 0))
                .await;
            report_outcome(&outcome);
            print_board(&catalog.snapshot());
        }
        Command::Reorder { from, to } => {
            let dragged = catalog
                .snapshot()
                .categories
                .get(from)
                .map(|c| c.id.to_string())
                .unwrap_or_default();
            let outcome = catalog.on_drag_end(DragEnd::category(dragged, from, to)).await;
            report_outcome(&outcome);
            print_board(&catalog.snapshot());
        }
    }

    Ok(())
}

fn report_outcome(outcome: &DragOutcome) {
    match outcome {
        DragOutcome::NoIntent | DragOutcome::Unchanged => println!("Nothing to change."),
        DragOutcome::CategoriesReordered { from, to } => println!("Moved column {} to {}.", from, to),
        DragOutcome::ItemReassigned { item } => println!("Moved {} ({}).", item.name, item.id),
        DragOutcome::ReassignFailed {
            item_id,
            error,
            reverted,
        } => {
            let local = if *reverted { "reverted" } else { "kept locally" };
            eprintln!("Could not save move of {}: {} ({})", item_id, error, local);
        }
    }
}

fn print_list(state: &CatalogState) {
    println!("Categories:");
    for category in &state.categories {
        println!("  {:<12} {}", category.id.as_str(), category.name);
    }
    println!("Items:");
    for item in &state.items {
        println!(
            "  {:<12} {:<24} {:<10} {}  {}",
            item.id.as_str(),
            item.name,
            item.department,
            item.issued_date,
            state.category_name(item).unwrap_or("N/A")
        );
    }
}

fn print_board(state: &CatalogState) {
    for column in state.board() {
        println!("[{}] {}", column.category.id, column.category.name);
        for item in column.items {
            println!("    {} ({})", item.name, item.id);
        }
    }
    let unassigned = state.unassigned_items();
    if !unassigned.is_empty() {
        println!("Unassigned");
        for item in unassigned {
            println!("    {} ({})", item.name, item.id);
        }
    }
}
