//! Recipebox - browse a remote recipe catalog from the terminal.
//!
//! Fetches the configured catalog, prints it grouped by cuisine, and keeps
//! recipe photos in a local cache for later runs.

use std::io;
use std::process::ExitCode;

use anyhow::{bail, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use recipebox_core::utils::{format_bytes, format_optional, truncate_string};
use recipebox_core::{CatalogClient, CatalogError, Config, SortOrder};

/// Longest recipe name printed before truncation
const MAX_NAME_WIDTH: usize = 40;

const USAGE: &str = "\
Usage: recipebox [COMMAND]

Commands:
  list [--search <text>] [--desc]   Print the catalog grouped by cuisine (default)
  images                            Download missing recipe photos into the cache
  cache                             Show cached photos
  clear-cache                       Delete all cached photos

Environment:
  RECIPEBOX_CATALOG_URL, RECIPEBOX_CACHE_DIR, RECIPEBOX_TIMEOUT_SECS, RUST_LOG";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List { search: String, order: SortOrder },
    Images,
    Cache,
    ClearCache,
    Help,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn parse_args(args: &[String]) -> Result<Command> {
    let Some(first) = args.first() else {
        return Ok(Command::List {
            search: String::new(),
            order: SortOrder::default(),
        });
    };

    match first.as_str() {
        "list" => {
            let mut search = String::new();
            let mut order = SortOrder::default();
            let mut rest = args[1..].iter();
            while let Some(arg) = rest.next() {
                match arg.as_str() {
                    "--search" | "-s" => match rest.next() {
                        Some(q) => search = q.clone(),
                        None => bail!("--search needs a value"),
                    },
                    "--desc" => order = SortOrder::NameDescending,
                    "--asc" => order = SortOrder::NameAscending,
                    other => bail!("Unknown option for list: {}", other),
                }
            }
            Ok(Command::List { search, order })
        }
        "images" => Ok(Command::Images),
        "cache" => Ok(Command::Cache),
        "clear-cache" => Ok(Command::ClearCache),
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(CatalogError::Api(api)) = e.downcast_ref::<CatalogError>() {
                if api.is_transient() {
                    eprintln!("Check your connection and run the command again.");
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &[String]) -> Result<()> {
    let command = parse_args(args)?;
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::load()?;
    let client = CatalogClient::from_config(&config)?;
    info!(url = %config.catalog_url, cache = %client.images().cache_dir().display(), "Recipebox starting");

    match command {
        Command::List { search, order } => list(&client, &config, &search, order).await,
        Command::Images => warm_images(&client, &config).await,
        Command::Cache => show_cache(&client).await,
        Command::ClearCache => {
            let removed = client.clear_image_cache().await?;
            println!("Deleted {} cached image(s)", removed);
            Ok(())
        }
        Command::Help => Ok(()),
    }
}

async fn list(client: &CatalogClient, config: &Config, search: &str, order: SortOrder) -> Result<()> {
    let catalog = client.fetch_catalog(&config.catalog_url).await?;
    let sections = catalog.grouped(search, order);

    if sections.is_empty() {
        println!("No Recipes Found");
        return Ok(());
    }

    println!("{} recipes, sorted {}", catalog.len(), order.label());
    for (cuisine, recipes) in &sections {
        println!("\n{}", cuisine);
        for recipe in recipes {
            let photo = if client.images().contains(&recipe.id).await {
                "cached"
            } else {
                "-"
            };
            println!(
                "  {:<width$}  {:<6}  {}",
                truncate_string(&recipe.name, MAX_NAME_WIDTH),
                photo,
                format_optional(&recipe.source_url, ""),
                width = MAX_NAME_WIDTH
            );
            if let Some(video) = recipe.video_link() {
                println!("  {:<width$}  video: {}", "", video, width = MAX_NAME_WIDTH);
            }
        }
    }
    Ok(())
}

async fn warm_images(client: &CatalogClient, config: &Config) -> Result<()> {
    let catalog = client.fetch_catalog(&config.catalog_url).await?;
    let report = client.prefetch_images(&catalog).await;
    println!(
        "{} already cached, {} downloaded, {} failed",
        report.cached, report.fetched, report.failed
    );
    if report.failed > 0 {
        warn!(failed = report.failed, "Some images could not be cached");
    }
    Ok(())
}

async fn show_cache(client: &CatalogClient) -> Result<()> {
    let entries = client.cache_status().await?;
    println!("{}", client.images().cache_dir().display());
    if entries.is_empty() {
        println!("  (empty)");
        return Ok(());
    }

    let total: u64 = entries.iter().map(|e| e.size_bytes).sum();
    for entry in &entries {
        println!(
            "  {:<40}  {:>10}  {}",
            entry.id,
            format_bytes(entry.size_bytes),
            entry.age_display()
        );
    }
    println!("{} image(s), {}", entries.len(), format_bytes(total));
    Ok(())
}
