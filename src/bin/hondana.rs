//! Command line front-end for a Komga server.
//!
//! Every command prints JSON on stdout; logs go to stderr and are filtered
//! with `RUST_LOG` (default `hondana=info`).

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use hondana::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "hondana", version, about = "Browse a Komga server from the terminal")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, default_value = "hondana.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the metadata of a series
    Series { id: String },
    /// List the chapters of a series
    Chapters { series_id: String },
    /// List the page URLs of a chapter
    Pages { series_id: String, chapter_id: String },
    /// Search the catalog
    Search {
        title: Option<String>,
        #[arg(long)]
        page: Option<Cursor>,
    },
    /// Load the home sections
    Home,
    /// Continue a home section
    More {
        section_id: String,
        #[arg(long)]
        page: Option<Cursor>,
    },
    /// Report which series changed since a point in time
    Updates {
        /// RFC 3339 watermark, e.g. 2024-05-01T00:00:00Z
        #[arg(long)]
        since: DateTime<Utc>,
        /// Series ids of interest
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> hondana::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn execute(source: &KomgaSource, command: Command) -> hondana::Result<()> {
    match command {
        Command::Series { id } => print_json(&source.get_series_detail(&id).await?),
        Command::Chapters { series_id } => print_json(&source.list_chapters(&series_id).await?),
        Command::Pages {
            series_id,
            chapter_id,
        } => print_json(&source.get_chapter_detail(&series_id, &chapter_id).await?),
        Command::Search { title, page } => {
            let request = SearchRequest { title };
            print_json(&source.search(&request, page).await?)
        }
        Command::Home => {
            let mut resolved = Vec::new();
            source
                .get_home_sections(&mut |section: Section| {
                    if section.is_pending() {
                        eprintln!("loading {}...", section.title);
                    } else {
                        resolved.push(section);
                    }
                })
                .await?;
            print_json(&resolved)
        }
        Command::More { section_id, page } => {
            print_json(&source.view_more_section(&section_id, page).await?)
        }
        Command::Updates { since, ids } => {
            let interest: HashSet<String> = ids.into_iter().collect();
            let mut updated = Vec::new();
            source
                .scan_for_updates(since, &interest, &mut |batch: HashSet<String>| updated.extend(batch))
                .await?;
            updated.sort();
            print_json(&updated)
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hondana=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Cli { config, command } = Cli::parse();

    let result = async move {
        let config = KomgaConfig::from_file(&config).await?;
        let source = KomgaSource::new(config)?;
        execute(&source, command).await
    }
    .await;

    if let Err(e) = result {
        if e.is_source_unavailable() {
            tracing::error!("source unavailable: {}", e);
        } else {
            tracing::error!("{}", e);
        }
        std::process::exit(1);
    }
}
