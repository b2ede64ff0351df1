// Interactive SnapGrade client
use std::io::{Write, stdout};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use snapgrade_common::models::SignedInTier;
use snapgrade_core::{AppConfig, ScanService};
use snapgrade_tui::commands::{dispatch, load_candidate};
use snapgrade_tui::render::{header_line, render_error, render_results};

#[derive(Parser, Debug)]
#[command(name = "snapgrade", about = "Grade product photos from the terminal")]
struct Args {
    /// Load environment overrides from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Start in bulk mode, so every given image is queued
    #[arg(long)]
    bulk: bool,

    /// Sign in before the first prompt (free or paid)
    #[arg(long)]
    login: Option<SignedInTier>,

    /// Scan the given images once and exit
    #[arg(long, requires = "images")]
    once: bool,

    /// Images to queue at startup
    images: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = &args.env_file {
        dotenv::from_path(path)
            .with_context(|| format!("failed to load env file {}", path.display()))?;
        info!("Loaded environment overrides from {}", path.display());
    }

    let config = AppConfig::from_env()?;
    let mut service = ScanService::from_config(&config);
    service.set_bulk_mode(args.bulk);
    if let Some(tier) = args.login {
        service.login(tier);
    }

    let mut files = Vec::with_capacity(args.images.len());
    for path in &args.images {
        match load_candidate(path).await {
            Ok(file) => files.push(file),
            Err(msg) => eprintln!("{}", msg),
        }
    }
    if !files.is_empty() {
        if let Err(e) = service.add_files(files) {
            eprintln!("{}", e);
        }
    }

    let limits = *service.ledger().limits();

    if args.once {
        let names: Vec<String> = service
            .selection()
            .images()
            .iter()
            .map(|img| img.display_name().to_string())
            .collect();
        return match service.scan().await {
            Ok(results) => {
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                println!("{}", render_results(results, &names));
                Ok(())
            }
            Err(e) => {
                println!("{}", render_error(&e, &limits));
                std::process::exit(1);
            }
        };
    }

    println!("SnapGrade");
    println!("Type 'help' for available commands.\n");

    // Main input loop
    let mut reader = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!("{}", header_line(&service.status(), &limits));
        print!("snapgrade> ");
        stdout().flush()?;

        let line = match reader.next_line().await? {
            Some(line) => line.trim().to_string(),
            None => break, // EOF
        };
        if line.is_empty() {
            continue;
        }

        let (quit_requested, output) = dispatch(&line, &mut service).await;
        if let Some(msg) = output {
            println!("{}", msg);
        }
        if quit_requested {
            break;
        }
    }

    Ok(())
}
