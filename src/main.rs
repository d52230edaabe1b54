//! Login-Flow main entry point
//!
//! Command-line access to a login flow backed by a SQLite store: inspect the
//! episode, store a renewed cookie, or drain held pages into the fetch queue.

use clap::{Parser, Subcommand};
use login_flow::config::load_options;
use login_flow::cookie::cookie_from_arg;
use login_flow::storage::open_store;
use login_flow::{FlowOptions, LoginFlow};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Login-Flow: recover crawl sessions whose login cookie expired
#[derive(Parser, Debug)]
#[command(name = "login-flow")]
#[command(version = "1.0.0")]
#[command(about = "Recover crawl sessions whose login cookie expired", long_about = None)]
struct Cli {
    /// Path to the SQLite database holding config, held pages and fetch queue
    #[arg(long, value_name = "DB")]
    db: PathBuf,

    /// Path to a TOML options file
    #[arg(long, value_name = "OPTIONS")]
    options: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the session flags and the number of pending held pages
    Status,

    /// Store a freshly authenticated cookie and clear the expired flag
    Renew {
        /// Cookie header value, or a JSON cookie structure
        #[arg(value_name = "COOKIE")]
        cookie: String,
    },

    /// Restore every pending held page into the fetch queue
    Restore,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let options = match &cli.options {
        Some(path) => {
            tracing::info!("Loading options from: {}", path.display());
            load_options(path).map_err(|e| {
                tracing::error!("Failed to load options: {}", e);
                e
            })?
        }
        None => FlowOptions::default(),
    };

    let store = Arc::new(open_store(&cli.db)?);
    let mut flow = LoginFlow::builder()
        .options(options)
        .store(store)
        .build()?;

    match cli.command {
        Command::Status => handle_status(&mut flow)?,
        Command::Renew { cookie } => handle_renew(&mut flow, &cookie)?,
        Command::Restore => handle_restore(&mut flow, &cli.db)?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("login_flow=info,warn"),
            1 => EnvFilter::new("login_flow=debug,info"),
            2 => EnvFilter::new("login_flow=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles `status`: prints the episode flags and pending hold count
fn handle_status(flow: &mut LoginFlow) -> Result<(), Box<dyn std::error::Error>> {
    let config = flow.config()?;
    let options = flow.options().clone();

    println!("=== Login Flow Status ===\n");
    println!("Config key: {}", options.config_key);
    println!("Collection: {}", options.collection);
    println!("  Seeded: {}", config.is_seeded());
    println!(
        "  Expired: {}",
        match config.expired() {
            Some(expired) => expired.to_string(),
            None => "unset".to_string(),
        }
    );
    println!("  Cookie stored: {}", !config.cookie().is_null());
    println!("  Pending held pages: {}", flow.pending_count()?);

    Ok(())
}

/// Handles `renew`: stores the new cookie and starts a new episode
fn handle_renew(flow: &mut LoginFlow, cookie: &str) -> Result<(), Box<dyn std::error::Error>> {
    flow.renew_session(cookie_from_arg(cookie))?;
    println!("✓ Session renewed");

    Ok(())
}

/// Handles `restore`: drains held pages into the database's fetch queue
fn handle_restore(flow: &mut LoginFlow, db: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if flow.is_expired()? {
        tracing::warn!("Session is still marked expired; restored pages may fail again");
    }

    let mut queue = open_store(db)?;
    let report = flow.restore_held_pages(&mut queue)?;

    println!(
        "✓ Restored {} held pages in {} batches",
        report.restored, report.batches
    );

    Ok(())
}
