//! sqlbind CLI
//!
//! Turns the statements of a configuration file into an accessor plan.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sqlbind_cli::{generate, Config, SqliteValidator};
use sqlbind_core::BatchPolicy;

/// Generate typed accessor plans from hand-written SQL.
#[derive(Parser)]
#[command(name = "sqlbind")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file.
    #[arg(short, long, env = "SQLBIND_CONFIG", default_value = "sqlbind.json")]
    config: PathBuf,

    /// Write the plan here instead of stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Stop at the first failing statement.
    #[arg(long)]
    fail_fast: bool,

    /// SQLite database every statement is prepared against first.
    #[arg(long, env = "SQLBIND_VALIDATE_DB")]
    validate_db: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load(&cli.config)
        .with_context(|| format!("loading configuration {}", cli.config.display()))?;
    let base_dir = cli.config.parent().unwrap_or_else(|| Path::new("."));
    let schema = config.load_schema(base_dir).context("loading schema")?;

    let validator = cli
        .validate_db
        .as_deref()
        .map(|url| {
            SqliteValidator::connect(url)
                .with_context(|| format!("connecting to validation database {url}"))
        })
        .transpose()?;

    let policy = if cli.fail_fast {
        BatchPolicy::FailFast
    } else {
        BatchPolicy::CollectAll
    };
    let plan = generate(&config, &schema, policy, validator)?;
    let json = serde_json::to_string_pretty(&plan)?;

    match &cli.out {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("Plan written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
