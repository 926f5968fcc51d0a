use std::path::PathBuf;

use clap::Parser as ClapParser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use qntx_ax::{execute_query, Config, NoopEntityResolver, NoopQueryExpander};
use qntx_core::fuzzy::FuzzyEngine;
use qntx_core::parser::Parser as AxParser;
use qntx_sqlite::{BoundedStore, SqliteAliasStore, SqliteStore};

#[derive(ClapParser, Debug)]
#[command(name = "qntx-ax")]
#[command(about = "QNTX attestation query pipeline")]
#[command(version)]
struct Args {
    /// The AX query to run, e.g. "ALICE is author_of of GitHub"
    query: String,

    /// Path to the SQLite database file. Defaults to an in-memory store.
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Path to a JSON config file, overlaid on defaults and then on
    /// environment overrides.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    let config = Config::load(args.config.as_deref())?;

    let database_path = args
        .database
        .or_else(|| config.database_path.as_ref().map(PathBuf::from));

    let sqlite_store = match &database_path {
        Some(path) => SqliteStore::open(path)?,
        None => SqliteStore::in_memory()?,
    };

    let store = BoundedStore::with_quotas(sqlite_store, config.storage_quotas());

    let parsed = AxParser::parse(&args.query)?;
    let filter = qntx_ax::build_filter(&parsed);

    let conn = store.store().connection();
    let alias_store = SqliteAliasStore::new(conn);
    let mut fuzzy = FuzzyEngine::new();

    let now_ms = std::env::var("QNTX_AX_NOW_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0)
        });

    info!(query = %args.query, "executing query");

    let result = execute_query(
        &store,
        &alias_store,
        &mut fuzzy,
        &filter,
        &config,
        &NoopEntityResolver,
        &NoopQueryExpander,
        now_ms,
    )?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
