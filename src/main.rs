//! dp-scraper main entry point
//!
//! This is the command-line interface for the product page service.

use anyhow::Context;
use clap::Parser;
use dp_scraper::api::build_router;
use dp_scraper::config::{load_config_with_hash, Config};
use dp_scraper::fetch::{FetchController, Throttle};
use dp_scraper::pipeline::{ProductScraper, ProductService};
use dp_scraper::storage::{
    load_statistics, now_millis, open_store, print_statistics, ProductStore, SqliteStore,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// dp-scraper: cached product page extraction
///
/// Looks up a product by its code, fetching and extracting the product
/// detail page when no fresh cached copy exists, and serves the result
/// over HTTP.
#[derive(Parser, Debug)]
#[command(name = "dp-scraper")]
#[command(version = "1.0.0")]
#[command(about = "Cached product page extraction service", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and print the effective settings without serving
    #[arg(long, conflicts_with_all = ["stats", "purge_expired", "lookup"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "purge_expired", "lookup"])]
    stats: bool,

    /// Delete expired cache snapshots and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "lookup"])]
    purge_expired: bool,

    /// Look up a single product code, print it as JSON and exit
    #[arg(long, value_name = "CODE", conflicts_with_all = ["dry_run", "stats", "purge_expired"])]
    lookup: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_ref())?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.purge_expired {
        handle_purge_expired(&config)?;
    } else if let Some(code) = cli.lookup.as_deref() {
        handle_lookup(&config, code).await?;
    } else {
        handle_serve(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dp_scraper=info,warn"),
            1 => EnvFilter::new("dp_scraper=debug,info"),
            2 => EnvFilter::new("dp_scraper=trace,debug"),
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

/// Loads the configuration file, or the defaults when none is given
fn load_configuration(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Builds the product service from configuration
fn build_service(
    config: &Config,
) -> anyhow::Result<(Arc<FetchController>, ProductService<ProductScraper, SqliteStore>)> {
    let throttle = Arc::new(Throttle::from_config(&config.throttle));
    let controller = Arc::new(
        FetchController::new(&config.source, throttle).context("Failed to build fetch controller")?,
    );

    let store = open_store(Path::new(&config.storage.database_path))
        .with_context(|| format!("Failed to open database {}", config.storage.database_path))?;

    let service = ProductService::new(ProductScraper::new(controller.clone()), store)
        .with_ttl(config.cache.ttl());

    Ok((controller, service))
}

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== dp-scraper Dry Run ===\n");

    println!("Source:");
    println!("  Base URL: {}", config.source.base_url);
    println!("  User agents: {}", config.source.user_agents.len());
    println!("  Request timeout: {}s", config.source.request_timeout_secs);
    println!("  Connect timeout: {}s", config.source.connect_timeout_secs);

    println!("\nThrottle:");
    println!(
        "  Max concurrent requests: {}",
        config.throttle.max_concurrent_requests
    );
    println!("  Minimum delay: {}ms", config.throttle.minimum_delay_ms);

    println!("\nCache:");
    println!("  TTL: {}s", config.cache.ttl_secs);

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);

    println!("\nServer:");
    println!("  Listen address: {}", config.server.listen_addr);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.storage.database_path);

    let store = open_store(Path::new(&config.storage.database_path))?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --purge-expired mode: removes expired cache snapshots
fn handle_purge_expired(config: &Config) -> anyhow::Result<()> {
    let store = open_store(Path::new(&config.storage.database_path))?;
    let removed = store.purge_expired(now_millis())?;

    println!("✓ Removed {} expired cache snapshots", removed);
    Ok(())
}

/// Handles the --lookup mode: runs one lookup and prints the result
async fn handle_lookup(config: &Config, code: &str) -> anyhow::Result<()> {
    let (controller, service) = build_service(config)?;

    let result = service.get_product(code).await;
    controller.wait().await;

    let view = result.with_context(|| format!("Lookup of '{}' failed", code))?;
    println!("{}", serde_json::to_string_pretty(&view)?);

    Ok(())
}

/// Handles the main serve operation
async fn handle_serve(config: Config) -> anyhow::Result<()> {
    let (controller, service) = build_service(&config)?;
    let app = build_router(Arc::new(service));

    let listener = tokio::net::TcpListener::bind(config.server.listen_addr.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen_addr))?;

    tracing::info!("Listening on {}", config.server.listen_addr);
    tracing::info!(
        "Fetching from {} (max {} concurrent, {}ms apart)",
        controller.allowed_domain(),
        config.throttle.max_concurrent_requests,
        config.throttle.minimum_delay_ms
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Waiting for in-flight fetches to finish");
    controller.shutdown().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl-C, shutting down"),
        Err(e) => {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
