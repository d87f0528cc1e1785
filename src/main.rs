use clap::{ArgAction, Parser};
use leetseek_indexer_1337x::{SearchRequest, StopReason};
use leetseek_indexer_prelude::ResultSink;
use std::path::PathBuf;

mod config;
mod output;

/// Search 1337x and print the results found.
#[derive(Debug, Parser)]
#[command(name = "leetseek", version, about)]
struct Cli {
    /// Search query
    query: String,
    /// Category (all, movies, tv, music, games, anime, software)
    #[arg(short, long, default_value = "all")]
    category: String,
    /// Print every result in a single JSON array once the search is over
    #[arg(long = "json")]
    output_json: bool,
    /// Maximum number of pages to fetch
    #[arg(long)]
    max_pages: Option<u32>,
    /// Override the seconds to wait between pages
    #[arg(long = "sleep")]
    sleep_seconds: Option<f64>,
    /// Override the site base url
    #[arg(long)]
    base_url: Option<String>,
    /// Configuration file, defaults to CONFIG_FILE when set
    #[arg(long)]
    config: Option<PathBuf>,
    /// Increase logging verbosity
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logs(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let default_filter = if verbose > 0 {
        "leetseek=debug,leetseek_indexer_1337x=debug"
    } else {
        "leetseek=info,leetseek_indexer_1337x=info"
    };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(cfg!(debug_assertions)),
        )
        .try_init();
}

fn load_config(cli: &Cli) -> Result<config::Config, String> {
    let config = match cli.config.as_ref() {
        Some(path) => config::Config::from_path(path)?,
        None => config::Config::from_env()?,
    };
    apply_overrides(cli, config)
}

fn apply_overrides(cli: &Cli, mut config: config::Config) -> Result<config::Config, String> {
    if let Some(seconds) = cli.sleep_seconds {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(format!("invalid sleep duration {seconds}"));
        }
        config.search.page_delay_ms = (seconds * 1000.0) as u64;
    }
    if let Some(base_url) = cli.base_url.as_ref() {
        config.search.base_url = base_url.clone();
    }
    config.search.validate().map_err(|err| err.to_string())?;
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), String> {
    let config = load_config(&cli)?;
    let driver = config.search.build().map_err(|err| err.to_string())?;

    let request = SearchRequest::new(cli.query)
        .with_category(cli.category)
        .with_max_pages(cli.max_pages);

    let stdout = std::io::stdout().lock();
    let mut sink: Box<dyn ResultSink> = if cli.output_json {
        Box::new(output::JsonArrayPrinter::new(stdout))
    } else {
        Box::new(output::StreamPrinter::new(stdout))
    };

    let outcome = driver
        .search(&request, sink.as_mut())
        .await
        .map_err(|err| err.to_string())?;

    match outcome.stop {
        StopReason::PageUnavailable { page } => {
            tracing::info!("page {page} unavailable, {} results found", outcome.emitted)
        }
        StopReason::EmptyPage { page } => {
            tracing::info!("no result on page {page}, {} results found", outcome.emitted)
        }
        StopReason::PageLimit => {
            tracing::info!("page limit reached, {} results found", outcome.emitted)
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logs(cli.verbose);

    if let Err(error) = run(cli).await {
        tracing::error!("search failed: {error}");
        std::process::exit(1);
    }
}
