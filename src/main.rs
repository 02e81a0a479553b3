use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinetop::config::{Config, MAX_TOP};
use cinetop::pipeline;

#[derive(Parser)]
#[command(
    name = "cinetop",
    version,
    about = "Finds today's N cinema titles with the highest cross-referenced ratings",
    long_about = None
)]
struct Cli {
    /// Number of top movies to report (defaults to the configured value)
    #[arg(short = 'n', long = "top",
          value_parser = clap::value_parser!(u32).range(1..=MAX_TOP as i64))]
    top: Option<u32>,

    /// Minimum rating floor; entries below it are dropped
    #[arg(long)]
    min_rating: Option<f64>,

    /// Append log output to cinetop.log
    #[arg(long)]
    log: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    let log_file = cli.log.then(|| PathBuf::from("cinetop.log"));
    setup_tracing(cli.verbose, log_file.as_deref().or(config.logging.file.as_deref()))?;

    let top = cli.top.unwrap_or(config.ranking.default_top);
    tracing::info!(top, "cinetop starting");

    let report = pipeline::run(&config, Some(top as usize), cli.min_rating).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render());
    }

    tracing::info!("cinetop completed successfully");
    Ok(())
}

fn setup_tracing(verbose: bool, log_file: Option<&std::path::Path>) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("cinetop=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("cinetop=info,warn")
    };

    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            let file_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file));
            tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .with(file_layer)
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .init();
        }
    }

    Ok(())
}
