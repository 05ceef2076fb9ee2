mod app;
mod bridge;
mod config;
mod search;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use app::AppState;
use config::AppConfig;

/// Video dashboard with a range trimmer.
#[derive(Debug, Parser)]
#[command(name = "cliptrim", version, about)]
struct Args {
    /// Config file (defaults to ./cliptrim.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Catalog feed, overriding `catalog.path`.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Trim preference file, overriding `prefs.path`.
    #[arg(long)]
    prefs: Option<PathBuf>,

    /// Keep trim ranges in memory only, overriding `prefs.persist`.
    #[arg(long, conflicts_with = "prefs")]
    no_persist: bool,
}

fn main() -> iced::Result {
    let args = Args::parse();

    let mut startup_errors = Vec::new();
    let mut config = match AppConfig::load_or_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            startup_errors.push(error.to_string());
            AppConfig::default()
        }
    };
    if let Some(path) = args.catalog {
        config.catalog.path = path;
    }
    if let Some(path) = args.prefs {
        config.prefs.path = path;
        config.prefs.persist = true;
    }
    if args.no_persist {
        config.prefs.persist = false;
    }

    init_tracing(&config.log.level);
    for message in &startup_errors {
        error!(%message, "falling back to default config");
    }

    iced::application("Cliptrim", AppState::update, AppState::view)
        .subscription(AppState::subscription)
        .run_with(move || AppState::boot(config, startup_errors))
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
