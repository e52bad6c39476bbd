use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod dashboard;
mod probe;
mod widget;

use config::AppConfig;
use probe::HttpProbe;
use widget::{CheckState, StatusWidget};

#[derive(Debug, Parser)]
#[command(name = "api-status-widget", about = "Check whether the backend API is online")]
struct Args {
    /// TOML config file (defaults to the embedded config)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL; overrides API_URL and the config file
    #[arg(long)]
    base_url: Option<String>,

    /// Run one check without opening a window
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load_default()?,
    };
    config.apply_overrides(args.base_url.as_deref());

    let probe = HttpProbe::new(&config.api)?;
    info!("Starting api-status-widget against {}", probe.url());

    let mut widget = StatusWidget::new(Arc::new(probe), tokio::runtime::Handle::current());

    if args.once {
        widget.check();
        let state = widget.settle().await;
        let view = widget.view();
        println!("{}", view.heading);
        if let Some(message) = view.message {
            println!("{}", message);
        }
        return Ok(if state == CheckState::Online {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    // The window owns the main thread; checks run on the runtime's workers.
    let result = tokio::task::block_in_place(|| dashboard::run_dashboard(widget));
    match result {
        Ok(_) => info!("Dashboard closed cleanly"),
        Err(e) => tracing::error!("Dashboard error: {:#}", e),
    }

    Ok(ExitCode::SUCCESS)
}
