use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use client_core::{HttpBackend, WorkflowController};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod session;
mod terminal;

use config::load_settings;
use session::ReviewSession;
use terminal::Terminal;

/// Generate content, review it against criteria, and iterate on AI feedback.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "review.toml")]
    config: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    /// Start with this prompt instead of asking for one.
    #[arg(long)]
    prompt: Option<String>,
    /// Write the rendered review page here after every step.
    #[arg(long)]
    page_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(page_out) = args.page_out {
        settings.page_out = Some(page_out);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let backend = HttpBackend::new(&settings.server_url)?;
    info!(server_url = %backend.base_url(), "review client starting");

    let terminal = Arc::new(Terminal);
    let controller = WorkflowController::new(Arc::new(backend), terminal.clone());
    ReviewSession::new(&controller, &terminal, settings.page_out.as_deref())
        .run(args.prompt)
        .await
}
