//! Pageforge Web Server Binary
//!
//! Starts the REST API the browser-based builder frontend talks to.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (port 4000, uploads under ~/.config/Pageforge/uploads/)
//! pageforge-web
//!
//! # Specify port and upload directory
//! pageforge-web --port 8080 --upload-dir ./uploads
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pageforge::config::Config;
use pageforge::web;

/// Pageforge Web Server - REST API for the page builder
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Directory uploaded images are stored in.
    /// Defaults to the platform-specific config directory:
    /// - Linux: ~/.config/Pageforge/uploads/
    /// - macOS: ~/Library/Application Support/Pageforge/uploads/
    /// - Windows: %APPDATA%\Pageforge\uploads\
    #[arg(short, long)]
    upload_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load or create configuration, then apply CLI overrides
    let mut config = Config::load().unwrap_or_default();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.upload_dir {
        config.uploads.upload_dir = dir;
    }

    info!("Upload directory: {}", config.uploads.upload_dir.display());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    web::run_server(config, addr).await
}
