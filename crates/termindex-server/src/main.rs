//! TermIndex server - HTTP front for the term index.
//!
//! Seeds the site on first start, then serves the health check, the flush
//! endpoint and term lookups.

mod handler;
mod server;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use termindex_core::TermIndexApp;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "termindex-server")]
#[command(about = "HTTP server for the content term index")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Data directory (defaults to ./termindex-data)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep all data in memory
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    info!("Starting TermIndex server");

    let data_dir = match args.data_dir {
        Some(path) => path,
        None => std::env::current_dir()?.join("termindex-data"),
    };
    if !args.in_memory {
        info!("Data directory: {}", data_dir.display());
    }

    let app = TermIndexApp::builder(&data_dir)
        .auto_create_dirs(true)
        .in_memory(args.in_memory)
        .run_migrations(true)
        .build()?;

    let addr = server::start_server(app, &args.host, args.port).await?;

    // Read by process supervisors and the integration tests.
    println!("PORT={}", addr.port());

    info!("Server running on {}", addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
