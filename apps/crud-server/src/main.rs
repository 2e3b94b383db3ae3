//! HTTP front-end for the object CRUD application.
//!
//! Opens the database, spawns its storage thread and serves the
//! list/create/edit/delete screens over hyper with graceful shutdown.

mod router;
mod server;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::signal;

use crud_app::{Controller, ModelConfig, ThingModel};
use router::Router;
use server::Server;

/// Command-line arguments for the CRUD server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Data directory for persistence
    #[arg(long, default_value = "./data")]
    data_dir: String,

    /// Database name
    #[arg(long, default_value = "crudo")]
    database: String,

    /// Records seeded when the store is first created
    #[arg(long, default_value_t = 20)]
    seed_count: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt::init();

    let model = ThingModel::open(ModelConfig {
        database: args.database.clone(),
        data_dir: PathBuf::from(&args.data_dir),
        seed_count: args.seed_count,
    })
    .context("Failed to open database")?;

    let router = Router::new(Controller::new(model));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("Invalid host/port")?;
    let server = Server::new(addr, router);

    tracing::info!("Starting CRUD server");
    tracing::info!("  Host: {}", args.host);
    tracing::info!("  Port: {}", args.port);
    tracing::info!("  Database: {}", args.database);
    tracing::info!("  Data directory: {}", args.data_dir);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.serve().await {
            tracing::error!("Server error: {}", e);
        }
    });

    signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c")?;
    tracing::info!("Shutting down server");
    server_handle.abort();

    Ok(())
}
