//! REST API server for the academic records database.
//!
//! Wires the snapshot-backed runtime to the HTTP router, and shuts down
//! on Ctrl+C after a final snapshot flush.

mod cli;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use records_api::middleware::JwtAuthenticator;
use records_api::{router::Router, server::Server};
use records_core::config::RecordsConfig;
use records_runtime::Runtime;
use tokio::signal;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use cli::{Cli, Commands, IssueTokenArgs, ServeArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::IssueToken(args) => issue_token(args),
    }
}

fn config_from_args(args: &ServeArgs) -> RecordsConfig {
    RecordsConfig {
        data_dir: (!args.in_memory).then(|| args.data_dir.clone()),
        persistence_interval_ms: args.persistence_interval_ms,
        request_timeout_ms: args.request_timeout_ms,
        response_timeout_ms: args.response_timeout_ms,
        default_list_limit: args.default_list_limit,
        token_ttl_secs: args.token_ttl_secs,
        password_hash_cost: args.password_hash_cost,
        ..Default::default()
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    anyhow::ensure!(!args.jwt_secret.is_empty(), "JWT secret must not be empty");
    let config = config_from_args(&args);

    let (api_tx, api_rx) = mpsc::channel(config.api_queue_capacity);
    let runtime = Runtime::open(&config, api_rx).context("Failed to load database")?;
    let runtime_handle = runtime.spawn().context("Failed to start runtime")?;

    let tokens = Arc::new(JwtAuthenticator::new(
        args.jwt_secret.as_bytes(),
        config.token_ttl_secs,
    ));

    tracing::info!("Starting records server");
    tracing::info!("  Host: {}", args.host);
    tracing::info!("  Port: {}", args.port);
    match &config.data_dir {
        Some(dir) => tracing::info!("  Data directory: {}", dir.display()),
        None => tracing::info!("  Data directory: none (in-memory)"),
    }
    tracing::info!("  Persistence interval: {} ms", config.persistence_interval_ms);
    tracing::info!("  Request timeout: {} ms", config.request_timeout_ms);
    tracing::info!("  Response timeout: {} ms", config.response_timeout_ms);
    tracing::info!("  Password hash cost: {}", config.password_hash_cost);

    // The router holds the only request sender
    let router = Router::new(Arc::new(config), api_tx, tokens.clone(), tokens)
        .context("Failed to build router")?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("Invalid host or port")?;
    let server = Server::bind(addr, router)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    server
        .serve_with_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl_c: {}", e);
            }
        })
        .await?;

    let db = runtime_handle
        .join()
        .await
        .context("Final snapshot flush failed")?;
    tracing::info!(
        "Stopped: {} students, {} teachers, {} years, {} records",
        db.students().live_count(),
        db.teachers().live_count(),
        db.years().live_count(),
        db.records().live_count()
    );
    Ok(())
}

fn issue_token(args: IssueTokenArgs) -> anyhow::Result<()> {
    anyhow::ensure!(!args.jwt_secret.is_empty(), "JWT secret must not be empty");
    let tokens = JwtAuthenticator::new(args.jwt_secret.as_bytes(), args.ttl_secs);
    let subject = args.subject.unwrap_or_else(Uuid::new_v4);
    let token = tokens.issue(subject, args.role)?;
    println!("{}", token);
    Ok(())
}
