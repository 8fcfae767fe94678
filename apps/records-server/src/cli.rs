use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use records_core::model::{Role, BCRYPT_COST};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the REST API server
    Serve(ServeArgs),

    /// Mint a bearer token, e.g. for creating the first accounts
    IssueToken(IssueTokenArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Data directory for the snapshot file
    #[arg(long, default_value = "./data", conflicts_with = "in_memory")]
    pub data_dir: PathBuf,

    /// Keep everything in memory, never write a snapshot
    #[arg(long)]
    pub in_memory: bool,

    /// Snapshot interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub persistence_interval_ms: u64,

    /// Request timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub request_timeout_ms: u64,

    /// Response timeout in milliseconds
    #[arg(long, default_value_t = 10000)]
    pub response_timeout_ms: u64,

    /// Page size for list endpoints called without `limit`
    #[arg(long)]
    pub default_list_limit: Option<usize>,

    /// HS256 signing secret
    #[arg(long, env = "RECORDS_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Lifetime of issued tokens in seconds
    #[arg(long, default_value_t = 3600)]
    pub token_ttl_secs: u64,

    /// Bcrypt cost for stored passwords
    #[arg(
        long,
        default_value_t = BCRYPT_COST,
        value_parser = clap::value_parser!(u32).range(4..=31)
    )]
    pub password_hash_cost: u32,
}

#[derive(Args, Debug)]
pub struct IssueTokenArgs {
    /// HS256 signing secret
    #[arg(long, env = "RECORDS_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Role carried by the token (student, teacher, admin)
    #[arg(long, default_value = "admin")]
    pub role: Role,

    /// Subject guid (random when omitted)
    #[arg(long)]
    pub subject: Option<Uuid>,

    /// Lifetime in seconds
    #[arg(long, default_value_t = 3600)]
    pub ttl_secs: u64,
}
