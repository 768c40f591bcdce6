//! Hosting Server Binary
//!
//! Serves trial rooms over WebSocket. Subjects connect to `/join` and are
//! grouped into rooms as they arrive.

use clap::Parser;
use groupstakes::gameroom::RoomConfig;
use groupstakes::hosting::Registry;
use groupstakes::hosting::Server;
use groupstakes::records::*;
use groupstakes::*;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "hosting", about = "Serve collective-reward trial rooms")]
struct Args {
    /// JSON room config; omitted fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8888")]
    bind: String,
    /// Fixed payoff seed for every room
    #[arg(long)]
    seed: Option<u64>,
    /// Append records as JSON lines to this file
    #[arg(long)]
    records: Option<PathBuf>,
    /// Persist records to PostgreSQL
    #[cfg(feature = "database")]
    #[arg(long, env = "DB_URL")]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log();
    kys();
    let args = Args::parse();
    let mut config = match args.config.as_ref() {
        Some(path) => RoomConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => RoomConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let registry = Arc::new(Registry::new(config, recorder(&args).await?)?);
    Server::run(args.bind, registry).await?;
    Ok(())
}

async fn recorder(args: &Args) -> anyhow::Result<Arc<dyn Recorder>> {
    #[cfg(feature = "database")]
    if let Some(url) = args.database.as_deref() {
        return Ok(Arc::new(PostgresRecorder::connect(url).await?));
    }
    match args.records.as_ref() {
        Some(path) => Ok(Arc::new(JsonlRecorder::open(path).await?)),
        None => Ok(Arc::new(LogRecorder)),
    }
}
