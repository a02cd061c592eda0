use anyhow::Result;
use clap::Parser;
use cli::server::{self, SharedEngine};
use engine::{Engine, EngineConfig};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// StrataKV server: a single-node ordered key-value store speaking the
/// one-request-per-connection line protocol.
#[derive(Parser, Debug)]
#[command(name = "strata-server", version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    addr: String,

    /// Port to listen on
    #[arg(long, default_value_t = 5991)]
    port: u16,

    /// Directory for table files
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,

    /// Buffer entry count that triggers a flush
    #[arg(long, default_value_t = buffer::DEFAULT_MAX_ENTRIES)]
    max_entries: usize,

    /// Table count at which the maintenance loop merges
    #[arg(long, default_value_t = 4)]
    merge_threshold: usize,

    /// Seconds between maintenance checks
    #[arg(long, default_value_t = 10)]
    check_interval: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = EngineConfig {
        data_dir: args.data_dir,
        max_entries: args.max_entries,
        merge_threshold: args.merge_threshold,
    };
    let engine: SharedEngine = Arc::new(Mutex::new(Engine::open(config)?));

    server::spawn_maintenance(engine.clone(), Duration::from_secs(args.check_interval));

    let listener = TcpListener::bind((args.addr.as_str(), args.port))?;
    server::run(engine.clone(), listener)?;

    // The accept loop only returns when the listener dies; push whatever is
    // still buffered to disk before exiting.
    let mut engine = engine.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    engine.flush()?;
    tracing::info!("shutting down; {}", engine.metrics());
    Ok(())
}
