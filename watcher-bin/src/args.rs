use clap::Parser;
use dotenv::dotenv;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file, without extension
    #[arg(short, long, env = "WATCHER_CONFIG", default_value = "config/default")]
    pub config: String,

    /// RPC URL for Solana connection, overrides the configured endpoint
    #[arg(short, long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Stop after this many polling cycles
    #[arg(long)]
    pub max_cycles: Option<u64>,
}

pub fn load_args() -> Args {
    dotenv().ok();
    Args::parse()
}
