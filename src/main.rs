use clap::Parser;
use dht_kv::config::NodeConfig;
use dht_kv::console;
use dht_kv::logging::{self, LogTarget};
use dht_kv::membership::node::Node;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dht-node")]
#[command(about = "Peer-to-peer key-value store node")]
struct Args {
    /// Node identifier, unique within the cluster.
    #[arg(long, env = "DHT_ID")]
    id: String,

    /// Address other peers use to reach this node.
    #[arg(long, env = "DHT_PEER_ADDR")]
    peer_addr: String,

    /// Address to listen on (defaults to --peer-addr).
    #[arg(long, env = "DHT_BIND_ADDR")]
    bind_addr: Option<String>,

    /// Existing member to join at startup.
    #[arg(long, env = "DHT_JOIN_ADDR")]
    join_addr: Option<String>,

    /// Snapshot directory (defaults to data/<id>).
    #[arg(long, env = "DHT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[arg(long, env = "DHT_LOG_DIR", default_value = "logs")]
    log_dir: PathBuf,

    /// Log to stdout instead of a file. Implied by MODE=k8s.
    #[arg(long)]
    log_stdout: bool,

    /// Serve without the interactive console until Ctrl+C.
    #[arg(long)]
    no_console: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = NodeConfig::new(&args.id, &args.peer_addr);
    if let Some(bind_addr) = args.bind_addr {
        config = config.with_bind_addr(bind_addr);
    }
    if let Some(join_addr) = args.join_addr {
        config = config.with_join_addr(join_addr);
    }
    if let Some(data_dir) = args.data_dir {
        config = config.with_data_dir(data_dir);
    }

    let in_k8s = std::env::var("MODE").is_ok_and(|mode| mode == "k8s");
    let target = if args.log_stdout || in_k8s {
        LogTarget::Stdout
    } else {
        LogTarget::Dir(args.log_dir)
    };
    logging::init(&config.id, &config.peer_addr, &target)?;

    std::fs::create_dir_all(&config.data_dir)?;

    println!(
        "Starting node {} at {} (data: {})",
        config.id,
        config.peer_addr,
        config.data_dir.display()
    );

    let node = Node::new(config);
    let _server = node.start().await?;

    if let Err(e) = node.bootstrap().await {
        tracing::error!("Startup failed: {}", e);
        return Err(e.into());
    }

    if args.no_console {
        tracing::info!("Press Ctrl+C to shutdown");
        tokio::signal::ctrl_c().await?;
        return Ok(());
    }

    console::run(node).await
}
