use std::path::PathBuf;

use clap::Parser;

use loratnc_interfaces::{TcpHostConfig, TcpHostPort, UdpRadio, UdpRadioConfig};
use loratnc_node::{Bridge, BridgeConfig, BridgeError};

#[derive(Parser)]
#[command(
    name = "loratnc",
    about = "Fragmenting KISS TNC bridging a host byte stream to a small-MTU packet radio"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "loratnc.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // The subscriber may not be up yet when setup fails.
        eprintln!("loratnc: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BridgeError> {
    let cli = Cli::parse();
    let config = BridgeConfig::load(&cli.config)?;

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        loratnc_node::logging::init_json(&config.logging.level);
    } else {
        loratnc_node::logging::init(&config.logging.level);
    }

    let radio = UdpRadio::bind(UdpRadioConfig::new(
        "udp-radio",
        config.radio.bind,
        config.radio.peer,
    ))
    .await?;

    let host = TcpHostPort::accept(TcpHostConfig::new("tcp-host", config.host.listen)).await?;

    let mut bridge = Bridge::new(radio, host, config.bridge.max_message_size);
    let handle = bridge.shutdown_handle();

    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("received SIGINT, shutting down");
        handle.shutdown();
    });

    bridge.run().await;
    bridge.radio().stop().await;
    Ok(())
}
