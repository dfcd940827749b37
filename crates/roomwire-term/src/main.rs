//! Roomwire terminal client binary.
//!
//! # Usage
//!
//! ```bash
//! roomwire-term --server 127.0.0.1:8080 alice
//! # then: /join general, plain text to talk, /topic <text>, /leave, /quit
//! ```

use clap::Parser;
use roomwire_term::{Driver, TcpTransport};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Roomwire terminal chat client
#[derive(Parser, Debug)]
#[command(name = "roomwire-term")]
#[command(about = "Terminal client for roomwire chat servers")]
#[command(version)]
struct Args {
    /// Username to speak as
    nick: String,

    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Logs go to stderr; stdout is the chat surface.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::info!("Connecting to {}", args.server);

    let transport = TcpTransport::connect(&args.server).await?;
    Driver::new(transport).run(&args.nick).await?;

    Ok(())
}
