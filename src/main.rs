//! Roketo Mock Server - CLI entry point.
//!
//! Thin HTTP edge over the gateway: each wire request is converted into
//! an `InboundRequest`, handled on the async runtime, and the resulting
//! response replayed to the caller.

use anyhow::Result;
use clap::Parser;
use roketo_mock_server::{Gateway, InboundRequest, MemoryStore, MockResponse, ObserverHub, ServerConfig};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "roketo-mock-server",
    about = "Mock API hosting service - canned responses with live request observation",
    version
)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "roketo.yaml")]
    config: PathBuf,

    /// Listen address override (e.g., "0.0.0.0:8000")
    #[arg(short, long)]
    listen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: Level,

    /// Print default configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Print default config if requested
    if args.print_config {
        print!("{}", serde_yaml::to_string(&ServerConfig::default())?);
        return Ok(());
    }

    // Load configuration
    let mut config = if args.config.exists() {
        info!(path = ?args.config, "Loading configuration");
        ServerConfig::from_file(&args.config)?
    } else if args.validate {
        anyhow::bail!("Configuration file not found: {:?}", args.config);
    } else {
        info!("Using default configuration");
        ServerConfig::default()
    };

    if let Some(listen) = args.listen {
        config.listen = listen;
    }

    // Validate and exit if requested
    if args.validate {
        config.validate()?;
        println!("Configuration is valid");
        return Ok(());
    }
    config.validate()?;

    let runtime = tokio::runtime::Runtime::new()?;

    let store = Arc::new(MemoryStore::new());
    store.connect();
    let observer = Arc::new(ObserverHub::new(config.observer.channel_capacity));
    let listen = config.listen.clone();
    let gateway = Gateway::new(config, store, observer);

    let server = tiny_http::Server::http(listen.as_str())
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", listen, e))?;
    info!(listen = %listen, "Now listening");

    for request in server.incoming_requests() {
        let (request, inbound) = to_inbound(request);
        let response = runtime.block_on(gateway.handle(&inbound));
        respond(request, response);
    }

    Ok(())
}

/// Convert a wire request into the transport-independent form.
fn to_inbound(mut request: tiny_http::Request) -> (tiny_http::Request, InboundRequest) {
    let mut body = Vec::new();
    if let Err(err) = request.as_reader().read_to_end(&mut body) {
        warn!(error = %err, "failed to read request body");
    }

    let url = request.url().to_string();
    let (path, query_string) = match url.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (url, None),
    };

    let headers: std::collections::HashMap<String, String> = request
        .headers()
        .iter()
        .map(|h| (h.field.to_string(), h.value.to_string()))
        .collect();

    let host = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("host"))
        .map(|(_, value)| value.clone())
        .unwrap_or_else(|| "localhost".to_string());

    let inbound = InboundRequest {
        method: request.method().to_string().to_uppercase(),
        host,
        path,
        query_string,
        headers,
        body,
        scheme: "http".to_string(),
    };
    (request, inbound)
}

/// Replay the gateway's response on the wire.
fn respond(request: tiny_http::Request, response: MockResponse) {
    let mut wire = tiny_http::Response::from_data(response.body)
        .with_status_code(response.status);
    for (name, value) in &response.headers {
        match tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(header) => wire = wire.with_header(header),
            Err(()) => warn!(header = %name, "dropping malformed response header"),
        }
    }
    if let Err(err) = request.respond(wire) {
        warn!(error = %err, "failed to write response");
    }
}
