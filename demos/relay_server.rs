//! Relay bridge demo with a synthetic detection feed
//!
//! Run with: cargo run --example relay_server [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example relay_server                    # binds to 0.0.0.0:12345
//!   cargo run --example relay_server localhost          # binds to 127.0.0.1:12345
//!   cargo run --example relay_server 127.0.0.1:9000     # binds to 127.0.0.1:9000
//!
//! Then connect a viewer, e.g.:
//!   websocat ws://localhost:12345
//!
//! A background task fabricates detection messages at ~10 Hz and feeds them
//! through the same ingest path a real stream consumer would use, so every
//! connected viewer sees a steady stream of JSON frames. Ctrl+C shuts the
//! whole bridge down.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use prost::Message as _;

use ws_relay::message::{BoundingBox, Detection, SaeMessage, Shape, VideoFrame};
use ws_relay::{
    run_ingest, BridgeStats, ChannelSource, RelayQueue, RelayServer, ServerConfig, Shutdown,
    SourceRecord,
};

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:12345
/// - "127.0.0.1" -> 127.0.0.1:12345
/// - "127.0.0.1:9000" -> 127.0.0.1:9000
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = 12345;

    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn now_utc_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Fabricate one detection message with a box sliding across the frame
fn synthetic_message(tick: u64) -> SaeMessage {
    let x = (tick % 100) as f32 / 100.0;
    SaeMessage {
        frame: Some(VideoFrame {
            source_id: "demo".to_string(),
            timestamp_utc_ms: now_utc_ms(),
            shape: Some(Shape {
                width: 1280,
                height: 720,
            }),
        }),
        detections: vec![Detection {
            bounding_box: Some(BoundingBox {
                min_x: x,
                min_y: 0.4,
                max_x: (x + 0.1).min(1.0),
                max_y: 0.6,
            }),
            confidence: 0.9,
            class_id: 1,
            object_id: tick.to_be_bytes().to_vec(),
        }],
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bind_addr = match std::env::args().nth(1) {
        Some(arg) => match parse_bind_addr(&arg) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!("Usage: relay_server [BIND_ADDR]");
                std::process::exit(1);
            }
        },
        None => "0.0.0.0:12345".parse().unwrap(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ws_relay=debug".parse()?)
                .add_directive("relay_server=info".parse()?),
        )
        .init();

    let queue = Arc::new(RelayQueue::new());
    let stats = Arc::new(BridgeStats::new());
    let shutdown = Shutdown::new();

    // Synthetic feed standing in for the real stream consumer
    let (feed, source) = ChannelSource::new(64);
    let feeder_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let mut tick = 0u64;
        while !feeder_shutdown.is_triggered() {
            let payload = Bytes::from(synthetic_message(tick).encode_to_vec());
            if feed
                .send(SourceRecord::new("demo:stream1", payload))
                .await
                .is_err()
            {
                break;
            }
            tick += 1;
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    });

    let ingest = tokio::spawn(run_ingest(
        source,
        Arc::clone(&queue),
        Arc::clone(&stats),
        shutdown.clone(),
    ));

    let config = ServerConfig::with_addr(bind_addr);
    println!("Starting relay bridge on {}", config.bind_addr);
    println!("Connect a viewer: websocat ws://{}", config.bind_addr);

    let server = RelayServer::with_stats(config, queue, shutdown.clone(), Arc::clone(&stats));
    let server = tokio::spawn(async move { server.run().await });

    tokio::signal::ctrl_c().await?;
    println!("\nShutting down...");
    shutdown.trigger();

    server.await??;
    ingest.await??;

    let snapshot = stats.snapshot();
    println!(
        "Done: ingested={} broadcast={} dropped={} decode_errors={}",
        snapshot.frames_ingested,
        snapshot.frames_broadcast,
        snapshot.frames_dropped,
        snapshot.decode_errors,
    );

    Ok(())
}
