//! WebSocket endpoint the simulator connects to. Each connection drives
//! its own [`Session`] over the shared road map.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};

use super::Session;
use crate::config::PlannerConfig;
use crate::road::RoadMap;

/// Port the simulator connects to.
pub const DEFAULT_PORT: u16 = 4567;

pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to listen on {}:{}", host, port))
}

/// Accepts simulator connections until the process stops.
///
/// `stats_every` planned cycles each connection logs its lane, reference
/// speed and cycle timing (0 disables).
pub async fn serve(listener: TcpListener, map: Arc<RoadMap>, config: PlannerConfig, stats_every: u64) {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening for the simulator on ws://{}", addr);
    }

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                continue;
            }
        };

        let session = Session::new(Arc::clone(&map), config.clone());
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer, session, stats_every).await {
                warn!("Connection {} ended with error: {:#}", peer, e);
            }
        });
    }
}

/// Answers every text frame of one connection through `session`.
pub async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    mut session: Session,
    stats_every: u64,
) -> Result<()> {
    let ws = accept_async(stream).await.context("WebSocket handshake failed")?;
    info!("Simulator connected from {}", peer);

    let (mut writer, mut reader) = ws.split();
    while let Some(message) = reader.next().await {
        match message? {
            Message::Text(text) => {
                if let Some(reply) = session.handle_message(&text) {
                    writer.send(Message::Text(reply)).await?;
                }
                session.log_progress(stats_every);
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    info!("Simulator {} disconnected after {} planning cycles", peer, session.cycles());
    Ok(())
}
