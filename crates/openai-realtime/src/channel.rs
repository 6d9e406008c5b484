//! The ordered message channel underneath a [`crate::Client`].
//!
//! A [`Channel`] is a pair of queues of raw JSON text. The WebSocket flavour
//! runs one writer task and one reader task against the socket; the in-memory
//! flavour hands the far end to a [`Remote`] so the protocol can be driven
//! without a network.

use crate::client::config::Config;
use crate::client::utils;
use crate::error::ClientError;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

/// One unit read from the peer.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Text(String),
    /// The peer closed the channel, with its reason if it gave one.
    Closed(Option<String>),
    /// The transport failed while reading.
    Failed(String),
}

pub struct Channel {
    pub(crate) outgoing: mpsc::Sender<String>,
    pub(crate) incoming: mpsc::Receiver<Frame>,
    pub(crate) reader: Option<JoinHandle<()>>,
}

impl Channel {
    /// Performs the WebSocket handshake and spawns the pump tasks.
    pub async fn open(config: &Config) -> Result<Self, ClientError> {
        let request =
            utils::build_request(config).map_err(|e| ClientError::Connection(e.to_string()))?;

        tracing::info!("connecting to {}", config.url());
        let (ws_stream, _) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        tracing::info!("connected");

        let (mut write, mut read) = ws_stream.split();
        let (out_tx, mut out_rx) = mpsc::channel::<String>(config.capacity());
        let (in_tx, in_rx) = mpsc::channel::<Frame>(config.capacity());

        // Ends when every sender is dropped, then closes the socket.
        tokio::spawn(async move {
            while let Some(text) = out_rx.recv().await {
                if let Err(e) = write.send(Message::Text(text)).await {
                    tracing::error!("failed to send message: {}", e);
                    break;
                }
            }
            if let Err(e) = write.close().await {
                tracing::debug!("failed to close socket: {}", e);
            }
        });

        let reader = tokio::spawn(async move {
            while let Some(message) = read.next().await {
                let frame = match message {
                    Ok(Message::Text(text)) => Frame::Text(text),
                    Ok(Message::Binary(bin)) => {
                        tracing::warn!("unexpected binary message: {} bytes", bin.len());
                        continue;
                    }
                    Ok(Message::Close(reason)) => {
                        tracing::info!("connection closed: {:?}", reason);
                        Frame::Closed(reason.map(|r| format!("{:?}", r)))
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::error!("failed to read message: {}", e);
                        Frame::Failed(e.to_string())
                    }
                };
                let terminal = !matches!(frame, Frame::Text(_));
                if in_tx.send(frame).await.is_err() || terminal {
                    return;
                }
            }
            let _ = in_tx.send(Frame::Closed(None)).await;
        });

        Ok(Self {
            outgoing: out_tx,
            incoming: in_rx,
            reader: Some(reader),
        })
    }

    /// A channel whose far end is a [`Remote`] held by the caller.
    pub fn in_memory(capacity: usize) -> (Self, Remote) {
        let (out_tx, out_rx) = mpsc::channel(capacity.max(1));
        let (in_tx, in_rx) = mpsc::channel(capacity.max(1));
        let channel = Self {
            outgoing: out_tx,
            incoming: in_rx,
            reader: None,
        };
        let remote = Remote {
            sent: out_rx,
            frames: in_tx,
        };
        (channel, remote)
    }
}

/// The peer side of an in-memory [`Channel`].
pub struct Remote {
    sent: mpsc::Receiver<String>,
    frames: mpsc::Sender<Frame>,
}

impl Remote {
    /// Delivers a server event. Returns false once the client side is gone.
    pub async fn push(&self, event: serde_json::Value) -> bool {
        self.push_text(&event.to_string()).await
    }

    pub async fn push_text(&self, text: &str) -> bool {
        self.frames.send(Frame::Text(text.to_string())).await.is_ok()
    }

    pub async fn close(&self, reason: Option<&str>) {
        let _ = self
            .frames
            .send(Frame::Closed(reason.map(str::to_string)))
            .await;
    }

    /// Next event the client sent, waiting for it.
    pub async fn next_sent(&mut self) -> Option<serde_json::Value> {
        let text = self.sent.recv().await?;
        serde_json::from_str(&text).ok()
    }

    /// Next event the client sent, if one is already queued.
    pub fn try_next_sent(&mut self) -> Option<serde_json::Value> {
        let text = self.sent.try_recv().ok()?;
        serde_json::from_str(&text).ok()
    }

    /// Drains everything sent so far.
    pub fn drain_sent(&mut self) -> Vec<serde_json::Value> {
        std::iter::from_fn(|| self.try_next_sent()).collect()
    }
}
