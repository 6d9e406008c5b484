use crate::audio;
use crate::channel::{Channel, Frame};
use crate::client::event_log::{AudioAppendLog, Direction, log_event};
use crate::client::stats::Stats;
use crate::error::ClientError;
use crate::types;
use openai_realtime_types::audio::{AudioFormat, TurnDetection, Voice};
use openai_realtime_types::events::INPUT_AUDIO_BUFFER_APPEND;
use openai_realtime_types::session::Session;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

pub(crate) mod config;
pub(crate) mod consts;
pub(crate) mod event_log;
pub(crate) mod stats;
pub(crate) mod utils;

/// One live realtime session.
///
/// All operations take `&self` so the receive loop and the capture loop can
/// share the client behind an `Arc`.
pub struct Client {
    outgoing: Mutex<Option<mpsc::Sender<String>>>,
    incoming: tokio::sync::Mutex<mpsc::Receiver<Frame>>,
    closed: watch::Sender<bool>,
    reader: Mutex<Option<JoinHandle<()>>>,
    stats: Mutex<Stats>,
    audio_log: Mutex<AudioAppendLog>,
}

impl Client {
    fn new(channel: Channel) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            outgoing: Mutex::new(Some(channel.outgoing)),
            incoming: tokio::sync::Mutex::new(channel.incoming),
            closed,
            reader: Mutex::new(channel.reader),
            stats: Mutex::new(Stats::new()),
            audio_log: Mutex::new(AudioAppendLog::default()),
        }
    }

    /// Takes over an open channel and negotiates the session on it.
    pub async fn establish(channel: Channel, session: Session) -> Result<Self, ClientError> {
        let client = Self::new(channel);
        tracing::info!(
            tools = session.tools().len(),
            "negotiating session: modalities={:?}",
            session.modalities()
        );
        client
            .send(types::ClientEvent::SessionUpdate(
                types::events::client::SessionUpdateEvent::new(session),
            ))
            .await?;
        Ok(client)
    }

    pub async fn send(&self, event: types::ClientEvent) -> Result<(), ClientError> {
        let tx = self
            .outgoing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ClientError::NotConnected)?;

        let event_type = event.event_type();
        let text = serde_json::to_string(&event)?;
        if event_type != INPUT_AUDIO_BUFFER_APPEND {
            log_event(Direction::Outgoing, event_type, None);
        }

        tx.send(text)
            .await
            .map_err(|_| ClientError::ConnectionLost("outgoing channel closed".to_string()))
    }

    /// Waits for the next server event.
    pub async fn receive(&self) -> Result<types::ServerEvent, ClientError> {
        if self.is_closed() {
            return Err(ClientError::ConnectionLost("session closed".to_string()));
        }

        let mut incoming = self.incoming.lock().await;
        let frame = tokio::select! {
            frame = incoming.recv() => frame,
            _ = closed_signal(self.closed.subscribe()) => {
                return Err(ClientError::ConnectionLost("session closed".to_string()));
            }
        };

        match frame {
            Some(Frame::Text(text)) => self.decode(&text),
            Some(Frame::Closed(reason)) => Err(ClientError::ConnectionLost(
                reason.unwrap_or_else(|| "closed by peer".to_string()),
            )),
            Some(Frame::Failed(e)) => Err(ClientError::ConnectionLost(e)),
            None => Err(ClientError::ConnectionLost("channel ended".to_string())),
        }
    }

    fn decode(&self, text: &str) -> Result<types::ServerEvent, ClientError> {
        let json = serde_json::from_str::<serde_json::Value>(text)
            .map_err(|e| ClientError::Protocol(format!("malformed message: {}", e)))?;

        let event_type = json
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        log_event(
            Direction::Incoming,
            &event_type,
            json.get("event_id").and_then(|v| v.as_str()),
        );

        let event = serde_json::from_value::<types::ServerEvent>(json)
            .map_err(|e| ClientError::Protocol(format!("invalid {} event: {}", event_type, e)))?;

        if let types::ServerEvent::ResponseDone(done) = &event {
            if let Some(usage) = done.response().usage() {
                self.stats
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .update_usage(
                        usage.total_tokens(),
                        usage.input_tokens(),
                        usage.output_tokens(),
                    );
                tracing::debug!(
                    "total_tokens: {}, input_tokens: {}, output_tokens: {}",
                    usage.total_tokens(),
                    usage.input_tokens(),
                    usage.output_tokens()
                );
            }
        }
        Ok(event)
    }

    /// Appends raw PCM16 to the server's input buffer.
    pub async fn send_audio(&self, pcm16: &[u8]) -> Result<(), ClientError> {
        if pcm16.is_empty() {
            tracing::debug!("no audio data to send");
            return Ok(());
        }

        let event = types::ClientEvent::InputAudioBufferAppend(
            types::events::client::InputAudioBufferAppendEvent::new(audio::encode(pcm16)),
        );
        self.send(event).await?;

        let summary = self
            .audio_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(Instant::now());
        if let Some(count) = summary {
            tracing::debug!(
                category = "input_audio",
                "-> {} x{} ({} bytes last)",
                INPUT_AUDIO_BUFFER_APPEND,
                count,
                pcm16.len()
            );
        }
        Ok(())
    }

    /// Stops the session. Pending and future `receive` calls fail with
    /// `ConnectionLost`, later `send` calls with `NotConnected`.
    pub fn close(&self) {
        if self.closed.send_replace(true) {
            return;
        }
        // dropping the last sender lets the writer flush and close the socket
        self.outgoing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(reader) = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            reader.abort();
        }
        tracing::info!("session closed");
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    pub fn stats(&self) -> Stats {
        let audio_appends = self
            .audio_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count();
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .with_audio_appends(audio_appends)
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}

async fn closed_signal(mut closed: watch::Receiver<bool>) {
    let _ = closed.wait_for(|closed| *closed).await;
}

/// The settings negotiated for every session: text and audio, PCM16 both
/// ways, server-side voice activity detection.
pub fn negotiation_session(instructions: &str, tools: Vec<types::tools::Tool>) -> Session {
    Session::builder()
        .with_modalities_enable_audio()
        .with_instructions(instructions)
        .with_voice(Voice::Alloy)
        .with_input_audio_format(AudioFormat::Pcm16)
        .with_output_audio_format(AudioFormat::Pcm16)
        .with_turn_detection_enable(TurnDetection::default())
        .with_tools(tools)
        .build()
}

pub async fn connect_with_config(
    config: config::Config,
    instructions: &str,
    tools: Vec<types::tools::Tool>,
) -> Result<Client, ClientError> {
    if !config.has_api_key() {
        return Err(ClientError::Connection(format!(
            "missing {}",
            consts::OPENAI_API_KEY
        )));
    }
    let channel = Channel::open(&config).await?;
    Client::establish(channel, negotiation_session(instructions, tools)).await
}

/// Connects with the default endpoint and the key from the environment.
pub async fn connect(
    instructions: &str,
    tools: Vec<types::tools::Tool>,
) -> Result<Client, ClientError> {
    connect_with_config(config::Config::new(), instructions, tools).await
}
