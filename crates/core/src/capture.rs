use crate::audio::AudioDevice;
use crate::error::AgentError;
use crate::mode::{MicMode, SharedMode};
use openai_realtime::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// How long the loop sleeps when there is nothing to send.
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Forwards captured microphone audio to the session while the mode is
/// `Recording`.
pub struct CaptureLoop {
    client: Arc<Client>,
    device: Arc<dyn AudioDevice>,
    mode: SharedMode,
    poll_interval: Duration,
}

impl CaptureLoop {
    pub fn new(client: Arc<Client>, device: Arc<dyn AudioDevice>, mode: SharedMode) -> Self {
        Self {
            client,
            device,
            mode,
            poll_interval: IDLE_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Runs until `shutdown` flips to true or the connection is gone.
    /// Returns the number of audio chunks sent.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<u64, AgentError> {
        let mut sent = 0u64;
        loop {
            if *shutdown.borrow() {
                break;
            }

            let chunk = match self.mode.get() {
                MicMode::Recording => self.device.get_audio_data(),
                MicMode::Idle | MicMode::Receiving => None,
            };

            match chunk {
                Some(pcm16) if !pcm16.is_empty() => match self.client.send_audio(&pcm16).await {
                    Ok(()) => sent += 1,
                    Err(e) => {
                        let e = AgentError::from(e);
                        if e.is_connection_lost() {
                            tracing::debug!("capture loop stopping: {}", e);
                            break;
                        }
                        return Err(e);
                    }
                },
                _ => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.poll_interval) => {}
                        changed = shutdown.changed() => {
                            if changed.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        }
        tracing::info!("capture loop stopped after {} audio chunks", sent);
        Ok(sent)
    }
}
