use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// A microphone and speaker pair that is either capturing or playing, never both.
///
/// Samples are PCM16 little-endian, mono, at the session sample rate.
/// Implementations must be safe to share between the receive loop and the
/// capture loop.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AudioDevice: Send + Sync {
    fn start_recording(&self);

    fn stop_recording(&self);

    fn start_receiving(&self);

    fn stop_receiving(&self);

    fn is_recording(&self) -> bool;

    fn is_receiving(&self) -> bool;

    /// Drains the captured samples. Never blocks; `None` when nothing is buffered.
    fn get_audio_data(&self) -> Option<Vec<u8>>;

    /// Queues `pcm16` for playback. May wait for room in the output buffer
    /// but never discards samples.
    async fn play(&self, pcm16: Vec<u8>) -> Result<()>;

    fn close(&self);
}
