//! Transport encoding of PCM16 audio. The realtime endpoint carries audio as
//! base64 strings inside JSON events.

use crate::error::ClientError;
use base64::Engine;
use openai_realtime_types::audio::Base64EncodedAudioBytes;

pub fn encode(pcm16: &[u8]) -> Base64EncodedAudioBytes {
    base64::engine::general_purpose::STANDARD.encode(pcm16)
}

pub fn decode(fragment: &str) -> Result<Vec<u8>, ClientError> {
    base64::engine::general_purpose::STANDARD
        .decode(fragment)
        .map_err(|e| ClientError::Protocol(format!("undecodable audio delta: {}", e)))
}
