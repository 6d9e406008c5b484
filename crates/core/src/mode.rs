use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Who owns the audio path right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MicMode {
    Idle = 0,
    Recording = 1,
    Receiving = 2,
}

impl MicMode {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => MicMode::Recording,
            2 => MicMode::Receiving,
            _ => MicMode::Idle,
        }
    }
}

impl fmt::Display for MicMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MicMode::Idle => "idle",
            MicMode::Recording => "recording",
            MicMode::Receiving => "receiving",
        };
        f.write_str(name)
    }
}

/// The mode shared between the conversation (single writer) and the capture
/// loop (reader). Clones observe the same value.
#[derive(Debug, Clone)]
pub struct SharedMode(Arc<AtomicU8>);

impl Default for SharedMode {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedMode {
    pub fn new() -> Self {
        Self(Arc::new(AtomicU8::new(MicMode::Idle as u8)))
    }

    pub fn get(&self) -> MicMode {
        MicMode::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, mode: MicMode) {
        let previous = MicMode::from_u8(self.0.swap(mode as u8, Ordering::AcqRel));
        if previous != mode {
            tracing::debug!("mode {} -> {}", previous, mode);
        }
    }
}
