use std::time::{Duration, Instant};

/// Minimum time between two audio append summaries.
pub const AUDIO_APPEND_LOG_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

impl Direction {
    fn arrow(self) -> &'static str {
        match self {
            Direction::Outgoing => "->",
            Direction::Incoming => "<-",
        }
    }
}

/// Coarse grouping of event types, used as a log field.
pub fn category(event_type: &str) -> &'static str {
    match event_type.split('.').next().unwrap_or_default() {
        "session" => "session",
        "input_audio_buffer" => "input_audio",
        "conversation" => "conversation",
        "response" => "response",
        "rate_limits" => "rate_limits",
        "error" => "error",
        _ => "other",
    }
}

pub fn log_event(direction: Direction, event_type: &str, event_id: Option<&str>) {
    tracing::debug!(
        category = category(event_type),
        "{} {} id={}",
        direction.arrow(),
        event_type,
        event_id.unwrap_or("-")
    );
}

/// Counts audio append events and decides when a summary is due, so the
/// per-chunk appends never flood the log.
#[derive(Debug)]
pub struct AudioAppendLog {
    count: u64,
    last_logged: Option<Instant>,
    interval: Duration,
}

impl Default for AudioAppendLog {
    fn default() -> Self {
        Self::new(AUDIO_APPEND_LOG_INTERVAL)
    }
}

impl AudioAppendLog {
    pub fn new(interval: Duration) -> Self {
        Self {
            count: 0,
            last_logged: None,
            interval,
        }
    }

    /// Records one append. Returns the running total when a summary should be logged.
    pub fn record(&mut self, now: Instant) -> Option<u64> {
        self.count += 1;
        let due = match self.last_logged {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if due {
            self.last_logged = Some(now);
            Some(self.count)
        } else {
            None
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}
