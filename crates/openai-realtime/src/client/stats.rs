/// Token usage accumulated over the session from `response.done` events.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Stats {
    responses: u64,
    total_tokens: u64,
    input_tokens: u64,
    output_tokens: u64,
    audio_appends: u64,
}

impl Stats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn update_usage(&mut self, total: u64, input: u64, output: u64) {
        self.responses += 1;
        self.total_tokens += total;
        self.input_tokens += input;
        self.output_tokens += output;
    }

    pub fn responses(&self) -> u64 {
        self.responses
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    pub fn input_tokens(&self) -> u64 {
        self.input_tokens
    }

    pub fn output_tokens(&self) -> u64 {
        self.output_tokens
    }

    /// Audio chunks appended to the input buffer.
    pub fn audio_appends(&self) -> u64 {
        self.audio_appends
    }

    pub(crate) fn with_audio_appends(mut self, audio_appends: u64) -> Self {
        self.audio_appends = audio_appends;
        self
    }
}
