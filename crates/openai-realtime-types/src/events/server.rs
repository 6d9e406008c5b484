mod error;
mod resources;

pub use error::ErrorDetails;
pub use resources::{RateLimitInformation, ResponseResource, SessionResource, Usage};

use crate::Item;

/// `error` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorEvent {
    #[serde(default)]
    event_id: String,

    /// Details about the error
    error: ErrorDetails,
}

impl ErrorEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn error(&self) -> &ErrorDetails {
        &self.error
    }
}

/// `session.created` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SessionCreatedEvent {
    #[serde(default)]
    event_id: String,

    session: SessionResource,
}

impl SessionCreatedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn session(&self) -> &SessionResource {
        &self.session
    }
}

/// `session.updated` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SessionUpdatedEvent {
    #[serde(default)]
    event_id: String,

    session: SessionResource,
}

impl SessionUpdatedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn session(&self) -> &SessionResource {
        &self.session
    }
}

/// `input_audio_buffer.committed` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InputAudioBufferCommittedEvent {
    #[serde(default)]
    event_id: String,

    /// The ID of the preceding item after which the new item will be inserted
    #[serde(default)]
    previous_item_id: Option<String>,

    /// The ID of the user message item that will be created
    #[serde(default)]
    item_id: String,
}

impl InputAudioBufferCommittedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn previous_item_id(&self) -> Option<&str> {
        self.previous_item_id.as_deref()
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

/// `input_audio_buffer.speech_started` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InputAudioBufferSpeechStartedEvent {
    #[serde(default)]
    event_id: String,

    /// Milliseconds since the session started when speech was detected
    #[serde(default)]
    audio_start_ms: u32,

    /// The ID of the user message item that will be created when speech stops
    #[serde(default)]
    item_id: String,
}

impl InputAudioBufferSpeechStartedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn audio_start_ms(&self) -> u32 {
        self.audio_start_ms
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

/// `input_audio_buffer.speech_stopped` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InputAudioBufferSpeechStoppedEvent {
    #[serde(default)]
    event_id: String,

    /// Milliseconds since the session started when speech stopped
    #[serde(default)]
    audio_end_ms: u32,

    #[serde(default)]
    item_id: String,
}

impl InputAudioBufferSpeechStoppedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn audio_end_ms(&self) -> u32 {
        self.audio_end_ms
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

/// `conversation.item.created` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ConversationItemCreatedEvent {
    #[serde(default)]
    event_id: String,

    #[serde(default)]
    previous_item_id: Option<String>,

    /// The item that was created
    item: Item,
}

impl ConversationItemCreatedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn previous_item_id(&self) -> Option<&str> {
        self.previous_item_id.as_deref()
    }

    pub fn item(&self) -> &Item {
        &self.item
    }
}

/// `response.created` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResponseCreatedEvent {
    #[serde(default)]
    event_id: String,

    response: ResponseResource,
}

impl ResponseCreatedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn response(&self) -> &ResponseResource {
        &self.response
    }
}

/// `response.done` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResponseDoneEvent {
    #[serde(default)]
    event_id: String,

    response: ResponseResource,
}

impl ResponseDoneEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn response(&self) -> &ResponseResource {
        &self.response
    }
}

/// `response.output_item.added` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResponseOutputItemAddedEvent {
    #[serde(default)]
    event_id: String,

    /// The ID of the response to which the item belongs
    #[serde(default)]
    response_id: String,

    /// The index of the output item in the response
    #[serde(default)]
    output_index: u32,

    /// The item that was added
    item: Item,
}

impl ResponseOutputItemAddedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn output_index(&self) -> u32 {
        self.output_index
    }

    pub fn item(&self) -> &Item {
        &self.item
    }
}

/// `response.output_item.done` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResponseOutputItemDoneEvent {
    #[serde(default)]
    event_id: String,

    #[serde(default)]
    response_id: String,

    #[serde(default)]
    output_index: u32,

    /// The completed item
    item: Item,
}

impl ResponseOutputItemDoneEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn output_index(&self) -> u32 {
        self.output_index
    }

    pub fn item(&self) -> &Item {
        &self.item
    }
}

/// Streamed content delta. Shared shape of `response.text.delta`,
/// `response.audio_transcript.delta` and `response.audio.delta`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ContentDeltaEvent {
    #[serde(default)]
    event_id: String,

    #[serde(default)]
    response_id: String,

    #[serde(default)]
    item_id: String,

    #[serde(default)]
    output_index: u32,

    #[serde(default)]
    content_index: u32,

    /// The delta; base64 PCM16 for audio, plain text otherwise
    delta: String,
}

impl ContentDeltaEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn output_index(&self) -> u32 {
        self.output_index
    }

    pub fn content_index(&self) -> u32 {
        self.content_index
    }

    pub fn delta(&self) -> &str {
        &self.delta
    }
}

pub type ResponseTextDeltaEvent = ContentDeltaEvent;
pub type ResponseAudioTranscriptDeltaEvent = ContentDeltaEvent;
pub type ResponseAudioDeltaEvent = ContentDeltaEvent;

/// `response.text.done` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResponseTextDoneEvent {
    #[serde(default)]
    event_id: String,

    #[serde(default)]
    response_id: String,

    #[serde(default)]
    item_id: String,

    /// The completed text content
    #[serde(default)]
    text: String,
}

impl ResponseTextDoneEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// `response.audio.done` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResponseAudioDoneEvent {
    #[serde(default)]
    event_id: String,

    #[serde(default)]
    response_id: String,

    #[serde(default)]
    item_id: String,
}

impl ResponseAudioDoneEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

/// `response.function_call_arguments.delta` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResponseFunctionCallArgumentsDeltaEvent {
    #[serde(default)]
    event_id: String,

    #[serde(default)]
    response_id: String,

    /// The ID of the function call item
    #[serde(default)]
    item_id: String,

    #[serde(default)]
    output_index: u32,

    /// The ID of the function call
    #[serde(default)]
    call_id: String,

    /// The delta in the function calling arguments
    delta: String,
}

impl ResponseFunctionCallArgumentsDeltaEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn output_index(&self) -> u32 {
        self.output_index
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn delta(&self) -> &str {
        &self.delta
    }
}

/// `response.function_call_arguments.done` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResponseFunctionCallArgumentsDoneEvent {
    #[serde(default)]
    event_id: String,

    #[serde(default)]
    response_id: String,

    #[serde(default)]
    item_id: String,

    #[serde(default)]
    output_index: u32,

    #[serde(default)]
    call_id: String,

    /// The completed function calling arguments, as reported by the server
    #[serde(default)]
    arguments: String,
}

impl ResponseFunctionCallArgumentsDoneEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn output_index(&self) -> u32 {
        self.output_index
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn arguments(&self) -> &str {
        &self.arguments
    }
}

/// `rate_limits.updated` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RateLimitsUpdatedEvent {
    #[serde(default)]
    event_id: String,

    #[serde(default)]
    rate_limits: Vec<RateLimitInformation>,
}

impl RateLimitsUpdatedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn rate_limits(&self) -> &[RateLimitInformation] {
        &self.rate_limits
    }
}
