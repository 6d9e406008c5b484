pub mod client;
pub mod server;

use client::*;
use server::*;

pub const INPUT_AUDIO_BUFFER_APPEND: &str = "input_audio_buffer.append";

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "session.update")]
    SessionUpdate(SessionUpdateEvent),
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioBufferAppend(InputAudioBufferAppendEvent),
    #[serde(rename = "input_audio_buffer.commit")]
    InputAudioBufferCommit(InputAudioBufferCommitEvent),
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate(ConversationItemCreateEvent),
    #[serde(rename = "response.create")]
    ResponseCreate(ResponseCreateEvent),
}

impl ClientEvent {
    /// The wire `type` discriminator of this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            ClientEvent::SessionUpdate(_) => "session.update",
            ClientEvent::InputAudioBufferAppend(_) => INPUT_AUDIO_BUFFER_APPEND,
            ClientEvent::InputAudioBufferCommit(_) => "input_audio_buffer.commit",
            ClientEvent::ConversationItemCreate(_) => "conversation.item.create",
            ClientEvent::ResponseCreate(_) => "response.create",
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "error")]
    Error(ErrorEvent),
    #[serde(rename = "session.created")]
    SessionCreated(SessionCreatedEvent),
    #[serde(rename = "session.updated")]
    SessionUpdated(SessionUpdatedEvent),
    #[serde(rename = "input_audio_buffer.committed")]
    InputAudioBufferCommitted(InputAudioBufferCommittedEvent),
    #[serde(rename = "input_audio_buffer.speech_started")]
    InputAudioBufferSpeechStarted(InputAudioBufferSpeechStartedEvent),
    #[serde(rename = "input_audio_buffer.speech_stopped")]
    InputAudioBufferSpeechStopped(InputAudioBufferSpeechStoppedEvent),
    #[serde(rename = "conversation.item.created")]
    ConversationItemCreated(ConversationItemCreatedEvent),
    #[serde(rename = "response.created")]
    ResponseCreated(ResponseCreatedEvent),
    #[serde(rename = "response.done")]
    ResponseDone(ResponseDoneEvent),
    #[serde(rename = "response.output_item.added")]
    ResponseOutputItemAdded(ResponseOutputItemAddedEvent),
    #[serde(rename = "response.output_item.done")]
    ResponseOutputItemDone(ResponseOutputItemDoneEvent),
    #[serde(rename = "response.text.delta")]
    ResponseTextDelta(ResponseTextDeltaEvent),
    #[serde(rename = "response.text.done")]
    ResponseTextDone(ResponseTextDoneEvent),
    #[serde(rename = "response.audio_transcript.delta")]
    ResponseAudioTranscriptDelta(ResponseAudioTranscriptDeltaEvent),
    #[serde(rename = "response.audio.delta")]
    ResponseAudioDelta(ResponseAudioDeltaEvent),
    #[serde(rename = "response.audio.done")]
    ResponseAudioDone(ResponseAudioDoneEvent),
    #[serde(rename = "response.function_call_arguments.delta")]
    ResponseFunctionCallArgumentsDelta(ResponseFunctionCallArgumentsDeltaEvent),
    #[serde(rename = "response.function_call_arguments.done")]
    ResponseFunctionCallArgumentsDone(ResponseFunctionCallArgumentsDoneEvent),
    #[serde(rename = "rate_limits.updated")]
    RateLimitsUpdated(RateLimitsUpdatedEvent),
    /// Any event type this crate does not model.
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_server_event_type_is_tolerated() {
        let event: ServerEvent =
            serde_json::from_str(r#"{"type":"response.content_part.added","event_id":"e1"}"#)
                .unwrap();
        assert!(matches!(event, ServerEvent::Unknown));
    }

    #[test]
    fn test_known_type_with_bad_payload_is_rejected() {
        let result = serde_json::from_value::<ServerEvent>(json!({
            "type": "response.text.delta",
            "delta": 42
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_client_event_type_matches_wire_tag() {
        let events = vec![
            ClientEvent::SessionUpdate(SessionUpdateEvent::new(crate::Session::builder().build())),
            ClientEvent::ConversationItemCreate(ConversationItemCreateEvent::new(
                crate::Item::FunctionCallOutput(crate::FunctionCallOutputItem::new("c1", "{}")),
            )),
            ClientEvent::InputAudioBufferAppend(InputAudioBufferAppendEvent::new("AAA=".into())),
            ClientEvent::InputAudioBufferCommit(InputAudioBufferCommitEvent::new()),
            ClientEvent::ResponseCreate(ResponseCreateEvent::new()),
        ];
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["type"], event.event_type());
        }
    }

    #[test]
    fn test_commit_event_has_no_null_fields() {
        let event = ClientEvent::InputAudioBufferCommit(InputAudioBufferCommitEvent::new());
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "input_audio_buffer.commit"})
        );
    }
}
