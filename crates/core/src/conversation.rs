//! The event-driven half of a session: turns server events into device mode
//! changes, accumulated responses, tool calls and follow-up client events.

use crate::audio::AudioDevice;
use crate::error::AgentError;
use crate::mode::{MicMode, SharedMode};
use crate::output::Output;
use crate::response::{FunctionCall, ResponseInProgress};
use crate::tools::ToolRegistry;
use openai_realtime::Client;
use openai_realtime::types::events::client::{
    ConversationItemCreateEvent, InputAudioBufferCommitEvent, ResponseCreateEvent,
};
use openai_realtime::types::{ClientEvent, FunctionCallOutputItem, Item, ServerEvent};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

pub struct Conversation {
    client: Arc<Client>,
    device: Arc<dyn AudioDevice>,
    tools: Arc<ToolRegistry>,
    mode: SharedMode,
    response: Option<ResponseInProgress>,
    output: Option<mpsc::UnboundedSender<Output>>,
}

impl Conversation {
    pub fn new(client: Arc<Client>, device: Arc<dyn AudioDevice>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            client,
            device,
            tools,
            mode: SharedMode::new(),
            response: None,
            output: None,
        }
    }

    /// Streams text and transcript deltas to `output` as they arrive.
    pub fn with_output(mut self, output: mpsc::UnboundedSender<Output>) -> Self {
        self.output = Some(output);
        self
    }

    /// A read handle on the mode, for the capture loop.
    pub fn mode(&self) -> SharedMode {
        self.mode.clone()
    }

    pub fn response(&self) -> Option<&ResponseInProgress> {
        self.response.as_ref()
    }

    /// Opens the microphone for the first user turn.
    pub fn start(&self) {
        self.device.start_recording();
        self.mode.set(MicMode::Recording);
        tracing::info!("recording started, listening for speech...");
    }

    /// Processes events until the session ends. Any error closes the
    /// connection so the capture loop winds down too.
    pub async fn run(&mut self) -> Result<(), AgentError> {
        let result = self.receive_loop().await;
        if let Err(e) = &result {
            if let Some(response) = self.response.take() {
                if response.has_audio() {
                    tracing::warn!(
                        "discarding {} bytes of incomplete response audio",
                        response.audio_len()
                    );
                }
            }
            if !e.is_connection_lost() {
                tracing::error!("conversation failed: {}", e);
            }
            self.client.close();
        }
        result
    }

    async fn receive_loop(&mut self) -> Result<(), AgentError> {
        loop {
            let event = self.client.receive().await?;
            self.handle_event(event).await?;
        }
    }

    pub async fn handle_event(&mut self, event: ServerEvent) -> Result<(), AgentError> {
        match event {
            ServerEvent::ResponseCreated(e) => {
                if let Some(previous) = self.response.take() {
                    tracing::warn!(
                        "response {} replaced by {} before it was done",
                        previous.id(),
                        e.response().id()
                    );
                }
                self.response = Some(ResponseInProgress::new(e.response().id()));
                self.device.start_receiving();
                self.mode.set(MicMode::Receiving);
            }
            ServerEvent::ResponseOutputItemAdded(e) => {
                if let Item::FunctionCall(item) = e.item() {
                    let call = FunctionCall::new(item.name(), item.call_id());
                    tracing::info!("function call started: {} ({})", call.name(), call.call_id());
                    self.open_response("response.output_item.added")?
                        .open_call(call)?;
                }
            }
            ServerEvent::ResponseFunctionCallArgumentsDelta(e) => {
                let call = self.open_call("response.function_call_arguments.delta")?;
                check_call_id(call, e.call_id())?;
                call.append(e.delta());
            }
            ServerEvent::ResponseFunctionCallArgumentsDone(e) => {
                let call = self
                    .open_response("response.function_call_arguments.done")?
                    .take_call()
                    .ok_or_else(|| {
                        AgentError::Protocol(
                            "response.function_call_arguments.done without an open function call"
                                .to_string(),
                        )
                    })?;
                check_call_id(&call, e.call_id())?;
                self.dispatch(call).await?;
            }
            ServerEvent::ResponseTextDelta(e) => {
                self.open_response("response.text.delta")?
                    .push_text(e.delta());
                self.emit(Output::Text(e.delta().to_string()));
            }
            ServerEvent::ResponseAudioTranscriptDelta(e) => {
                self.open_response("response.audio_transcript.delta")?
                    .push_transcript(e.delta());
                self.emit(Output::Transcript(e.delta().to_string()));
            }
            ServerEvent::ResponseAudioDelta(e) => {
                let pcm16 = openai_realtime::audio::decode(e.delta())?;
                self.open_response("response.audio.delta")?
                    .push_audio(pcm16);
            }
            ServerEvent::ResponseDone(e) => {
                self.finish_response(e.response().id()).await?;
            }
            ServerEvent::InputAudioBufferSpeechStarted(_) => {
                tracing::info!("speech detected, listening...");
            }
            ServerEvent::InputAudioBufferSpeechStopped(_) => {
                self.device.stop_recording();
                self.mode.set(MicMode::Idle);
                tracing::info!("speech ended, processing...");
                self.client
                    .send(ClientEvent::InputAudioBufferCommit(
                        InputAudioBufferCommitEvent::new(),
                    ))
                    .await?;
            }
            ServerEvent::Error(e) => {
                let details = e.error();
                tracing::error!(
                    "server error: {} ({}{})",
                    details.message(),
                    details.error_type(),
                    details
                        .code()
                        .map(|code| format!(", code={}", code))
                        .unwrap_or_default()
                );
            }
            ServerEvent::SessionCreated(e) => {
                tracing::info!(
                    "session created: id={} model={}",
                    e.session().id().unwrap_or("-"),
                    e.session().model().unwrap_or("-")
                );
            }
            ServerEvent::SessionUpdated(_) => {
                tracing::info!("session updated");
            }
            _ => {}
        }
        Ok(())
    }

    async fn finish_response(&mut self, id: &str) -> Result<(), AgentError> {
        match self.response.take() {
            Some(mut response) => {
                tracing::info!("response {} complete", id);
                if response.has_audio() {
                    let audio = response.take_audio();
                    tracing::info!("playing {} bytes of audio data", audio.len());
                    self.device.play(audio).await.map_err(AgentError::Audio)?;
                }
            }
            None => tracing::warn!("response.done for {} without an open response", id),
        }
        self.emit(Output::ResponseDone);

        self.device.stop_receiving();
        self.mode.set(MicMode::Idle);
        self.device.start_recording();
        self.mode.set(MicMode::Recording);
        tracing::info!("resumed recording after response");
        Ok(())
    }

    /// Runs a completed call and hands its result back to the model.
    /// Tool failures become error results; only send failures are errors here.
    async fn dispatch(&self, call: FunctionCall) -> Result<(), AgentError> {
        let args = call.parse_arguments();
        tracing::info!(
            "calling function: {} with args: {}",
            call.name(),
            serde_json::Value::Object(args.clone())
        );

        let started = Instant::now();
        let result = match self.tools.invoke(call.name(), args).await {
            Ok(result) => {
                tracing::info!(
                    tool = call.name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "function call result: {}",
                    result
                );
                result
            }
            Err(e) => {
                tracing::error!(
                    tool = call.name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "function call failed: {}",
                    e
                );
                e.to_result(call.name())
            }
        };

        let item = Item::FunctionCallOutput(FunctionCallOutputItem::new(
            call.call_id(),
            &result.to_string(),
        ));
        self.client
            .send(ClientEvent::ConversationItemCreate(
                ConversationItemCreateEvent::new(item),
            ))
            .await?;
        self.client
            .send(ClientEvent::ResponseCreate(ResponseCreateEvent::new()))
            .await?;
        Ok(())
    }

    fn open_response(&mut self, event_type: &str) -> Result<&mut ResponseInProgress, AgentError> {
        self.response
            .as_mut()
            .ok_or_else(|| AgentError::Protocol(format!("{} without an open response", event_type)))
    }

    fn open_call(&mut self, event_type: &str) -> Result<&mut FunctionCall, AgentError> {
        self.open_response(event_type)?
            .function_call_mut()
            .ok_or_else(|| {
                AgentError::Protocol(format!("{} without an open function call", event_type))
            })
    }

    fn emit(&self, output: Output) {
        if let Some(tx) = &self.output {
            // the renderer may already be gone during shutdown
            let _ = tx.send(output);
        }
    }
}

fn check_call_id(call: &FunctionCall, call_id: &str) -> Result<(), AgentError> {
    if !call_id.is_empty() && call_id != call.call_id() {
        return Err(AgentError::Protocol(format!(
            "arguments for call {} while call {} is open",
            call_id,
            call.call_id()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MockAudioDevice;
    use crate::tools::{MockTool, ToolError};
    use mockall::Sequence;
    use openai_realtime::channel::{Channel, Remote};
    use openai_realtime::negotiation_session;
    use openai_realtime::types::tools::FunctionTool;
    use serde_json::{Value, json};

    fn quiet_device() -> MockAudioDevice {
        let mut device = MockAudioDevice::new();
        device.expect_start_recording().return_const(());
        device.expect_stop_recording().return_const(());
        device.expect_start_receiving().return_const(());
        device.expect_stop_receiving().return_const(());
        device.expect_play().returning(|_| Ok(()));
        device
    }

    fn tool(name: &'static str) -> MockTool {
        let mut tool = MockTool::new();
        tool.expect_definition().return_const(FunctionTool::new(
            name,
            "test tool",
            json!({"type": "object", "properties": {}}),
        ));
        tool
    }

    async fn conversation(device: MockAudioDevice, tools: ToolRegistry) -> (Conversation, Remote) {
        let (channel, mut remote) = Channel::in_memory(64);
        let client = Client::establish(channel, negotiation_session("test", tools.list()))
            .await
            .unwrap();
        remote.next_sent().await.unwrap();
        let conversation = Conversation::new(Arc::new(client), Arc::new(device), Arc::new(tools));
        (conversation, remote)
    }

    fn event(value: Value) -> ServerEvent {
        serde_json::from_value(value).unwrap()
    }

    fn response_created(id: &str) -> ServerEvent {
        event(json!({"type": "response.created", "event_id": "e", "response": {"id": id}}))
    }

    fn response_done(id: &str) -> ServerEvent {
        event(json!({"type": "response.done", "event_id": "e", "response": {"id": id}}))
    }

    fn call_added(name: &str, call_id: &str) -> ServerEvent {
        event(json!({
            "type": "response.output_item.added",
            "response_id": "r1",
            "output_index": 0,
            "item": {"id": "item_1", "type": "function_call", "status": "in_progress",
                     "name": name, "call_id": call_id, "arguments": ""}
        }))
    }

    fn args_delta(call_id: &str, delta: &str) -> ServerEvent {
        event(json!({"type": "response.function_call_arguments.delta", "call_id": call_id, "delta": delta}))
    }

    fn args_done(call_id: &str, arguments: &str) -> ServerEvent {
        event(json!({"type": "response.function_call_arguments.done", "call_id": call_id, "arguments": arguments}))
    }

    #[tokio::test]
    async fn test_mode_transitions_through_a_turn() {
        // Arrange
        let mut seq = Sequence::new();
        let mut device = MockAudioDevice::new();
        device.expect_start_recording().times(1).in_sequence(&mut seq).return_const(());
        device.expect_stop_recording().times(1).in_sequence(&mut seq).return_const(());
        device.expect_start_receiving().times(1).in_sequence(&mut seq).return_const(());
        device.expect_stop_receiving().times(1).in_sequence(&mut seq).return_const(());
        device.expect_start_recording().times(1).in_sequence(&mut seq).return_const(());
        let (mut conversation, mut remote) = conversation(device, ToolRegistry::new()).await;
        let mode = conversation.mode();

        // Act / Assert
        assert_eq!(mode.get(), MicMode::Idle);
        conversation.start();
        assert_eq!(mode.get(), MicMode::Recording);

        conversation
            .handle_event(event(json!({"type": "input_audio_buffer.speech_stopped", "audio_end_ms": 900, "item_id": "i1"})))
            .await
            .unwrap();
        assert_eq!(mode.get(), MicMode::Idle);
        assert_eq!(remote.next_sent().await.unwrap(), json!({"type": "input_audio_buffer.commit"}));

        conversation.handle_event(response_created("r1")).await.unwrap();
        assert_eq!(mode.get(), MicMode::Receiving);

        conversation.handle_event(response_done("r1")).await.unwrap();
        assert_eq!(mode.get(), MicMode::Recording);
        assert!(conversation.response().is_none());
    }

    #[tokio::test]
    async fn test_text_deltas_accumulate_and_stream_to_output() {
        let (conversation, _remote) = conversation(quiet_device(), ToolRegistry::new()).await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut conversation = conversation.with_output(tx);

        conversation.handle_event(response_created("r1")).await.unwrap();
        for delta in ["Hel", "lo", ", world"] {
            conversation
                .handle_event(event(json!({"type": "response.text.delta", "response_id": "r1", "delta": delta})))
                .await
                .unwrap();
        }

        assert_eq!(conversation.response().unwrap().text(), "Hello, world");
        conversation.handle_event(response_done("r1")).await.unwrap();
        let mut outputs = Vec::new();
        while let Ok(output) = rx.try_recv() {
            outputs.push(output);
        }
        assert_eq!(
            outputs,
            vec![
                Output::Text("Hel".into()),
                Output::Text("lo".into()),
                Output::Text(", world".into()),
                Output::ResponseDone,
            ]
        );
    }

    #[tokio::test]
    async fn test_audio_is_played_once_at_response_done() {
        // Arrange
        let mut device = MockAudioDevice::new();
        device.expect_start_receiving().return_const(());
        device.expect_stop_receiving().return_const(());
        device.expect_start_recording().return_const(());
        device
            .expect_play()
            .times(1)
            .withf(|pcm16| pcm16 == &vec![0x00, 0x01, 0xff, 0x7f])
            .returning(|_| Ok(()));
        let (mut conversation, _remote) = conversation(device, ToolRegistry::new()).await;

        // Act
        conversation.handle_event(response_created("r1")).await.unwrap();
        for delta in ["AAE=", "/38="] {
            conversation
                .handle_event(event(json!({"type": "response.audio.delta", "delta": delta})))
                .await
                .unwrap();
        }
        conversation.handle_event(response_done("r1")).await.unwrap();

        // Assert: expectations checked when the mock drops
    }

    #[tokio::test]
    async fn test_undecodable_audio_is_protocol_error() {
        let (mut conversation, _remote) = conversation(quiet_device(), ToolRegistry::new()).await;
        conversation.handle_event(response_created("r1")).await.unwrap();

        let result = conversation
            .handle_event(event(json!({"type": "response.audio.delta", "delta": "***"})))
            .await;

        assert!(result.unwrap_err().is_protocol());
    }

    #[tokio::test]
    async fn test_second_function_call_is_protocol_error() {
        let (mut conversation, _remote) = conversation(quiet_device(), ToolRegistry::new()).await;
        conversation.handle_event(response_created("r1")).await.unwrap();
        conversation.handle_event(call_added("create_file", "c1")).await.unwrap();

        let result = conversation.handle_event(call_added("delete_file", "c2")).await;

        assert!(matches!(result, Err(AgentError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_second_response_created_replaces_open_response() {
        // Arrange
        let (mut conversation, _remote) = conversation(quiet_device(), ToolRegistry::new()).await;
        conversation.handle_event(response_created("r1")).await.unwrap();
        conversation
            .handle_event(event(json!({"type": "response.text.delta", "response_id": "r1", "delta": "stale"})))
            .await
            .unwrap();
        conversation.handle_event(call_added("create_file", "c1")).await.unwrap();

        // Act
        let result = conversation.handle_event(response_created("r2")).await;

        // Assert
        assert!(result.is_ok());
        let response = conversation.response().unwrap();
        assert_eq!(response.id(), "r2");
        assert_eq!(response.text(), "");
        assert!(response.function_call().is_none());
        assert_eq!(conversation.mode().get(), MicMode::Receiving);
    }

    #[tokio::test]
    async fn test_argument_delta_without_open_call_is_protocol_error() {
        let (mut conversation, _remote) = conversation(quiet_device(), ToolRegistry::new()).await;
        conversation.handle_event(response_created("r1")).await.unwrap();

        let result = conversation.handle_event(args_delta("c1", "{}")).await;

        assert!(matches!(result, Err(AgentError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_mismatched_call_id_is_protocol_error() {
        let (mut conversation, _remote) = conversation(quiet_device(), ToolRegistry::new()).await;
        conversation.handle_event(response_created("r1")).await.unwrap();
        conversation.handle_event(call_added("create_file", "c1")).await.unwrap();

        let result = conversation.handle_event(args_delta("c9", "{}")).await;

        assert!(matches!(result, Err(AgentError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_echo_tool_result_is_returned_unmodified() {
        // Arrange
        let mut echo = tool("echo");
        echo.expect_execute()
            .times(1)
            .returning(|args| Ok(Value::Object(args)));
        let (mut conversation, mut remote) =
            conversation(quiet_device(), ToolRegistry::new().with_tool(echo)).await;

        // Act
        conversation.handle_event(response_created("r1")).await.unwrap();
        conversation.handle_event(call_added("echo", "c1")).await.unwrap();
        conversation.handle_event(args_delta("c1", r#"{"x":1}"#)).await.unwrap();
        conversation.handle_event(args_done("c1", r#"{"x":1}"#)).await.unwrap();

        // Assert
        let item = remote.next_sent().await.unwrap();
        assert_eq!(item["type"], "conversation.item.create");
        assert_eq!(item["item"]["call_id"], "c1");
        let output: Value = serde_json::from_str(item["item"]["output"].as_str().unwrap()).unwrap();
        assert_eq!(output, json!({"x": 1}));
        assert!(conversation.response().unwrap().function_call().is_none());
    }

    #[tokio::test]
    async fn test_missing_tool_returns_error_and_session_continues() {
        // Arrange
        let (mut conversation, mut remote) =
            conversation(quiet_device(), ToolRegistry::new().with_tool(tool("echo"))).await;

        // Act
        conversation.handle_event(response_created("r1")).await.unwrap();
        conversation.handle_event(call_added("missing_tool", "c1")).await.unwrap();
        conversation.handle_event(args_done("c1", "")).await.unwrap();
        conversation
            .handle_event(event(json!({"type": "response.text.delta", "delta": "still here"})))
            .await
            .unwrap();

        // Assert
        let item = remote.next_sent().await.unwrap();
        let output: Value = serde_json::from_str(item["item"]["output"].as_str().unwrap()).unwrap();
        assert_eq!(output, json!({"error": "Function 'missing_tool' not found."}));
        assert_eq!(remote.next_sent().await.unwrap()["type"], "response.create");
        assert_eq!(conversation.response().unwrap().text(), "still here");
    }

    #[tokio::test]
    async fn test_failing_tool_result_names_the_function() {
        let mut broken = tool("create_file");
        broken
            .expect_execute()
            .returning(|_| Err(ToolError::Execution(anyhow::anyhow!("disk full"))));
        let (mut conversation, mut remote) =
            conversation(quiet_device(), ToolRegistry::new().with_tool(broken)).await;

        conversation.handle_event(response_created("r1")).await.unwrap();
        conversation.handle_event(call_added("create_file", "c1")).await.unwrap();
        conversation.handle_event(args_done("c1", "{}")).await.unwrap();

        let item = remote.next_sent().await.unwrap();
        let output: Value = serde_json::from_str(item["item"]["output"].as_str().unwrap()).unwrap();
        assert_eq!(
            output,
            json!({"error": "Error executing function 'create_file': disk full"})
        );
    }

    #[tokio::test]
    async fn test_unparseable_arguments_dispatch_with_empty_object() {
        let mut echo = tool("echo");
        echo.expect_execute()
            .times(1)
            .withf(|args| args.is_empty())
            .returning(|_| Ok(json!({"ok": true})));
        let (mut conversation, mut remote) =
            conversation(quiet_device(), ToolRegistry::new().with_tool(echo)).await;

        conversation.handle_event(response_created("r1")).await.unwrap();
        conversation.handle_event(call_added("echo", "c1")).await.unwrap();
        conversation.handle_event(args_delta("c1", "{not json")).await.unwrap();
        conversation.handle_event(args_done("c1", "{not json")).await.unwrap();

        assert_eq!(remote.next_sent().await.unwrap()["type"], "conversation.item.create");
        assert_eq!(remote.next_sent().await.unwrap()["type"], "response.create");
        conversation.handle_event(response_done("r1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_and_error_events_are_not_fatal() {
        let (mut conversation, _remote) = conversation(quiet_device(), ToolRegistry::new()).await;

        conversation
            .handle_event(event(json!({"type": "response.content_part.added"})))
            .await
            .unwrap();
        conversation
            .handle_event(event(json!({
                "type": "error",
                "event_id": "e1",
                "error": {"type": "invalid_request_error", "message": "bad"}
            })))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_file_call_end_to_end() {
        // Arrange
        let mut create_file = MockTool::new();
        let definition = FunctionTool::new(
            "create_file",
            "Creates a new file with the given name and content.",
            json!({
                "type": "object",
                "properties": {
                    "file_name": {"type": "string"},
                    "content": {"type": "string"}
                },
                "required": ["file_name", "content"]
            }),
        );
        create_file.expect_definition().return_const(definition.clone());
        create_file
            .expect_execute()
            .times(1)
            .withf(|args| {
                Value::Object(args.clone()) == json!({"file_name": "a.txt", "content": "hi"})
            })
            .returning(|_| Ok(json!({"status": "File 'a.txt' created"})));
        let tools = ToolRegistry::new().with_tool(create_file);
        let (channel, mut remote) = Channel::in_memory(64);
        let client = Client::establish(channel, negotiation_session("test", tools.list()))
            .await
            .unwrap();
        let mut conversation =
            Conversation::new(Arc::new(client), Arc::new(quiet_device()), Arc::new(tools));

        // Act
        for server_event in [
            json!({"type": "response.created", "response": {"id": "r1"}}),
            json!({"type": "response.output_item.added", "item": {"type": "function_call", "name": "create_file", "call_id": "c1"}}),
            json!({"type": "response.function_call_arguments.delta", "call_id": "c1", "delta": "{\"file_name\":\"a.txt\","}),
            json!({"type": "response.function_call_arguments.delta", "call_id": "c1", "delta": "\"content\":\"hi\"}"}),
            json!({"type": "response.function_call_arguments.done", "call_id": "c1", "arguments": "{\"file_name\":\"a.txt\",\"content\":\"hi\"}"}),
        ] {
            remote.push(server_event).await;
        }
        remote.close(None).await;
        let result = conversation.run().await;

        // Assert
        assert!(result.unwrap_err().is_connection_lost());
        let sent = remote.drain_sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0]["type"], "session.update");
        assert_eq!(
            sent[0]["session"]["tools"],
            json!([{
                "type": "function",
                "name": "create_file",
                "description": definition.description(),
                "parameters": definition.parameters()
            }])
        );
        assert_eq!(sent[1]["type"], "conversation.item.create");
        assert_eq!(sent[1]["item"]["type"], "function_call_output");
        assert_eq!(sent[1]["item"]["call_id"], "c1");
        assert_eq!(
            serde_json::from_str::<Value>(sent[1]["item"]["output"].as_str().unwrap()).unwrap(),
            json!({"status": "File 'a.txt' created"})
        );
        assert_eq!(sent[2], json!({"type": "response.create"}));
    }

    #[tokio::test]
    async fn test_malformed_message_ends_the_session() {
        let (mut conversation, remote) = conversation(quiet_device(), ToolRegistry::new()).await;
        remote.push_text("{not json").await;

        let result = conversation.run().await;

        assert!(result.unwrap_err().is_protocol());
        assert!(conversation.run().await.unwrap_err().is_connection_lost());
    }
}
