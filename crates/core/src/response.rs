use crate::error::AgentError;
use crate::tools::Arguments;

/// A tool call the model is streaming arguments for.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    name: String,
    call_id: String,
    arguments: String,
}

impl FunctionCall {
    pub fn new(name: &str, call_id: &str) -> Self {
        Self {
            name: name.to_string(),
            call_id: call_id.to_string(),
            arguments: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn arguments(&self) -> &str {
        &self.arguments
    }

    pub fn append(&mut self, delta: &str) {
        self.arguments.push_str(delta);
    }

    /// Parses the buffered argument text. An empty buffer means no
    /// arguments; anything that is not a JSON object is logged and treated
    /// the same way so the call still gets an answer.
    pub fn parse_arguments(&self) -> Arguments {
        if self.arguments.trim().is_empty() {
            return Arguments::new();
        }
        match serde_json::from_str::<serde_json::Value>(&self.arguments) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(other) => {
                tracing::error!(
                    "function arguments for '{}' are not an object: {}",
                    self.name,
                    other
                );
                Arguments::new()
            }
            Err(e) => {
                tracing::error!(
                    "failed to parse function arguments for '{}': {} ({:?})",
                    self.name,
                    e,
                    self.arguments
                );
                Arguments::new()
            }
        }
    }
}

/// Everything streamed for the response currently being generated.
#[derive(Debug, Default)]
pub struct ResponseInProgress {
    id: String,
    text: Vec<String>,
    transcript: Vec<String>,
    audio: Vec<Vec<u8>>,
    function_call: Option<FunctionCall>,
}

impl ResponseInProgress {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn push_text(&mut self, delta: &str) {
        self.text.push(delta.to_string());
    }

    pub fn text(&self) -> String {
        self.text.concat()
    }

    pub fn push_transcript(&mut self, delta: &str) {
        self.transcript.push(delta.to_string());
    }

    pub fn transcript(&self) -> String {
        self.transcript.concat()
    }

    pub fn push_audio(&mut self, pcm16: Vec<u8>) {
        self.audio.push(pcm16);
    }

    pub fn has_audio(&self) -> bool {
        self.audio.iter().any(|fragment| !fragment.is_empty())
    }

    pub fn audio_len(&self) -> usize {
        self.audio.iter().map(Vec::len).sum()
    }

    /// Joins and removes the buffered audio.
    pub fn take_audio(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.audio).concat()
    }

    pub fn function_call(&self) -> Option<&FunctionCall> {
        self.function_call.as_ref()
    }

    pub fn function_call_mut(&mut self) -> Option<&mut FunctionCall> {
        self.function_call.as_mut()
    }

    /// Only one call may stream at a time.
    pub fn open_call(&mut self, call: FunctionCall) -> Result<(), AgentError> {
        if let Some(open) = &self.function_call {
            return Err(AgentError::Protocol(format!(
                "function call '{}' ({}) opened while '{}' ({}) is still open",
                call.name, call.call_id, open.name, open.call_id
            )));
        }
        self.function_call = Some(call);
        Ok(())
    }

    pub fn take_call(&mut self) -> Option<FunctionCall> {
        self.function_call.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_is_concatenation_of_deltas_for_any_split() {
        let full = "Hello there, I created a.txt für dich.";
        let boundaries: Vec<usize> = (0..=full.len())
            .filter(|&i| full.is_char_boundary(i))
            .collect();
        for &i in &boundaries {
            for &j in boundaries.iter().filter(|&&j| j >= i) {
                let mut response = ResponseInProgress::new("r1");
                response.push_text(&full[..i]);
                response.push_text(&full[i..j]);
                response.push_text(&full[j..]);
                assert_eq!(response.text(), full);
            }
        }
    }

    #[test]
    fn test_second_open_call_is_rejected() {
        let mut response = ResponseInProgress::new("r1");
        response.open_call(FunctionCall::new("create_file", "c1")).unwrap();

        let result = response.open_call(FunctionCall::new("delete_file", "c2"));

        assert!(matches!(result, Err(AgentError::Protocol(_))));
        assert_eq!(response.function_call().unwrap().call_id(), "c1");
    }

    #[test]
    fn test_audio_fragments_are_joined_in_order() {
        let mut response = ResponseInProgress::new("r1");
        response.push_audio(vec![1, 2]);
        response.push_audio(vec![]);
        response.push_audio(vec![3]);

        assert!(response.has_audio());
        assert_eq!(response.audio_len(), 3);
        assert_eq!(response.take_audio(), vec![1, 2, 3]);
        assert!(!response.has_audio());
    }

    #[test]
    fn test_parse_arguments() {
        let mut call = FunctionCall::new("create_file", "c1");
        assert!(call.parse_arguments().is_empty());

        call.append(r#"{"file_name":"a.txt","#);
        call.append(r#""content":"hi"}"#);
        assert_eq!(
            serde_json::Value::Object(call.parse_arguments()),
            json!({"file_name": "a.txt", "content": "hi"})
        );
    }

    #[test]
    fn test_unparseable_arguments_become_empty() {
        let mut call = FunctionCall::new("echo", "c1");
        call.append("{not json");
        assert!(call.parse_arguments().is_empty());

        let mut call = FunctionCall::new("echo", "c2");
        call.append("[1, 2]");
        assert!(call.parse_arguments().is_empty());
    }
}
