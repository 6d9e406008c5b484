use crate::audio::Base64EncodedAudioBytes;
use crate::content::items::{ItemHeader, ItemStatus};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MessageItem {
    #[serde(flatten)]
    header: ItemHeader,

    /// The role of the message sender: "user", "assistant", "system"
    role: MessageRole,

    /// The content of the message
    #[serde(default)]
    content: Vec<Content>,
}

impl MessageItem {
    pub fn id(&self) -> Option<&str> {
        self.header.id.as_deref()
    }

    pub fn status(&self) -> Option<&ItemStatus> {
        self.header.status.as_ref()
    }

    pub fn role(&self) -> &MessageRole {
        &self.role
    }

    pub fn content(&self) -> &[Content] {
        &self.content
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "input_text")]
    InputText { text: String },
    /// User audio. Server echoes carry the transcript instead of the bytes.
    #[serde(rename = "input_audio")]
    InputAudio {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        audio: Option<Base64EncodedAudioBytes>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transcript: Option<String>,
    },
    #[serde(rename = "text")]
    Text { text: String },
    /// Assistant audio; the server fills the transcript in as it streams.
    #[serde(rename = "audio")]
    Audio {
        #[serde(default)]
        transcript: Option<String>,
    },
    /// A content part of a kind this crate does not model.
    #[serde(other)]
    Other,
}
