pub mod audio;
pub mod capture;
pub mod conversation;
pub mod error;
pub mod mode;
pub mod output;
pub mod response;
pub mod tools;

pub use audio::AudioDevice;
pub use capture::CaptureLoop;
pub use conversation::Conversation;
pub use error::AgentError;
pub use mode::{MicMode, SharedMode};
pub use output::{Console, Output};
pub use tools::{Arguments, Tool, ToolError, ToolRegistry};
