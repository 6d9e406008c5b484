//! The functions the assistant can call: file management inside a scratch
//! pad and opening URLs in a browser.

pub mod browser;
pub mod files;

pub use browser::{BrowserOpener, OpenBrowserTool, SystemBrowser};
pub use files::{CreateFileTool, DeleteFileTool, ScratchPad, UpdateFileTool};

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use voice_agent_core::{Arguments, ToolError, ToolRegistry};

pub const DEFAULT_SCRATCH_PAD_DIR: &str = "./scratchpad";

pub(crate) fn parse_args<T: DeserializeOwned>(args: Arguments) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Every built-in tool, with the file tools rooted at `scratch_pad`.
pub fn registry(scratch_pad: impl Into<PathBuf>) -> ToolRegistry {
    let pad = Arc::new(ScratchPad::new(scratch_pad));
    tracing::debug!("scratch pad at {}", pad.dir().display());

    ToolRegistry::new()
        .with_tool(CreateFileTool::new(pad.clone()))
        .with_tool(UpdateFileTool::new(pad.clone()))
        .with_tool(DeleteFileTool::new(pad))
        .with_tool(OpenBrowserTool::default())
}
