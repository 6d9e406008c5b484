use crate::parse_args;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use openai_realtime_types::tools::FunctionTool;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use voice_agent_core::{Arguments, Tool, ToolError};

/// Hands a URL to something that can show it.
#[cfg_attr(test, automock)]
pub trait BrowserOpener: Send + Sync {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Opens URLs in the user's default browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserOpener for SystemBrowser {
    fn open(&self, url: &str) -> std::io::Result<()> {
        webbrowser::open(url)
    }
}

#[derive(Deserialize)]
struct OpenBrowserArgs {
    url: String,
}

pub struct OpenBrowserTool {
    opener: Arc<dyn BrowserOpener>,
}

impl OpenBrowserTool {
    pub fn new(opener: Arc<dyn BrowserOpener>) -> Self {
        Self { opener }
    }
}

impl Default for OpenBrowserTool {
    fn default() -> Self {
        Self::new(Arc::new(SystemBrowser))
    }
}

#[async_trait]
impl Tool for OpenBrowserTool {
    fn definition(&self) -> FunctionTool {
        FunctionTool::new(
            "open_browser",
            "Opens a browser tab with the specified URL.",
            json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "The URL to open in the browser."
                    }
                },
                "required": ["url"]
            }),
        )
    }

    async fn execute(&self, args: Arguments) -> Result<Value, ToolError> {
        let OpenBrowserArgs { url } = parse_args(args)?;
        let opener = self.opener.clone();
        let target = url.clone();
        // some platforms block until the browser process returns
        let opened = tokio::task::spawn_blocking(move || opener.open(&target))
            .await
            .map_err(|e| ToolError::Execution(anyhow::anyhow!("browser task failed: {}", e)))?;

        match opened {
            Ok(()) => {
                tracing::info!(url = %url, "opened browser");
                Ok(json!({ "status": "Browser opened", "url": url }))
            }
            Err(e) => {
                tracing::warn!(url = %url, "failed to open browser: {}", e);
                Ok(json!({ "status": "Error", "message": e.to_string() }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_open_browser_reports_url() {
        // Arrange
        let mut opener = MockBrowserOpener::new();
        opener
            .expect_open()
            .withf(|url| url == "https://example.com")
            .times(1)
            .returning(|_| Ok(()));
        let tool = OpenBrowserTool::new(Arc::new(opener));

        // Act
        let result = tool
            .execute(args(json!({"url": "https://example.com"})))
            .await
            .unwrap();

        // Assert
        assert_eq!(
            result,
            json!({"status": "Browser opened", "url": "https://example.com"})
        );
    }

    #[tokio::test]
    async fn test_open_browser_failure_is_a_result() {
        let mut opener = MockBrowserOpener::new();
        opener
            .expect_open()
            .returning(|_| Err(std::io::Error::other("no browser found")));
        let tool = OpenBrowserTool::new(Arc::new(opener));

        let result = tool
            .execute(args(json!({"url": "https://example.com"})))
            .await
            .unwrap();

        assert_eq!(
            result,
            json!({"status": "Error", "message": "no browser found"})
        );
    }

    #[tokio::test]
    async fn test_open_browser_requires_url() {
        let mut opener = MockBrowserOpener::new();
        opener.expect_open().never();
        let tool = OpenBrowserTool::new(Arc::new(opener));

        let err = tool.execute(Arguments::new()).await.unwrap_err();

        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
