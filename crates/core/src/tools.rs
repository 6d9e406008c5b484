//! Local functions the remote model can call, and the registry that
//! advertises and dispatches them.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use openai_realtime_types::tools::{FunctionTool, Tool as ToolDescriptor};
use serde_json::{Map, Value, json};
use std::sync::Arc;

pub type Arguments = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Function '{0}' not found.")]
    NotFound(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0:#}")]
    Execution(anyhow::Error),
}

impl From<anyhow::Error> for ToolError {
    fn from(value: anyhow::Error) -> Self {
        ToolError::Execution(value)
    }
}

impl ToolError {
    /// The structured error object returned to the model in place of a result.
    pub fn to_result(&self, name: &str) -> Value {
        match self {
            ToolError::NotFound(_) => json!({ "error": self.to_string() }),
            other => json!({ "error": format!("Error executing function '{}': {}", name, other) }),
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and JSON schema of the parameters, as advertised to the model.
    fn definition(&self) -> FunctionTool;

    async fn execute(&self, args: Arguments) -> Result<Value, ToolError>;
}

struct Entry {
    definition: FunctionTool,
    tool: Arc<dyn Tool>,
}

/// Tools registered at startup, kept in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<Entry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.register(tool);
        self
    }

    /// Adds `tool`, replacing any earlier tool with the same name.
    pub fn register(&mut self, tool: impl Tool + 'static) -> &mut Self {
        let definition = tool.definition();
        let entry = Entry {
            definition,
            tool: Arc::new(tool),
        };
        match self
            .entries
            .iter_mut()
            .find(|e| e.definition.name() == entry.definition.name())
        {
            Some(existing) => {
                tracing::warn!("tool '{}' registered twice", entry.definition.name());
                *existing = entry;
            }
            None => {
                tracing::debug!("registered tool '{}'", entry.definition.name());
                self.entries.push(entry);
            }
        }
        self
    }

    pub fn list(&self) -> Vec<ToolDescriptor> {
        self.entries
            .iter()
            .map(|e| ToolDescriptor::Function(e.definition.clone()))
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.definition.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub async fn invoke(&self, name: &str, args: Arguments) -> Result<Value, ToolError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.definition.name() == name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        entry.tool.execute(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_tool(name: &'static str) -> MockTool {
        let mut tool = MockTool::new();
        tool.expect_definition().return_const(FunctionTool::new(
            name,
            "test tool",
            json!({"type": "object", "properties": {}}),
        ));
        tool
    }

    #[tokio::test]
    async fn test_invoke_passes_arguments_and_returns_result() {
        // Arrange
        let mut echo = mock_tool("echo");
        echo.expect_execute()
            .times(1)
            .withf(|args| args.get("x") == Some(&json!(1)))
            .returning(|args| Ok(Value::Object(args)));
        let registry = ToolRegistry::new().with_tool(echo);
        let args = json!({"x": 1}).as_object().cloned().unwrap();

        // Act
        let result = registry.invoke("echo", args).await.unwrap();

        // Assert
        assert_eq!(result, json!({"x": 1}));
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool_is_not_found() {
        let registry = ToolRegistry::new().with_tool(mock_tool("echo"));

        let err = registry
            .invoke("missing_tool", Arguments::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::NotFound(_)));
        assert_eq!(
            err.to_result("missing_tool"),
            json!({"error": "Function 'missing_tool' not found."})
        );
    }

    #[test]
    fn test_execution_error_result() {
        let err = ToolError::from(anyhow::anyhow!("disk full"));
        assert_eq!(
            err.to_result("create_file"),
            json!({"error": "Error executing function 'create_file': disk full"})
        );
    }

    #[test]
    fn test_list_keeps_registration_order_and_replaces_duplicates() {
        let mut registry = ToolRegistry::new();
        registry
            .register(mock_tool("update_file"))
            .register(mock_tool("create_file"))
            .register(mock_tool("update_file"));

        assert_eq!(registry.names(), vec!["update_file", "create_file"]);
        let listed = registry.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name(), "update_file");
    }
}
