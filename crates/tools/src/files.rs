//! File tools confined to a scratch-pad directory.

use crate::parse_args;
use anyhow::Context;
use async_trait::async_trait;
use openai_realtime_types::tools::FunctionTool;
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use voice_agent_core::{Arguments, Tool, ToolError};

/// The directory the file tools work in. Created on first write.
#[derive(Debug, Clone)]
pub struct ScratchPad {
    dir: PathBuf,
}

impl ScratchPad {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of `file_name` inside the pad. Only bare file names are accepted.
    pub fn resolve(&self, file_name: &str) -> Result<PathBuf, ToolError> {
        let name = file_name.trim();
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\'])
            || Path::new(name).is_absolute()
        {
            return Err(ToolError::InvalidArguments(format!(
                "'{}' is not a plain file name",
                file_name
            )));
        }
        Ok(self.dir.join(name))
    }

    async fn ensure_dir(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create {}", self.dir.display()))
    }
}

fn success(message: String) -> Value {
    json!({ "status": "success", "message": message })
}

fn failure(message: &str) -> Value {
    json!({ "status": "error", "message": message })
}

#[derive(Deserialize)]
struct CreateFileArgs {
    file_name: String,
    content: String,
}

pub struct CreateFileTool {
    pad: Arc<ScratchPad>,
}

impl CreateFileTool {
    pub fn new(pad: Arc<ScratchPad>) -> Self {
        Self { pad }
    }
}

#[async_trait]
impl Tool for CreateFileTool {
    fn definition(&self) -> FunctionTool {
        FunctionTool::new(
            "create_file",
            "Creates a new file with the given content.",
            json!({
                "type": "object",
                "properties": {
                    "file_name": {
                        "type": "string",
                        "description": "The name of the file to create."
                    },
                    "content": {
                        "type": "string",
                        "description": "The content to write to the file."
                    }
                },
                "required": ["file_name", "content"]
            }),
        )
    }

    async fn execute(&self, args: Arguments) -> Result<Value, ToolError> {
        let args: CreateFileArgs = parse_args(args)?;
        let path = self.pad.resolve(&args.file_name)?;
        self.pad.ensure_dir().await?;

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(failure("File already exists"));
        }
        tokio::fs::write(&path, args.content.as_bytes())
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(success(format!("File '{}' created successfully", args.file_name)))
    }
}

#[derive(Deserialize)]
struct UpdateFileArgs {
    file_name: String,
    #[serde(default)]
    new_content: Option<String>,
    #[serde(default)]
    new_name: Option<String>,
}

pub struct UpdateFileTool {
    pad: Arc<ScratchPad>,
}

impl UpdateFileTool {
    pub fn new(pad: Arc<ScratchPad>) -> Self {
        Self { pad }
    }
}

#[async_trait]
impl Tool for UpdateFileTool {
    fn definition(&self) -> FunctionTool {
        FunctionTool::new(
            "update_file",
            "Updates an existing file with new content or renames it.",
            json!({
                "type": "object",
                "properties": {
                    "file_name": {
                        "type": "string",
                        "description": "The name of the file to update."
                    },
                    "new_content": {
                        "type": "string",
                        "description": "The new content to write to the file. If empty, the file content won't be changed."
                    },
                    "new_name": {
                        "type": "string",
                        "description": "The new name for the file if it needs to be renamed."
                    }
                },
                "required": ["file_name"]
            }),
        )
    }

    async fn execute(&self, args: Arguments) -> Result<Value, ToolError> {
        let args: UpdateFileArgs = parse_args(args)?;
        let path = self.pad.resolve(&args.file_name)?;
        let new_path = match args.new_name.as_deref().filter(|n| !n.is_empty()) {
            Some(new_name) => Some((new_name, self.pad.resolve(new_name)?)),
            None => None,
        };

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(failure("File not found"));
        }

        if let Some(content) = &args.new_content {
            tokio::fs::write(&path, content.as_bytes())
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
        }

        if let Some((new_name, new_path)) = new_path {
            tokio::fs::rename(&path, &new_path)
                .await
                .with_context(|| format!("failed to rename {}", path.display()))?;
            return Ok(success(format!("File renamed to '{}' and updated", new_name)));
        }

        Ok(success(format!("File '{}' updated successfully", args.file_name)))
    }
}

#[derive(Deserialize)]
struct DeleteFileArgs {
    file_name: String,
}

pub struct DeleteFileTool {
    pad: Arc<ScratchPad>,
}

impl DeleteFileTool {
    pub fn new(pad: Arc<ScratchPad>) -> Self {
        Self { pad }
    }
}

#[async_trait]
impl Tool for DeleteFileTool {
    fn definition(&self) -> FunctionTool {
        FunctionTool::new(
            "delete_file",
            "Deletes a file based on the file name.",
            json!({
                "type": "object",
                "properties": {
                    "file_name": {
                        "type": "string",
                        "description": "The name of the file to delete."
                    }
                },
                "required": ["file_name"]
            }),
        )
    }

    async fn execute(&self, args: Arguments) -> Result<Value, ToolError> {
        let args: DeleteFileArgs = parse_args(args)?;
        let path = self.pad.resolve(&args.file_name)?;

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(failure("File not found"));
        }
        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("failed to delete {}", path.display()))?;

        Ok(success(format!("File '{}' deleted successfully", args.file_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    fn pad() -> (tempfile::TempDir, Arc<ScratchPad>) {
        let dir = tempfile::tempdir().unwrap();
        let pad = Arc::new(ScratchPad::new(dir.path().join("scratchpad")));
        (dir, pad)
    }

    #[tokio::test]
    async fn test_create_file_writes_content_once() {
        // Arrange
        let (_dir, pad) = pad();
        let tool = CreateFileTool::new(pad.clone());

        // Act
        let first = tool
            .execute(args(json!({"file_name": "a.txt", "content": "hi"})))
            .await
            .unwrap();
        let second = tool
            .execute(args(json!({"file_name": "a.txt", "content": "again"})))
            .await
            .unwrap();

        // Assert
        assert_eq!(first["status"], "success");
        assert_eq!(second, json!({"status": "error", "message": "File already exists"}));
        assert_eq!(std::fs::read_to_string(pad.dir().join("a.txt")).unwrap(), "hi");
    }

    #[tokio::test]
    async fn test_update_file_rewrites_and_renames() {
        let (_dir, pad) = pad();
        CreateFileTool::new(pad.clone())
            .execute(args(json!({"file_name": "notes.md", "content": "v1"})))
            .await
            .unwrap();

        let result = UpdateFileTool::new(pad.clone())
            .execute(args(json!({
                "file_name": "notes.md",
                "new_content": "v2",
                "new_name": "todo.md"
            })))
            .await
            .unwrap();

        assert_eq!(result["message"], "File renamed to 'todo.md' and updated");
        assert!(!pad.dir().join("notes.md").exists());
        assert_eq!(std::fs::read_to_string(pad.dir().join("todo.md")).unwrap(), "v2");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_file() {
        let (_dir, pad) = pad();
        let not_found = json!({"status": "error", "message": "File not found"});

        let updated = UpdateFileTool::new(pad.clone())
            .execute(args(json!({"file_name": "ghost.txt", "new_content": "x"})))
            .await
            .unwrap();
        let deleted = DeleteFileTool::new(pad.clone())
            .execute(args(json!({"file_name": "ghost.txt"})))
            .await
            .unwrap();

        assert_eq!(updated, not_found);
        assert_eq!(deleted, not_found);
    }

    #[tokio::test]
    async fn test_delete_file_removes_it() {
        let (_dir, pad) = pad();
        CreateFileTool::new(pad.clone())
            .execute(args(json!({"file_name": "a.txt", "content": "hi"})))
            .await
            .unwrap();

        let result = DeleteFileTool::new(pad.clone())
            .execute(args(json!({"file_name": "a.txt"})))
            .await
            .unwrap();

        assert_eq!(result["status"], "success");
        assert!(!pad.dir().join("a.txt").exists());
    }

    #[tokio::test]
    async fn test_names_outside_the_pad_are_rejected() {
        let (_dir, pad) = pad();
        let tool = CreateFileTool::new(pad.clone());

        for name in ["../escape.txt", "sub/dir.txt", "..", "", "/etc/passwd"] {
            let err = tool
                .execute(args(json!({"file_name": name, "content": "x"})))
                .await
                .unwrap_err();
            assert!(matches!(err, ToolError::InvalidArguments(_)), "{}", name);
        }
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let (_dir, pad) = pad();
        let err = CreateFileTool::new(pad)
            .execute(args(json!({"file_name": "a.txt"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
