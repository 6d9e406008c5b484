use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Who is talking to whom.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Personalization {
    #[serde(default = "default_assistant_name")]
    pub ai_assistant_name: String,
    #[serde(default = "default_human_name")]
    pub human_name: String,
}

fn default_assistant_name() -> String {
    "Assistant".to_string()
}

fn default_human_name() -> String {
    "User".to_string()
}

impl Default for Personalization {
    fn default() -> Self {
        Self {
            ai_assistant_name: default_assistant_name(),
            human_name: default_human_name(),
        }
    }
}

impl Personalization {
    /// Reads `path`, falling back to the defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "Personalization file {} not found, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let personalization: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!(
            "Loaded personalization: {} talking to {}",
            personalization.ai_assistant_name,
            personalization.human_name
        );
        Ok(personalization)
    }

    pub fn instructions(&self) -> String {
        format!(
            "You are {}, a helpful assistant. Respond concisely to {}.",
            self.ai_assistant_name, self.human_name
        )
    }
}
