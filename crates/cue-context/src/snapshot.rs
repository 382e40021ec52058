//! The per-interaction context snapshot handed over by the transport.

use serde::{Deserialize, Serialize};

/// Raw interaction signals: tool/method name, optional free text, optionally
/// touched file paths, and recent action history. Created fresh per
/// interaction and never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InteractionSnapshot {
    /// Tool or method name of the interaction, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Free text of the interaction (prompt, commit message, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_text: Option<String>,
    /// File paths touched by the interaction.
    pub file_paths: Vec<String>,
    /// Recent action names, oldest first.
    pub recent_actions: Vec<String>,
}

impl InteractionSnapshot {
    /// An empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tool name.
    #[must_use]
    pub fn with_tool(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    /// Set the free text.
    #[must_use]
    pub fn with_text(mut self, free_text: impl Into<String>) -> Self {
        self.free_text = Some(free_text.into());
        self
    }

    /// Add a touched file path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.file_paths.push(path.into());
        self
    }

    /// Add a recent action.
    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.recent_actions.push(action.into());
        self
    }

    /// Whether the snapshot carries no signal at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tool_name.is_none()
            && self.free_text.is_none()
            && self.file_paths.is_empty()
            && self.recent_actions.is_empty()
    }
}
