//! # Configuration
//!
//! Tunables of the editing session, loadable from JSON.

use crate::error::FlowError;
use crate::model::DEFAULT_NODE_SIZE;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration parameters for a flow editing session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo snapshots kept. Default: 50.
    pub max_history: usize,
    /// Size of nodes created through the store. Default: 330x60.
    pub default_node_size: Vec2,
    /// Size of groups created through the store. Default: 400x300.
    pub default_group_size: Vec2,
    /// Save the open panel when the user presses Escape. Default: true.
    pub autosave_on_escape: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history: 50,
            default_node_size: DEFAULT_NODE_SIZE,
            default_group_size: Vec2::new(400.0, 300.0),
            autosave_on_escape: true,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        serde_json::from_str(json).map_err(|e| FlowError::JsonParseError(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FlowError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| FlowError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }
}
