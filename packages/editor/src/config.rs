use crate::errors::NavigatorResult;
use serde::Deserialize;

/// What to do when a selected node has no counterpart after an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelocationPolicy {
    /// Drop the lost nodes, report the new frame sizes and log a warning
    #[default]
    Lenient,
    /// Fail the edit and leave the session untouched
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub relocation: RelocationPolicy,
    /// Indent width used when rendering
    pub indent: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            relocation: RelocationPolicy::Lenient,
            indent: 4,
        }
    }
}

impl EditorConfig {
    pub fn strict() -> Self {
        Self {
            relocation: RelocationPolicy::Strict,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> NavigatorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
