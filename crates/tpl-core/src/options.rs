use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// What a placeholder renders to when its expression resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissingValuePolicy {
    /// Substitute an empty string and log a warning.
    #[default]
    Empty,
    /// Fail the whole fill call.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillOptions {
    #[serde(default)]
    pub missing_value: MissingValuePolicy,
    /// Maximum loop nesting depth.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            missing_value: MissingValuePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
