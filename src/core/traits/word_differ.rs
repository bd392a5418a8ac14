use crate::core::errors::Result;

/// Port for rendering a unified diff as an inline word diff.
pub trait WordDiffer: Send + Sync {
    /// Turn unified diff text into `[-removed-]{+added+}` annotated text.
    fn word_diff(&self, unified_diff: &str) -> Result<String>;

    /// Human-readable name of the tool (e.g. "wdiff").
    fn name(&self) -> &str;
}
