//! Error types for the generation engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Name disambiguation ran past its safety ceiling. Surfaced distinctly
    /// from ordinary resolution failures; fatal for the export pass.
    #[error("Name collision exhausted for '{name}' in scope '{scope}' after {ceiling} attempts")]
    CollisionExhausted {
        scope: String,
        name: String,
        ceiling: u32,
    },

    /// Attempt to merge two components rooted in different paths
    #[error("Component mismatch: expected a component for '{expected}', found '{found}'")]
    ComponentMismatch { expected: String, found: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export failed: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, Error>;
