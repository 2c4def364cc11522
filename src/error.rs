use std::fmt;

use thiserror::Error;

/// Fatal failures of the graph transform. Whenever one of these is returned
/// no graph data is produced; the caller is expected to keep showing the
/// previously built data.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Couldn't parse the graph document.\n{0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid graph document: {0}")]
    InvalidDocument(String),

    #[error("Definition '{name}' instantiates itself through {chain}")]
    CyclicDefinition { name: String, chain: String },

    #[error("Invalid identifier '{name}': names must not contain '/' or '.'")]
    InvalidIdentifier { name: String },
}

impl GraphError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidDocument(message.into())
    }
}

/// Errors surfaced by the [`Session`](crate::Session) coordinator.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Couldn't read the graph document from disk.\n{0}")]
    FileSystem(#[from] std::io::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// A connection that could not be resolved to two instantiated endpoints.
///
/// These are non-fatal: the connection is dropped from the output and the
/// report is returned next to the best-effort graph data, so the caller can
/// present it to the user. The core never logs these itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedConnection {
    /// Path id of the instantiation whose definition declared the connection.
    pub at: String,
    /// Source reference as written in the document, `instance.port`.
    pub from: String,
    /// Target reference as written in the document, `instance.port`.
    pub to: String,
    /// Human-readable reason the endpoints could not be resolved.
    pub reason: String,
}

impl fmt::Display for UnresolvedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: connection {} -> {} skipped: {}",
            self.at, self.from, self.to, self.reason
        )
    }
}
