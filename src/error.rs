//! Error type shared by the render pipeline, the store loaders and the CLI.
//!
//! None of these variants is allowed to end the interaction loop. Render
//! failures degrade to a skipped draw; load failures surface to whoever asked
//! for the load.

use std::fmt;

/// Which kind of edge referenced a missing entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Connection,
    NodeToBus,
    BusToBus,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Connection => "connection",
            Self::NodeToBus => "node-to-bus connection",
            Self::BusToBus => "bus-to-bus connection",
        };
        f.write_str(s)
    }
}

/// Errors produced by this crate.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    /// An edge names an entity that is not in the store.
    #[error("{edge} references missing {entity} {id}")]
    MissingReference { edge: EdgeKind, entity: &'static str, id: u64 },
    /// Render was requested before a drawing surface exists.
    #[error("drawing surface is not initialized")]
    UninitializedSurface,
    /// A call on the underlying 2D context failed.
    #[error("surface call failed: {0}")]
    Surface(String),
    /// A snapshot or config document could not be parsed.
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
    /// A snapshot or config file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CanvasError {
    pub(crate) fn missing_node(edge: EdgeKind, id: u64) -> Self {
        Self::MissingReference { edge, entity: "node", id }
    }

    pub(crate) fn missing_bus(edge: EdgeKind, id: u64) -> Self {
        Self::MissingReference { edge, entity: "bus", id }
    }
}
