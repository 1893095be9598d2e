//! Error types for archigraph operations.
//!
//! This module provides the main error type [`Error`] and the three error families
//! it wraps:
//!
//! - [`ConstructionError`]: raised at the offending builder call (scope nesting,
//!   foreign nodes, broadcast mismatches, use of a closed diagram)
//! - [`ConfigurationError`]: raised when a diagram is opened or a configuration file
//!   is loaded
//! - [`RenderError`]: raised when a diagram is closed and the layout backend fails
//!
//! No error is retried or logged-and-ignored; every failure reaches the caller.

use std::{io, path::PathBuf, process::ExitStatus};

use thiserror::Error;

use archigraph_core::{
    error::ValueError,
    identifier::{ClusterId, DiagramId, NodeId},
};

/// The main error type for archigraph operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

impl Error {
    /// Returns `true` if this is a [`ConstructionError`].
    pub fn is_construction(&self) -> bool {
        matches!(self, Self::Construction(_))
    }

    /// Returns `true` if this is a [`ConfigurationError`].
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns `true` if this is a [`RenderError`].
    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render(_))
    }
}

/// Errors in the way a diagram is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// A node, edge or cluster was created after the diagram was closed.
    #[error("diagram `{diagram}` is not open")]
    DiagramClosed { diagram: String },

    /// A scope was closed while a different scope was on top of the stack.
    #[error("cannot close {expected}: innermost open scope is {found}")]
    MismatchedScope { expected: ClusterId, found: ClusterId },

    /// A scope was closed while no scope was open.
    #[error("cannot close {expected}: no scope is open")]
    EmptyScopeStack { expected: ClusterId },

    /// The diagram was closed while nested clusters were still open.
    #[error(
        "diagram `{diagram}` closed with {} cluster(s) still open: {}",
        .open.len(),
        .open.join(", ")
    )]
    UnclosedClusters { diagram: String, open: Vec<String> },

    /// An edge endpoint is a node of another diagram.
    #[error("{node} belongs to {owner}, not to {diagram}")]
    ForeignNode {
        node: NodeId,
        owner: DiagramId,
        diagram: DiagramId,
    },

    /// A cluster handle of another diagram was used.
    #[error("{cluster} belongs to {owner}, not to {diagram}")]
    ForeignCluster {
        cluster: ClusterId,
        owner: DiagramId,
        diagram: DiagramId,
    },

    /// An edge endpoint is not registered in this diagram.
    #[error("{node} is not registered in {diagram}")]
    UnknownNode { node: NodeId, diagram: DiagramId },

    /// Many-to-many connection between sequences of different lengths.
    #[error("cannot pair {left} node(s) with {right} node(s): sequence lengths differ")]
    LengthMismatch { left: usize, right: usize },
}

/// Errors in diagram or application configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// An enumerated value (format, direction, curve style) or a color did not parse.
    #[error(transparent)]
    InvalidValue(#[from] ValueError),

    /// A configuration file could not be parsed.
    #[error("Failed to parse TOML configuration {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    /// An explicitly requested configuration file does not exist.
    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),

    /// A configuration file exists but could not be read.
    #[error("Failed to read configuration {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors raised while handing the diagram to the layout backend.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The backend executable could not be started.
    #[error("layout backend `{executable}` could not be started: {source}")]
    BackendMissing {
        executable: String,
        #[source]
        source: io::Error,
    },

    /// The backend ran and reported failure.
    #[error("layout backend `{executable}` failed ({status}): {stderr}")]
    BackendFailed {
        executable: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The temporary description or the output location could not be prepared.
    #[error("I/O error while rendering {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
