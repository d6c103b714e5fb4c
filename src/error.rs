//! Error types for footprint-tool.
//!
//! Geometry itself never fails for well-typed input: odd values produce
//! degenerate geometry. The only engine error is an unsupported pad-array
//! topology. Everything else here belongs to the collaborators around the
//! engine (configuration, definition files, output files).

use std::path::PathBuf;

use thiserror::Error;

use crate::footprint::Topology;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised by the pad-array layout engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The pad-array topology has no placement policy.
    #[error("unsupported pad array topology: {topology}")]
    UnsupportedTopology {
        /// The rejected topology.
        topology: Topology,
    },
}

/// Errors raised while loading footprint definitions.
#[derive(Error, Debug)]
pub enum DefinitionError {
    /// The definition document is not valid JSON (or not an object).
    #[error("failed to parse footprint definitions")]
    Json {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A single definition could not be converted into a footprint.
    #[error("invalid footprint definition '{name}'")]
    InvalidDefinition {
        /// Footprint name.
        name: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A definition is not a JSON object.
    #[error("footprint definition '{name}' must be an object")]
    NotAnObject {
        /// Footprint name.
        name: String,
    },

    /// `inherit` names a footprint that is not resolved yet.
    #[error("footprint '{name}' inherits '{base}', which {reason}")]
    UnresolvedBase {
        /// Footprint name.
        name: String,
        /// Name of the requested base footprint.
        base: String,
        /// Why the base could not be used.
        reason: UnresolvedReason,
    },
}

/// Why an `inherit` reference could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The base is defined later in the same document.
    DefinedLater,
    /// The footprint inherits itself.
    SelfReference,
    /// No footprint of that name exists.
    Unknown,
}

impl std::fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DefinedLater => write!(f, "is defined later in the file"),
            Self::SelfReference => write!(f, "is the footprint itself"),
            Self::Unknown => write!(f, "does not exist"),
        }
    }
}

impl DefinitionError {
    /// Creates an unresolved base error.
    pub fn unresolved_base(
        name: impl Into<String>,
        base: impl Into<String>,
        reason: UnresolvedReason,
    ) -> Self {
        Self::UnresolvedBase {
            name: name.into(),
            base: base.into(),
            reason,
        }
    }
}

/// Errors raised while reading inputs or writing generated files.
#[derive(Error, Debug)]
pub enum OutputError {
    /// Failed to read an input file.
    #[error("failed to read file: {path}")]
    FileRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an output file.
    #[error("failed to write file: {path}")]
    FileWrite {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl OutputError {
    /// Creates a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a file write error.
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }
}
