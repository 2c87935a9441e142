//! Centralized error handling for NoteDesk
//!
//! This module provides a unified error type that covers all error scenarios
//! in the workspace core: file content I/O, the durable index store, and
//! workspace state violations.

use crate::ident::FileId;
use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the workspace core.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the workspace core.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // File Content Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to read file contents
    FileRead { path: PathBuf, source: io::Error },

    /// Failed to write file contents
    FileWrite { path: PathBuf, source: io::Error },

    /// Failed to rename a file
    FileRename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// Failed to delete a file
    FileDelete { path: PathBuf, source: io::Error },

    // ─────────────────────────────────────────────────────────────────────────
    // Workspace State Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// A name commit targeted a path that is already occupied
    NameConflict { path: PathBuf },

    /// An operation referenced an id that is not in the store
    UnknownFile { id: FileId },

    /// A new file was requested while another draft is still unnamed
    DraftPending,

    /// A name commit was given an empty or otherwise unusable title
    InvalidTitle { title: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Index Store Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to load the durable index store
    IndexLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to save the durable index store
    IndexSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse the index store contents (invalid JSON/format)
    IndexParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration directory not found or inaccessible
    ConfigDirNotFound,

    // ─────────────────────────────────────────────────────────────────────────
    // Application Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic application error with a message
    Application(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::IndexParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // File Content Errors
            Error::FileRead { path, source } => {
                write!(f, "Failed to read '{}': {}", path.display(), source)
            }
            Error::FileWrite { path, source } => {
                write!(f, "Failed to write '{}': {}", path.display(), source)
            }
            Error::FileRename { from, to, source } => {
                write!(
                    f,
                    "Failed to rename '{}' to '{}': {}",
                    from.display(),
                    to.display(),
                    source
                )
            }
            Error::FileDelete { path, source } => {
                write!(f, "Failed to delete '{}': {}", path.display(), source)
            }

            // Workspace State Errors
            Error::NameConflict { path } => {
                write!(f, "A file named '{}' already exists", path.display())
            }
            Error::UnknownFile { id } => {
                write!(f, "No file with id {} in the workspace", id)
            }
            Error::DraftPending => {
                write!(f, "Another new file is still waiting for a name")
            }
            Error::InvalidTitle { title } => {
                write!(f, "'{}' is not a usable file title", title)
            }

            // Index Store Errors
            Error::IndexLoad { path, source } => {
                write!(
                    f,
                    "Failed to load the file index from '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::IndexSave { path, source } => {
                write!(
                    f,
                    "Failed to save the file index to '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::IndexParse { message, .. } => {
                write!(f, "Invalid index store format: {}", message)
            }
            Error::ConfigDirNotFound => {
                write!(f, "Configuration directory not found")
            }

            // Application Errors
            Error::Application(msg) => write!(f, "{}", msg),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FileRead { source, .. }
            | Error::FileWrite { source, .. }
            | Error::FileRename { source, .. }
            | Error::FileDelete { source, .. } => Some(source),
            Error::IndexLoad { source, .. } | Error::IndexSave { source, .. } => {
                Some(source.as_ref())
            }
            Error::IndexParse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::NameConflict { .. }
            | Error::UnknownFile { .. }
            | Error::DraftPending
            | Error::InvalidTitle { .. }
            | Error::ConfigDirNotFound
            | Error::Application(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
