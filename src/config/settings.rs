//! User settings for NoteDesk
//!
//! The workspace core only needs one setting: where committed drafts are
//! saved. The settings dialog itself is a host concern; it writes the
//! chosen directory through the same durable store the index lives in,
//! and the core reads it back here with a documents-directory fallback.

use crate::config::{IndexGateway, SAVE_LOCATION_KEY};
use crate::error::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

/// User preferences relevant to the workspace core.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory where newly committed files are written.
    /// `None` means "use the platform documents directory."
    pub save_location: Option<PathBuf>,
}

impl Settings {
    /// Load settings from the durable store.
    ///
    /// A missing key or unreadable store degrades to defaults with a
    /// warning; the editor must start even with no settings on disk.
    pub fn load(gateway: &dyn IndexGateway) -> Self {
        match gateway.get(SAVE_LOCATION_KEY) {
            Ok(Some(value)) => match serde_json::from_value::<PathBuf>(value) {
                Ok(path) => {
                    debug!("Loaded save location: {}", path.display());
                    Self {
                        save_location: Some(path),
                    }
                }
                Err(e) => {
                    warn!("Stored save location is not a path: {}. Using default.", e);
                    Self::default()
                }
            },
            Ok(None) => {
                debug!("No save location stored, using default");
                Self::default()
            }
            Err(e) => {
                warn!("Failed to load settings: {}. Using default.", e);
                Self::default()
            }
        }
    }

    /// Persist settings to the durable store.
    pub fn store(&self, gateway: &dyn IndexGateway) -> Result<()> {
        let value = serde_json::to_value(&self.save_location)?;
        gateway.set(SAVE_LOCATION_KEY, value)
    }

    /// The directory new files are committed into.
    ///
    /// Resolution order: the user-chosen directory, the OS documents
    /// directory, the home directory, the current directory.
    pub fn effective_save_location(&self) -> PathBuf {
        if let Some(location) = &self.save_location {
            return location.clone();
        }
        dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
