//! Workspace state management for NoteDesk
//!
//! This module defines the central `WorkspaceStore` struct: the
//! authoritative in-memory mapping of file id to file record, and every
//! mutation the editor can perform on it (create, load, edit, name commit,
//! delete, import, save, index restore).
//!
//! The store owns no policy about tabs, search, or persistence. Each
//! mutation returns a [`StoreEvent`] describing what changed; the session
//! view and the persistence synchronizer consume the event downstream.
//! Gateway I/O always happens before the in-memory update, so a failed
//! operation leaves the store exactly as it was and can be retried.

use crate::error::{Error, Result};
use crate::files::ContentGateway;
use crate::ident::FileId;
use crate::string_utils::{file_stem_title, is_markdown_path, is_valid_title, markdown_file_name};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Body given to a draft until the user types something.
pub const DRAFT_PLACEHOLDER: &str = "## New document\n";

// ─────────────────────────────────────────────────────────────────────────────
// File Records
// ─────────────────────────────────────────────────────────────────────────────

/// The identity-bearing subset of a record, as persisted in the durable
/// index. Content never appears here; it lives in the files themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub id: FileId,
    pub path: PathBuf,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// One logical document in the workspace.
///
/// A record is born either as a *draft* (`is_new`, no path, placeholder
/// body) or as a committed file discovered through import or index
/// restore (path set, body not yet loaded). Content loads lazily: `body`
/// stays `None` until the file is first activated.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Unique identifier, immutable after creation
    pub id: FileId,
    /// Display name (filename stem); empty only while `is_new`
    pub title: String,
    /// Absolute location on disk; `None` only while `is_new`
    pub path: Option<PathBuf>,
    /// In-memory content; `None` until loaded
    pub body: Option<String>,
    /// Creation timestamp, set once
    pub created_at: DateTime<Utc>,
    /// True from creation until the first successful name commit
    pub is_new: bool,
    /// True once `body` holds the current content
    pub is_loaded: bool,
}

impl FileRecord {
    /// A fresh draft: no path, placeholder body already "loaded."
    fn draft(id: FileId) -> Self {
        Self {
            id,
            title: String::new(),
            path: None,
            body: Some(DRAFT_PLACEHOLDER.to_string()),
            created_at: Utc::now(),
            is_new: true,
            is_loaded: true,
        }
    }

    /// A committed record whose content has not been read yet.
    fn unloaded(id: FileId, path: PathBuf, title: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            path: Some(path),
            body: None,
            created_at,
            is_new: false,
            is_loaded: false,
        }
    }

    /// Rebuild a record from its persisted index entry.
    fn from_meta(meta: FileMeta) -> Self {
        Self::unloaded(meta.id, meta.path, meta.title, meta.created_at)
    }

    /// The persisted view of this record, or `None` for drafts (drafts
    /// never reach the durable index).
    pub fn meta(&self) -> Option<FileMeta> {
        if self.is_new {
            return None;
        }
        Some(FileMeta {
            id: self.id,
            path: self.path.clone()?,
            title: self.title.clone(),
            created_at: self.created_at,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store Events
// ─────────────────────────────────────────────────────────────────────────────

/// Description of a completed store mutation.
///
/// Consumers decide what follows: the session view updates its tab and
/// unsaved state, the synchronizer decides whether the durable index
/// needs rewriting. The store itself never calls either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A draft was created
    Created { id: FileId },
    /// Content was edited in memory. `changed` is false when the edit
    /// was suppressed because the body was identical.
    Edited { id: FileId, changed: bool },
    /// A draft was committed or an existing file renamed
    NameCommitted { id: FileId, path: PathBuf },
    /// A record was removed. `was_new` distinguishes discarded drafts,
    /// which never touched disk or the index.
    Deleted { id: FileId, was_new: bool },
    /// External files were brought into the workspace
    Imported { ids: Vec<FileId> },
    /// In-memory content was flushed to disk
    Saved { id: FileId },
    /// The store was rebuilt from the persisted index
    Restored { count: usize },
}

// ─────────────────────────────────────────────────────────────────────────────
// Workspace Store
// ─────────────────────────────────────────────────────────────────────────────

/// The authoritative in-memory file store.
///
/// Mutations are serialized by `&mut self`: no operation can observe a
/// partially-applied change from another. Presentation order is the
/// order records entered the store; it is never re-sorted.
///
/// # Example
///
/// ```ignore
/// let mut store = WorkspaceStore::new(Box::new(DiskGateway::new()));
/// let event = store.create_file()?;
/// ```
pub struct WorkspaceStore {
    /// All records, keyed by id
    files: HashMap<FileId, FileRecord>,
    /// Insertion order of ids (presentation order)
    order: Vec<FileId>,
    /// File content access
    gateway: Box<dyn ContentGateway>,
}

impl WorkspaceStore {
    /// Create an empty store over the given content gateway.
    pub fn new(gateway: Box<dyn ContentGateway>) -> Self {
        Self {
            files: HashMap::new(),
            order: Vec::new(),
            gateway,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Number of records in the store.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether an id is present.
    pub fn contains(&self, id: FileId) -> bool {
        self.files.contains_key(&id)
    }

    /// Look up a record by id.
    pub fn get(&self, id: FileId) -> Option<&FileRecord> {
        self.files.get(&id)
    }

    /// All records in presentation (insertion) order.
    pub fn iter_ordered(&self) -> impl Iterator<Item = &FileRecord> {
        self.order.iter().filter_map(|id| self.files.get(id))
    }

    /// The id of the pending draft, if one exists.
    pub fn pending_draft(&self) -> Option<FileId> {
        self.files.values().find(|r| r.is_new).map(|r| r.id)
    }

    /// Find a committed record by exact path equality.
    pub fn find_by_path(&self, path: &Path) -> Option<FileId> {
        self.files
            .values()
            .find(|r| r.path.as_deref() == Some(path))
            .map(|r| r.id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Creation and Import
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new draft and return its event.
    ///
    /// At most one draft may exist at a time: naming focus for a new file
    /// is exclusive, so a second create is rejected with
    /// [`Error::DraftPending`] until the first is committed or discarded.
    pub fn create_file(&mut self) -> Result<StoreEvent> {
        if self.pending_draft().is_some() {
            debug!("Rejecting create: a draft is already pending");
            return Err(Error::DraftPending);
        }

        let record = FileRecord::draft(FileId::generate());
        let id = record.id;
        self.files.insert(id, record);
        self.order.push(id);

        debug!("Created draft {}", id);
        Ok(StoreEvent::Created { id })
    }

    /// Bring external Markdown files into the workspace.
    ///
    /// Paths already present in the store (exact equality) are skipped,
    /// as are non-Markdown files, so importing the same selection twice
    /// is a no-op. New records start unloaded; content is read lazily on
    /// first activation.
    pub fn import_files(&mut self, paths: &[PathBuf]) -> StoreEvent {
        let mut ids = Vec::new();

        for path in paths {
            if !is_markdown_path(path) {
                debug!("Skipping non-Markdown import: {}", path.display());
                continue;
            }
            if self.find_by_path(path).is_some() {
                debug!("Skipping already-imported path: {}", path.display());
                continue;
            }
            let Some(title) = file_stem_title(path) else {
                warn!("Skipping import with no usable name: {}", path.display());
                continue;
            };

            let record =
                FileRecord::unloaded(FileId::generate(), path.clone(), title, Utc::now());
            let id = record.id;
            self.files.insert(id, record);
            self.order.push(id);
            ids.push(id);
        }

        info!("Imported {} of {} selected file(s)", ids.len(), paths.len());
        StoreEvent::Imported { ids }
    }

    /// Rebuild the store from the persisted index at startup.
    ///
    /// Entries with a duplicate id or path are skipped with a warning;
    /// the next index write normalizes the snapshot.
    pub fn restore_index(&mut self, metas: Vec<FileMeta>) -> StoreEvent {
        let mut count = 0;

        for meta in metas {
            if self.files.contains_key(&meta.id) {
                warn!("Skipping duplicate id in index: {}", meta.id);
                continue;
            }
            if self.find_by_path(&meta.path).is_some() {
                warn!("Skipping duplicate path in index: {}", meta.path.display());
                continue;
            }

            let id = meta.id;
            self.files.insert(id, FileRecord::from_meta(meta));
            self.order.push(id);
            count += 1;
        }

        info!("Restored {} file(s) from the index", count);
        StoreEvent::Restored { count }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Content Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Return a file's content, reading it from disk on first access.
    ///
    /// Loaded records are served from memory with no gateway call, which
    /// also means repeated activations of the same file cannot issue
    /// duplicate reads. A failed read leaves the record unchanged.
    pub fn load_file(&mut self, id: FileId) -> Result<&str> {
        let is_loaded = self
            .files
            .get(&id)
            .map(|r| r.is_loaded)
            .ok_or(Error::UnknownFile { id })?;

        if !is_loaded {
            let path = self
                .files
                .get(&id)
                .and_then(|r| r.path.clone())
                .ok_or_else(|| Error::Application(format!("file {} has no path to load", id)))?;

            let body = self.gateway.read(&path)?;
            debug!("Loaded {} from {}", id, path.display());

            if let Some(record) = self.files.get_mut(&id) {
                record.body = Some(body);
                record.is_loaded = true;
            }
        }

        Ok(self
            .files
            .get(&id)
            .and_then(|r| r.body.as_deref())
            .unwrap_or_default())
    }

    /// Apply an in-memory content edit. Never touches disk.
    ///
    /// An edit identical to the current body is suppressed (`changed:
    /// false`) so clean files are not marked dirty by echoed change
    /// events from the editor widget.
    pub fn edit_content(&mut self, id: FileId, new_body: &str) -> Result<StoreEvent> {
        let record = self.files.get_mut(&id).ok_or(Error::UnknownFile { id })?;

        if record.body.as_deref() == Some(new_body) {
            return Ok(StoreEvent::Edited { id, changed: false });
        }

        record.body = Some(new_body.to_string());
        // The edit now defines the current content; a later lazy load
        // must not clobber it with the stale on-disk version.
        record.is_loaded = true;

        debug!("Edited {} ({} bytes)", id, new_body.len());
        Ok(StoreEvent::Edited { id, changed: true })
    }

    /// Flush a file's in-memory content to its path.
    ///
    /// Drafts have no path and are rejected; commit a name first. On a
    /// failed write the body (and therefore the unsaved mark downstream)
    /// is retained.
    pub fn save_file(&mut self, id: FileId) -> Result<StoreEvent> {
        let record = self.files.get(&id).ok_or(Error::UnknownFile { id })?;

        if record.is_new {
            return Err(Error::Application(format!(
                "file {} has no committed name to save under",
                id
            )));
        }
        let Some(path) = record.path.clone() else {
            return Err(Error::Application(format!("file {} has no path", id)));
        };
        let Some(body) = record.body.clone() else {
            // Nothing was ever loaded or edited; there is no in-memory
            // content to flush.
            debug!("Save of {} skipped: content never loaded", id);
            return Ok(StoreEvent::Saved { id });
        };

        self.gateway.write(&path, &body)?;
        info!("Saved {} to {}", id, path.display());
        Ok(StoreEvent::Saved { id })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Name Commits
    // ─────────────────────────────────────────────────────────────────────────

    /// Commit a title for a file, performing the matching disk operation.
    ///
    /// A draft is written as `<save_location>/<title>.md`; an existing
    /// file is renamed to `<title>.md` within its current directory. The
    /// record is updated only after the disk operation succeeds, so on
    /// conflict or I/O failure it is unchanged and the commit can be
    /// retried with a different title.
    pub fn commit_name(
        &mut self,
        id: FileId,
        title: &str,
        save_location: &Path,
    ) -> Result<StoreEvent> {
        let record = self.files.get(&id).ok_or(Error::UnknownFile { id })?;

        if !is_valid_title(title) {
            return Err(Error::InvalidTitle {
                title: title.to_string(),
            });
        }
        let title = title.trim();
        let file_name = markdown_file_name(title);

        if record.is_new {
            let target = save_location.join(&file_name);
            if self.gateway.exists(&target) {
                return Err(Error::NameConflict { path: target });
            }

            let body = record.body.clone().unwrap_or_default();
            self.gateway.write(&target, &body)?;
            info!("Committed draft {} as {}", id, target.display());

            if let Some(record) = self.files.get_mut(&id) {
                record.title = title.to_string();
                record.path = Some(target.clone());
                record.is_new = false;
            }
            return Ok(StoreEvent::NameCommitted { id, path: target });
        }

        let current = record
            .path
            .clone()
            .ok_or_else(|| Error::Application(format!("file {} has no path to rename", id)))?;
        let target = current
            .parent()
            .map(|dir| dir.join(&file_name))
            .unwrap_or_else(|| PathBuf::from(&file_name));

        if target == current {
            debug!("Rename of {} is a no-op, title unchanged", id);
            return Ok(StoreEvent::NameCommitted { id, path: target });
        }
        if self.gateway.exists(&target) {
            return Err(Error::NameConflict { path: target });
        }

        self.gateway.rename(&current, &target)?;
        info!(
            "Renamed {} from {} to {}",
            id,
            current.display(),
            target.display()
        );

        if let Some(record) = self.files.get_mut(&id) {
            record.title = title.to_string();
            record.path = Some(target.clone());
        }
        Ok(StoreEvent::NameCommitted { id, path: target })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Deletion
    // ─────────────────────────────────────────────────────────────────────────

    /// Remove a file from the workspace.
    ///
    /// Drafts are discarded purely in memory; nothing was ever
    /// persisted. Committed files are deleted on disk first; only on
    /// success is the record removed, so a failed delete never leaves a
    /// file half-gone.
    pub fn delete_file(&mut self, id: FileId) -> Result<StoreEvent> {
        let record = self.files.get(&id).ok_or(Error::UnknownFile { id })?;
        let was_new = record.is_new;

        if !was_new {
            let path = record
                .path
                .clone()
                .ok_or_else(|| Error::Application(format!("file {} has no path to delete", id)))?;
            self.gateway.delete(&path)?;
            info!("Deleted {} ({})", id, path.display());
        } else {
            debug!("Discarded draft {}", id);
        }

        self.files.remove(&id);
        self.order.retain(|other| *other != id);
        Ok(StoreEvent::Deleted { id, was_new })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
