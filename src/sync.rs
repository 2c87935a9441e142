//! Index synchronization for NoteDesk
//!
//! The durable index only needs to survive restarts well enough to
//! relocate files on disk: id, path, title, creation time. Content lives
//! in the files themselves. So the synchronizer watches store events and
//! rewrites the whole snapshot only when the identity-bearing
//! subset of a record changed. Content edits, lazy loads, and saves never
//! reach the index.
//!
//! The snapshot is replaced wholesale (no incremental diff), keyed by id,
//! under the `files` key of the settings store.

use crate::config::{IndexGateway, FILES_KEY};
use crate::error::Result;
use crate::state::{FileMeta, StoreEvent, WorkspaceStore};
use log::debug;
use std::collections::BTreeMap;

// ─────────────────────────────────────────────────────────────────────────────
// Synchronizer
// ─────────────────────────────────────────────────────────────────────────────

/// Writes the file-index snapshot after index-affecting mutations.
pub struct Synchronizer {
    gateway: Box<dyn IndexGateway>,
}

impl Synchronizer {
    pub fn new(gateway: Box<dyn IndexGateway>) -> Self {
        Self { gateway }
    }

    /// The underlying store, shared with settings persistence.
    pub fn gateway(&self) -> &dyn IndexGateway {
        self.gateway.as_ref()
    }

    /// Whether an event changed the identity-bearing subset of any
    /// record (`id`, `path`, `title`, `created_at`).
    ///
    /// Draft creation and draft discards are excluded: drafts never
    /// reach the index in the first place. Restores are excluded because
    /// the state just came *from* the index.
    pub fn affects_index(event: &StoreEvent) -> bool {
        match event {
            StoreEvent::NameCommitted { .. } => true,
            StoreEvent::Deleted { was_new, .. } => !was_new,
            StoreEvent::Imported { ids } => !ids.is_empty(),
            StoreEvent::Created { .. }
            | StoreEvent::Edited { .. }
            | StoreEvent::Saved { .. }
            | StoreEvent::Restored { .. } => false,
        }
    }

    /// React to a completed store mutation, rewriting the snapshot if
    /// the event is index-affecting.
    ///
    /// A failed index write is surfaced to the caller; the in-memory
    /// state is already committed at that point, and the next
    /// index-affecting event retries the full snapshot anyway.
    pub fn handle(&self, store: &WorkspaceStore, event: &StoreEvent) -> Result<()> {
        if !Self::affects_index(event) {
            debug!("Event {:?} does not affect the index", event);
            return Ok(());
        }
        self.write_snapshot(store)
    }

    /// Serialize every non-new record and replace the stored snapshot.
    pub fn write_snapshot(&self, store: &WorkspaceStore) -> Result<()> {
        let snapshot: BTreeMap<String, FileMeta> = store
            .iter_ordered()
            .filter_map(|record| record.meta())
            .map(|meta| (meta.id.to_string(), meta))
            .collect();

        debug!("Writing index snapshot with {} record(s)", snapshot.len());
        self.gateway.set(FILES_KEY, serde_json::to_value(&snapshot)?)
    }

    /// Read the persisted snapshot back, for store restoration at
    /// startup. An absent key reads as an empty workspace.
    ///
    /// Entries come back ordered by creation time (then title) so the
    /// presentation order is stable across restarts.
    pub fn load_snapshot(&self) -> Result<Vec<FileMeta>> {
        let Some(value) = self.gateway.get(FILES_KEY)? else {
            debug!("No index snapshot stored, starting empty");
            return Ok(Vec::new());
        };

        let snapshot: BTreeMap<String, FileMeta> = serde_json::from_value(value)?;
        let mut metas: Vec<FileMeta> = snapshot.into_values().collect();
        metas.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(metas)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
