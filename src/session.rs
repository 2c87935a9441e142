//! Session view for NoteDesk
//!
//! Transient per-window state: which files are open as tabs, which one is
//! active, which carry unsaved edits, and the current search filter. None
//! of it is persisted, and none of it performs I/O; everything here is
//! either bookkeeping over ids or a pure derivation against the
//! [`WorkspaceStore`].
//!
//! The session learns about store mutations through [`Session::apply`]:
//! the store emits a [`StoreEvent`], the session folds it in, the host
//! re-renders from the derived views. State flows one way.

use crate::ident::FileId;
use crate::state::{FileRecord, StoreEvent, WorkspaceStore};
use log::debug;
use std::collections::HashSet;

// ─────────────────────────────────────────────────────────────────────────────
// Session State
// ─────────────────────────────────────────────────────────────────────────────

/// Transient tab, activity, unsaved, and search state for one window.
#[derive(Debug, Default)]
pub struct Session {
    /// Ids currently shown as tabs, in the order they were opened
    opened: Vec<FileId>,
    /// The active tab, always a member of `opened` (or none)
    active: Option<FileId>,
    /// Ids with edits not yet flushed to disk
    unsaved: HashSet<FileId>,
    /// Current search term; empty means no filter
    search_term: String,
    /// Set by the search-activate command, consumed by the host
    search_focus_requested: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Ids of the open tabs, in opening order.
    pub fn opened_ids(&self) -> &[FileId] {
        &self.opened
    }

    /// The active tab's id, if any.
    pub fn active_id(&self) -> Option<FileId> {
        self.active
    }

    /// Whether a file carries unsaved edits.
    pub fn is_unsaved(&self, id: FileId) -> bool {
        self.unsaved.contains(&id)
    }

    /// Number of files with unsaved edits.
    pub fn unsaved_count(&self) -> usize {
        self.unsaved.len()
    }

    /// The current search term.
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Whether a search filter is active.
    pub fn has_search(&self) -> bool {
        !self.search_term.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tab Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Make a file the active tab, opening it if it isn't open yet.
    ///
    /// Idempotent: opening an already-open tab only switches activity.
    pub fn open_tab(&mut self, id: FileId) {
        if !self.opened.contains(&id) {
            self.opened.push(id);
            debug!("Opened tab for {}", id);
        }
        self.active = Some(id);
    }

    /// Close a tab. Unknown ids are a silent no-op, so closing the tab of
    /// an already-deleted file is safe.
    ///
    /// If the closed tab was active, the first remaining open tab becomes
    /// active; with no tabs left, nothing is active.
    pub fn close_tab(&mut self, id: FileId) {
        self.opened.retain(|other| *other != id);
        if self.active == Some(id) {
            self.active = self.opened.first().copied();
            debug!("Closed active tab {}, active is now {:?}", id, self.active);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────

    /// Set the search term. An empty term clears the filter.
    pub fn search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Clear the search filter (full list shown again).
    pub fn clear_search(&mut self) {
        self.search_term.clear();
    }

    /// Ask the host to focus the search input.
    pub fn request_search_focus(&mut self) {
        self.search_focus_requested = true;
    }

    /// Consume a pending search-focus request. Returns true at most once
    /// per request.
    pub fn take_search_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.search_focus_requested)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Store Event Handling
    // ─────────────────────────────────────────────────────────────────────────

    /// Fold a completed store mutation into the session state.
    ///
    /// Deletion detaches the id everywhere: its tab closes, its unsaved
    /// mark is dropped, and activity is cleared rather than handed to a
    /// neighbor; the user did not ask to switch documents.
    pub fn apply(&mut self, event: &StoreEvent) {
        match event {
            StoreEvent::Edited { id, changed: true } => {
                self.unsaved.insert(*id);
            }
            StoreEvent::Saved { id } => {
                self.unsaved.remove(id);
            }
            StoreEvent::Deleted { id, .. } => {
                self.opened.retain(|other| other != id);
                self.unsaved.remove(id);
                if self.active == Some(*id) {
                    self.active = None;
                }
            }
            StoreEvent::Created { .. }
            | StoreEvent::Edited { changed: false, .. }
            | StoreEvent::NameCommitted { .. }
            | StoreEvent::Imported { .. }
            | StoreEvent::Restored { .. } => {}
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived Views
    // ─────────────────────────────────────────────────────────────────────────

    /// The open tabs as records, in tab order.
    ///
    /// Ids the store no longer knows are dropped silently; a deletion can
    /// race with a tab the host has not repainted yet.
    pub fn opened_files<'a>(&self, store: &'a WorkspaceStore) -> Vec<&'a FileRecord> {
        self.opened
            .iter()
            .filter_map(|id| store.get(*id))
            .collect()
    }

    /// The active document's record, if any.
    pub fn active_file<'a>(&self, store: &'a WorkspaceStore) -> Option<&'a FileRecord> {
        self.active.and_then(|id| store.get(id))
    }

    /// The file list as presented: search matches when a filter is
    /// active, otherwise every record in store insertion order.
    ///
    /// Matching is a case-sensitive substring test on titles only,
    /// never on body content.
    pub fn displayed_list<'a>(&self, store: &'a WorkspaceStore) -> Vec<&'a FileRecord> {
        if self.has_search() {
            store
                .iter_ordered()
                .filter(|record| record.title.contains(&self.search_term))
                .collect()
        } else {
            store.iter_ordered().collect()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
