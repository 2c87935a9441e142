//! Command bridge for NoteDesk
//!
//! The host process (menus, shortcuts, the renderer) talks to the
//! workspace core through a fixed set of commands plus a handful of
//! direct operations on [`AppSession`]. Commands are an enum dispatched
//! through `match`, so an unknown command is a compile-time concern;
//! [`Command::parse`] exists only at the wire boundary where the host
//! delivers commands by name.
//!
//! `AppSession` owns the whole core (store, session view, synchronizer,
//! settings) and runs the unidirectional update loop after every
//! mutation: store event, then session fold, then index sync. Every
//! command handler is safe to invoke with its precondition unmet; a save
//! with nothing active is a no-op, not a failure.

use crate::config::{IndexGateway, Settings};
use crate::error::{Error, Result, ResultExt};
use crate::files::ContentGateway;
use crate::ident::FileId;
use crate::session::Session;
use crate::state::{StoreEvent, WorkspaceStore};
use crate::sync::Synchronizer;
use log::{debug, info};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// External commands the host can deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a new draft waiting for a name
    NewFile,
    /// Bring the given Markdown files into the workspace. The host runs
    /// the file dialog; an empty selection is a no-op.
    ImportFiles(Vec<PathBuf>),
    /// Flush the active document to disk
    SaveActive,
    /// Ask the UI to focus the search input
    ActivateSearch,
}

impl Command {
    /// Resolve a wire name from the host's command channel.
    ///
    /// `import-files` parses to an empty selection, since the channel
    /// carries no arguments; hosts with dialog results in hand construct
    /// [`Command::ImportFiles`] directly.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "new-file" => Some(Self::NewFile),
            "import-files" => Some(Self::ImportFiles(Vec::new())),
            "save-active" => Some(Self::SaveActive),
            "activate-search" => Some(Self::ActivateSearch),
            _ => None,
        }
    }

    /// The wire name of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewFile => "new-file",
            Self::ImportFiles(_) => "import-files",
            Self::SaveActive => "save-active",
            Self::ActivateSearch => "activate-search",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Session
// ─────────────────────────────────────────────────────────────────────────────

/// One editor window's workspace core.
///
/// Constructed objects all the way down: gateways are injected rather
/// than reached for as globals, so tests and independent sessions are
/// cheap.
///
/// # Example
///
/// ```ignore
/// let store = JsonSettingsStore::at_default_location()?;
/// let mut app = AppSession::new(Box::new(DiskGateway::new()), Box::new(store));
/// app.bootstrap();
/// app.dispatch(Command::NewFile)?;
/// ```
pub struct AppSession {
    store: WorkspaceStore,
    session: Session,
    synchronizer: Synchronizer,
    settings: Settings,
}

impl AppSession {
    /// Wire up a session over the given gateways. Settings are read from
    /// the index store; a missing or unreadable store degrades to
    /// defaults.
    pub fn new(content: Box<dyn ContentGateway>, index: Box<dyn IndexGateway>) -> Self {
        let settings = Settings::load(index.as_ref());
        Self {
            store: WorkspaceStore::new(content),
            session: Session::new(),
            synchronizer: Synchronizer::new(index),
            settings,
        }
    }

    /// Restore the working set from the durable index.
    ///
    /// Called once at startup. An unreadable snapshot degrades to an
    /// empty workspace; the editor must still open.
    pub fn bootstrap(&mut self) -> usize {
        let metas = self
            .synchronizer
            .load_snapshot()
            .unwrap_or_warn_default(Vec::new(), "Failed to load the file index");
        let event = self.store.restore_index(metas);
        self.session.apply(&event);
        match event {
            StoreEvent::Restored { count } => count,
            _ => 0,
        }
    }

    /// Run a host command.
    pub fn dispatch(&mut self, command: Command) -> Result<()> {
        debug!("Dispatching command '{}'", command.name());
        match command {
            Command::NewFile => match self.new_file() {
                // A second new-file while a draft is pending keeps the
                // pending draft; the menu shortcut must not error out.
                Err(Error::DraftPending) => {
                    debug!("Draft already pending, new-file ignored");
                    Ok(())
                }
                result => result.map(|_| ()),
            },
            Command::ImportFiles(paths) => self.import_files(&paths).map(|_| ()),
            Command::SaveActive => self.save_active(),
            Command::ActivateSearch => {
                self.session.request_search_focus();
                Ok(())
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new draft.
    pub fn new_file(&mut self) -> Result<FileId> {
        let event = self.store.create_file()?;
        let id = match &event {
            StoreEvent::Created { id } => *id,
            other => {
                return Err(Error::Application(format!(
                    "create reported unexpected change: {:?}",
                    other
                )))
            }
        };
        self.finish(event)?;
        Ok(id)
    }

    /// Activate a file: open its tab and load its content if needed.
    pub fn open_file(&mut self, id: FileId) -> Result<()> {
        self.store.load_file(id)?;
        self.session.open_tab(id);
        Ok(())
    }

    /// Close a file's tab. Safe for ids the store no longer knows.
    pub fn close_file(&mut self, id: FileId) {
        self.session.close_tab(id);
    }

    /// Apply an edit from the editor widget to the active document.
    /// With nothing active the edit has nowhere to go and is dropped.
    pub fn edit_active(&mut self, body: &str) -> Result<()> {
        let Some(id) = self.session.active_id() else {
            debug!("Edit with no active file ignored");
            return Ok(());
        };
        let event = self.store.edit_content(id, body)?;
        self.finish(event)
    }

    /// Save the active document. A no-op when nothing is active or the
    /// active document is still an unnamed draft.
    pub fn save_active(&mut self) -> Result<()> {
        let Some(id) = self.session.active_id() else {
            debug!("Save with no active file ignored");
            return Ok(());
        };
        if self.store.get(id).map(|r| r.is_new).unwrap_or(true) {
            debug!("Save of unnamed draft ignored");
            return Ok(());
        }
        let event = self.store.save_file(id)?;
        self.finish(event)
    }

    /// Commit a title for a file (naming a draft or renaming an existing
    /// file), writing through to disk and the index.
    pub fn rename_file(&mut self, id: FileId, title: &str) -> Result<PathBuf> {
        let save_location = self.settings.effective_save_location();
        let event = self.store.commit_name(id, title, &save_location)?;
        let path = match &event {
            StoreEvent::NameCommitted { path, .. } => path.clone(),
            other => {
                return Err(Error::Application(format!(
                    "commit reported unexpected change: {:?}",
                    other
                )))
            }
        };
        self.finish(event)?;
        Ok(path)
    }

    /// Delete a file from disk, the store, and the index, detaching it
    /// from the session.
    pub fn delete_file(&mut self, id: FileId) -> Result<()> {
        let event = self.store.delete_file(id)?;
        self.finish(event)
    }

    /// Import external Markdown files, returning the newly inserted ids.
    pub fn import_files(&mut self, paths: &[PathBuf]) -> Result<Vec<FileId>> {
        let event = self.store.import_files(paths);
        let ids = match &event {
            StoreEvent::Imported { ids } => ids.clone(),
            other => {
                return Err(Error::Application(format!(
                    "import reported unexpected change: {:?}",
                    other
                )))
            }
        };
        self.finish(event)?;
        info!("Import finished with {} new file(s)", ids.len());
        Ok(ids)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings
    // ─────────────────────────────────────────────────────────────────────────

    /// Change the save directory for committed drafts and persist it.
    pub fn set_save_location(&mut self, location: Option<PathBuf>) -> Result<()> {
        self.settings.save_location = location;
        self.settings.store(self.synchronizer_gateway())
    }

    fn synchronizer_gateway(&self) -> &dyn IndexGateway {
        self.synchronizer.gateway()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn store(&self) -> &WorkspaceStore {
        &self.store
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Update Loop
    // ─────────────────────────────────────────────────────────────────────────

    /// The unidirectional step run after every store mutation: fold the
    /// event into the session, then let the synchronizer decide whether
    /// the index needs rewriting.
    fn finish(&mut self, event: StoreEvent) -> Result<()> {
        self.session.apply(&event);
        self.synchronizer.handle(&self.store, &event)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryIndexGateway;
    use crate::files::MemoryGateway;
    use std::path::Path;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn app() -> (AppSession, MemoryGateway, MemoryIndexGateway) {
        let content = MemoryGateway::new();
        let index = MemoryIndexGateway::new();
        let app = AppSession::new(Box::new(content.clone()), Box::new(index.clone()));
        (app, content, index)
    }

    /// Import one committed file and open it.
    fn app_with_open_file(title: &str) -> (AppSession, MemoryGateway, MemoryIndexGateway, FileId) {
        let (mut app, content, index) = app();
        let path = PathBuf::from(format!("/docs/{}.md", title));
        content.insert(&path, "# On disk");
        let ids = app.import_files(&[path]).unwrap();
        app.open_file(ids[0]).unwrap();
        (app, content, index, ids[0])
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Command parsing
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_covers_every_wire_name() {
        assert_eq!(Command::parse("new-file"), Some(Command::NewFile));
        assert_eq!(
            Command::parse("import-files"),
            Some(Command::ImportFiles(Vec::new()))
        );
        assert_eq!(Command::parse("save-active"), Some(Command::SaveActive));
        assert_eq!(
            Command::parse("activate-search"),
            Some(Command::ActivateSearch)
        );
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert_eq!(Command::parse("open-settings"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn test_names_roundtrip_through_parse() {
        for command in [
            Command::NewFile,
            Command::ImportFiles(Vec::new()),
            Command::SaveActive,
            Command::ActivateSearch,
        ] {
            assert_eq!(Command::parse(command.name()), Some(command));
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // New file
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_new_file_command_creates_draft() {
        let (mut app, _, _) = app();
        app.dispatch(Command::NewFile).unwrap();

        assert_eq!(app.store().len(), 1);
        assert!(app.store().pending_draft().is_some());
    }

    #[test]
    fn test_new_file_command_is_safe_with_pending_draft() {
        let (mut app, _, _) = app();
        app.dispatch(Command::NewFile).unwrap();
        app.dispatch(Command::NewFile).unwrap();

        assert_eq!(app.store().len(), 1);
    }

    #[test]
    fn test_direct_new_file_surfaces_pending_draft() {
        let (mut app, _, _) = app();
        app.new_file().unwrap();
        assert!(matches!(app.new_file(), Err(Error::DraftPending)));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Open / close / edit / save
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_open_file_loads_once_and_activates() {
        let (app, content, _, id) = app_with_open_file("Notes");

        assert_eq!(app.session().active_id(), Some(id));
        assert_eq!(app.session().opened_ids(), &[id]);
        assert_eq!(content.read_count(Path::new("/docs/Notes.md")), 1);
    }

    #[test]
    fn test_reopening_does_not_reread() {
        let (mut app, content, _, id) = app_with_open_file("Notes");

        app.open_file(id).unwrap();
        app.open_file(id).unwrap();
        assert_eq!(content.read_count(Path::new("/docs/Notes.md")), 1);
    }

    #[test]
    fn test_edit_then_save_roundtrip() {
        init_logging();
        let (mut app, content, _, id) = app_with_open_file("Notes");

        app.edit_active("# Edited").unwrap();
        assert!(app.session().is_unsaved(id));

        app.dispatch(Command::SaveActive).unwrap();
        assert!(!app.session().is_unsaved(id));
        assert_eq!(
            content.contents(Path::new("/docs/Notes.md")).as_deref(),
            Some("# Edited")
        );
    }

    #[test]
    fn test_failed_save_keeps_unsaved_mark() {
        let (mut app, content, _, id) = app_with_open_file("Notes");
        app.edit_active("# Edited").unwrap();

        content.set_fail_writes(true);
        assert!(app.dispatch(Command::SaveActive).is_err());

        assert!(app.session().is_unsaved(id));
        assert_eq!(
            app.store().get(id).unwrap().body.as_deref(),
            Some("# Edited")
        );
    }

    #[test]
    fn test_save_with_nothing_active_is_a_noop() {
        let (mut app, _, _) = app();
        assert!(app.dispatch(Command::SaveActive).is_ok());
    }

    #[test]
    fn test_save_with_draft_active_is_a_noop() {
        let (mut app, content, _) = app();
        let id = app.new_file().unwrap();
        app.session_mut().open_tab(id);

        assert!(app.dispatch(Command::SaveActive).is_ok());
        assert_eq!(content.file_count(), 0);
    }

    #[test]
    fn test_edit_with_nothing_active_is_a_noop() {
        let (mut app, _, _) = app();
        assert!(app.edit_active("text").is_ok());
        assert!(app.store().is_empty());
    }

    #[test]
    fn test_close_file_survives_deleted_id() {
        let (mut app, _, _, id) = app_with_open_file("Notes");
        app.delete_file(id).unwrap();

        // The tab close still runs even though the record is gone.
        app.close_file(id);
        assert!(app.session().opened_ids().is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rename and delete
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_rename_draft_uses_configured_save_location() {
        let (mut app, content, _) = app();
        app.set_save_location(Some(PathBuf::from("/vault"))).unwrap();

        let id = app.new_file().unwrap();
        let path = app.rename_file(id, "Journal").unwrap();

        assert_eq!(path, PathBuf::from("/vault/Journal.md"));
        assert!(content.contents(&path).is_some());
    }

    #[test]
    fn test_rename_writes_index() {
        let (mut app, _, index) = app();
        let id = app.new_file().unwrap();
        assert_eq!(index.write_count(), 0);

        app.rename_file(id, "Notes").unwrap();
        assert_eq!(index.write_count(), 1);
    }

    #[test]
    fn test_delete_detaches_everywhere() {
        let (mut app, content, index, id) = app_with_open_file("Notes");
        app.edit_active("# Edited").unwrap();
        let writes_before = index.write_count();

        app.delete_file(id).unwrap();

        assert!(!app.store().contains(id));
        assert!(app.session().opened_ids().is_empty());
        assert_eq!(app.session().active_id(), None);
        assert!(!app.session().is_unsaved(id));
        assert_eq!(content.contents(Path::new("/docs/Notes.md")), None);
        assert_eq!(index.write_count(), writes_before + 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Import
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_import_command_inserts_and_syncs() {
        let (mut app, content, index) = app();
        let path = PathBuf::from("/docs/Notes.md");
        content.insert(&path, "");

        app.dispatch(Command::ImportFiles(vec![path])).unwrap();

        assert_eq!(app.store().len(), 1);
        assert_eq!(index.write_count(), 1);
    }

    #[test]
    fn test_import_command_with_empty_selection() {
        let (mut app, _, index) = app();
        app.dispatch(Command::ImportFiles(Vec::new())).unwrap();

        assert!(app.store().is_empty());
        assert_eq!(index.write_count(), 0);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Search activation
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_activate_search_requests_focus() {
        let (mut app, _, _) = app();
        app.dispatch(Command::ActivateSearch).unwrap();

        assert!(app.session_mut().take_search_focus_request());
        assert!(!app.session_mut().take_search_focus_request());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Bootstrap
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_bootstrap_restores_previous_session() {
        init_logging();
        let content = MemoryGateway::new();
        let index = MemoryIndexGateway::new();

        // First launch: create and commit two files.
        let mut first = AppSession::new(Box::new(content.clone()), Box::new(index.clone()));
        let a = first.new_file().unwrap();
        first.rename_file(a, "First").unwrap();
        let b = first.new_file().unwrap();
        first.rename_file(b, "Second").unwrap();

        // Second launch over the same stores sees both, unloaded.
        let mut second = AppSession::new(Box::new(content.clone()), Box::new(index.clone()));
        assert_eq!(second.bootstrap(), 2);
        assert_eq!(second.store().len(), 2);
        assert!(second.store().iter_ordered().all(|r| !r.is_loaded));

        // And their content is still reachable through the usual path.
        second.open_file(a).unwrap();
        assert!(second.store().get(a).unwrap().is_loaded);
    }

    #[test]
    fn test_bootstrap_with_empty_index() {
        let (mut app, _, _) = app();
        assert_eq!(app.bootstrap(), 0);
        assert!(app.store().is_empty());
    }

    #[test]
    fn test_save_location_roundtrips_through_settings() {
        let content = MemoryGateway::new();
        let index = MemoryIndexGateway::new();

        let mut first = AppSession::new(Box::new(content.clone()), Box::new(index.clone()));
        first
            .set_save_location(Some(PathBuf::from("/vault")))
            .unwrap();

        let second = AppSession::new(Box::new(content), Box::new(index));
        assert_eq!(
            second.settings().save_location,
            Some(PathBuf::from("/vault"))
        );
    }
}
