//! NoteDesk workspace core
//!
//! The state heart of a desktop Markdown document editor: an entity store
//! of file records, session views derived from it (open tabs, active
//! document, unsaved set, search results), and the synchronization that
//! keeps it consistent with a durable JSON index and the file system.
//!
//! The crate draws a hard boundary around I/O: the [`WorkspaceStore`]
//! mutates memory and reports what changed as a [`StoreEvent`]; the
//! content and index gateways do the actual disk work; the
//! [`AppSession`] bridge wires host commands through the whole loop.
//! Window creation, menus, dialogs, and the editing widget live in the
//! host process and are out of scope here.

pub mod commands;
pub mod config;
pub mod error;
pub mod files;
pub mod ident;
pub mod session;
pub mod state;
pub mod string_utils;
pub mod sync;

pub use commands::{AppSession, Command};
pub use config::{IndexGateway, JsonSettingsStore, Settings};
pub use error::{Error, Result};
pub use files::{ContentGateway, DiskGateway};
pub use ident::FileId;
pub use session::Session;
pub use state::{FileMeta, FileRecord, StoreEvent, WorkspaceStore};
pub use sync::Synchronizer;
