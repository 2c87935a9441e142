//! File content access for NoteDesk
//!
//! This module provides the gateway through which the workspace core
//! reads, writes, renames, and deletes document contents on disk.

mod gateway;

pub use gateway::*;
