//! Configuration module for NoteDesk
//!
//! This module handles the durable key-value store that backs both user
//! settings and the persisted file index, including serialization to/from
//! JSON and persistent storage in platform-specific directories.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
