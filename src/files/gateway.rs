//! File content gateway
//!
//! The workspace store never touches `std::fs` directly; it goes through
//! the [`ContentGateway`] trait so that sessions can be wired to the real
//! disk, and tests to an in-memory double. The gateway is a pure I/O
//! wrapper: no dedup, no conflict policy, no state. Every error carries
//! the offending path so the UI can name the file that failed.

use crate::error::{Error, Result};
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ─────────────────────────────────────────────────────────────────────────────
// Gateway Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Access to document contents on the file system.
///
/// Implementations may block; the store applies its in-memory update only
/// after the gateway call returns successfully, so a failed call leaves
/// the workspace exactly as it was.
pub trait ContentGateway {
    /// Read the full contents of a file.
    fn read(&self, path: &Path) -> Result<String>;

    /// Write contents to a file, replacing anything already there.
    fn write(&self, path: &Path, contents: &str) -> Result<()>;

    /// Rename a file. The caller is responsible for conflict checks;
    /// this is a plain rename.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Delete a file.
    fn delete(&self, path: &Path) -> Result<()>;

    /// Check whether a path exists.
    fn exists(&self, path: &Path) -> bool;
}

// ─────────────────────────────────────────────────────────────────────────────
// Disk Gateway
// ─────────────────────────────────────────────────────────────────────────────

/// The real gateway: plain `std::fs` calls with path-carrying errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskGateway;

impl DiskGateway {
    pub fn new() -> Self {
        Self
    }
}

impl ContentGateway for DiskGateway {
    fn read(&self, path: &Path) -> Result<String> {
        debug!("Reading file: {}", path.display());
        fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        debug!("Writing file: {}", path.display());
        fs::write(path, contents).map_err(|e| Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        debug!("Renaming {} -> {}", from.display(), to.display());
        fs::rename(from, to).map_err(|e| Error::FileRename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source: e,
        })
    }

    fn delete(&self, path: &Path) -> Result<()> {
        debug!("Deleting file: {}", path.display());
        fs::remove_file(path).map_err(|e| Error::FileDelete {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-Memory Gateway
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory stand-in for the disk, used by store and bridge tests.
///
/// Clones share the same backing map, so a test can keep a handle and
/// inspect what the store wrote through its boxed copy. Reads are
/// counted per path, and each operation kind can be switched to fail on
/// demand to exercise the no-partial-mutation guarantees.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    files: HashMap<PathBuf, String>,
    read_counts: HashMap<PathBuf, usize>,
    fail_reads: bool,
    fail_writes: bool,
    fail_renames: bool,
    fail_deletes: bool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a file.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.inner
            .lock()
            .unwrap()
            .files
            .insert(path.into(), contents.into());
    }

    /// Current contents of a path, if present.
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.inner.lock().unwrap().files.get(path).cloned()
    }

    /// How many times a path has been read.
    pub fn read_count(&self, path: &Path) -> usize {
        self.inner
            .lock()
            .unwrap()
            .read_counts
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    /// Number of files currently held.
    pub fn file_count(&self) -> usize {
        self.inner.lock().unwrap().files.len()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.lock().unwrap().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_writes = fail;
    }

    pub fn set_fail_renames(&self, fail: bool) {
        self.inner.lock().unwrap().fail_renames = fail;
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_deletes = fail;
    }

    fn injected(kind: &str) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::Other, format!("injected {} failure", kind))
    }
}

impl ContentGateway for MemoryGateway {
    fn read(&self, path: &Path) -> Result<String> {
        let mut inner = self.inner.lock().unwrap();
        *inner.read_counts.entry(path.to_path_buf()).or_insert(0) += 1;
        if inner.fail_reads {
            return Err(Error::FileRead {
                path: path.to_path_buf(),
                source: Self::injected("read"),
            });
        }
        inner
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| Error::FileRead {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            })
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(Error::FileWrite {
                path: path.to_path_buf(),
                source: Self::injected("write"),
            });
        }
        inner.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_renames {
            return Err(Error::FileRename {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source: Self::injected("rename"),
            });
        }
        match inner.files.remove(from) {
            Some(contents) => {
                inner.files.insert(to.to_path_buf(), contents);
                Ok(())
            }
            None => Err(Error::FileRename {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            }),
        }
    }

    fn delete(&self, path: &Path) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_deletes {
            return Err(Error::FileDelete {
                path: path.to_path_buf(),
                source: Self::injected("delete"),
            });
        }
        match inner.files.remove(path) {
            Some(_) => Ok(()),
            None => Err(Error::FileDelete {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            }),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.lock().unwrap().files.contains_key(path)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
