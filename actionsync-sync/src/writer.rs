//! Atomic artifact writer.
//!
//! ## `atomic_write`
//!
//! 1. Normalise line endings to LF.
//! 2. Compare with the file on disk; identical content is left untouched.
//! 3. Write to `<path>.actionsync.tmp`.
//! 4. Rename to the final path (atomic on POSIX).
//!
//! Leaving unchanged files alone keeps their mtime stable; git decides
//! drift from content anyway.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{io_err, SyncError};

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File already held exactly this content.
    Unchanged { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path } | WriteResult::Unchanged { path } => path,
        }
    }
}

/// Atomically write `content` to `path`, skipping identical content.
pub fn atomic_write(path: &Path, content: &str) -> Result<WriteResult, SyncError> {
    let tmp = PathBuf::from(format!("{}.actionsync.tmp", path.display()));
    atomic_write_with_tmp(path, content, &tmp)
}

fn atomic_write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<WriteResult, SyncError> {
    let normalized = content.replace("\r\n", "\n");

    match std::fs::read(path) {
        Ok(existing) if existing == normalized.as_bytes() => {
            info!("unchanged {}", path.display());
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(io_err(path, e)),
    }

    info!("writing {}", path.display());

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, &normalized).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}
