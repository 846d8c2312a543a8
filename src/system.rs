//! Write capability for the live hosts file.
//!
//! Writing the system hosts file normally needs elevated privileges. The core
//! never checks for them itself; it receives a [`HostsWriter`] and reports
//! whatever that writer returns. Tests inject their own writer.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::HostsError;
use crate::fs_utils::{is_writable, write_atomic, write_locked};

/// Capability to replace a file's content.
pub trait HostsWriter {
    /// Overwrite `path` with `content` entirely.
    fn write(&self, path: &Path, content: &[u8]) -> Result<(), HostsError>;

    /// Fail early if `path` cannot be written by the current process.
    fn check_access(&self, path: &Path) -> Result<(), HostsError>;
}

/// Writer backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWriter;

impl HostsWriter for FsWriter {
    fn write(&self, path: &Path, content: &[u8]) -> Result<(), HostsError> {
        debug!(path = %path.display(), bytes = content.len(), "writing file");
        if let Err(atomic_err) = write_atomic(path, content) {
            // Renaming over a bind mount or inside a read-only dir fails even
            // when the file itself is writable.
            warn!(
                path = %path.display(),
                error = %atomic_err,
                "atomic replace failed, rewriting in place"
            );
            write_locked(path, content).map_err(|e| HostsError::io("write", path, &e))?;
        }
        Ok(())
    }

    fn check_access(&self, path: &Path) -> Result<(), HostsError> {
        is_writable(path).map_err(|e| HostsError::io("open for writing", path, &e))
    }
}

/// Platform location of the system hosts file
pub fn default_hosts_file() -> PathBuf {
    #[cfg(windows)]
    {
        let root = std::env::var_os("SystemRoot").unwrap_or_else(|| "C:\\Windows".into());
        PathBuf::from(root)
            .join("System32")
            .join("drivers")
            .join("etc")
            .join("hosts")
    }

    #[cfg(not(windows))]
    {
        PathBuf::from("/etc/hosts")
    }
}
