//! Filesystem write helpers
//!
//! Hosts and profile files are always rewritten whole. The preferred path is a
//! sibling temp file renamed over the target; when the target directory does
//! not allow that (bind-mounted `/etc/hosts`, a writable file in a read-only
//! directory) the file is rewritten in place under an exclusive lock.
//! Symlinked targets are resolved first, so the link is kept and the file it
//! points at is the one replaced.

use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Sibling path used for the temp copy during an atomic write
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".hostswap.tmp");
    path.with_file_name(name)
}

/// Path a write to `path` should land on, following symlinks.
///
/// A path that does not exist yet (or a dangling link) resolves to itself.
pub fn resolve_target(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Write `content` to a temp file next to `path`, then rename it into place.
///
/// Symlinks are followed so the link itself survives and its target is
/// replaced. Keeps the permissions and owner of an existing target; if the
/// owner cannot be carried over the write fails before the rename. The temp
/// file is removed if any step fails, and the target is left untouched.
pub fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let target = resolve_target(path);
    let temp_path = temp_path_for(&target);

    let result = (|| {
        fs::write(&temp_path, content)?;
        if let Ok(meta) = fs::metadata(&target) {
            fs::set_permissions(&temp_path, meta.permissions())?;
            copy_owner(&meta, &temp_path)?;
        }
        fs::rename(&temp_path, &target)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

#[cfg(unix)]
fn copy_owner(original: &fs::Metadata, temp_path: &Path) -> io::Result<()> {
    use std::os::unix::fs::MetadataExt;

    let created = fs::metadata(temp_path)?;
    if created.uid() == original.uid() && created.gid() == original.gid() {
        return Ok(());
    }
    std::os::unix::fs::chown(temp_path, Some(original.uid()), Some(original.gid()))
}

#[cfg(not(unix))]
fn copy_owner(_original: &fs::Metadata, _temp_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Truncate and rewrite `path` in place while holding an exclusive lock.
///
/// The lock is advisory and blocks until other hostswap writers release it.
pub fn write_locked(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;

    file.lock_exclusive()?;

    let result = (|| {
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(content)?;
        file.sync_all()
    })();

    let _ = FileExt::unlock(&file);
    result
}

/// Probe write access without modifying the file
pub fn is_writable(path: &Path) -> io::Result<()> {
    OpenOptions::new().append(true).open(path).map(|_| ())
}
