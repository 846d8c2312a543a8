//! Test utilities shared across test modules

use std::path::Path;
use tempfile::TempDir;

use crate::error::HostsError;
use crate::paths::Paths;
use crate::profiles::ProfileStore;
use crate::system::HostsWriter;

/// Create a Paths struct for testing using a temporary directory
///
/// The live hosts file lives at `<tmp>/etc/hosts`; the directory is created,
/// the file is not.
pub fn setup_test_paths(temp_dir: &TempDir) -> Paths {
    let etc = temp_dir.path().join("etc");
    std::fs::create_dir_all(&etc).unwrap();

    Paths {
        base_dir: temp_dir.path().join(".hostswap"),
        profiles_dir: temp_dir.path().join(".hostswap/profiles"),
        config_file: temp_dir.path().join(".hostswap/config.json"),
        hosts_file: etc.join("hosts"),
    }
}

/// Store over the test paths using the real filesystem writer
pub fn setup_test_store(paths: &Paths) -> ProfileStore {
    ProfileStore::from_paths(paths)
}

/// Writer that refuses every write, like an unprivileged process on /etc/hosts
pub struct DenyingWriter;

impl HostsWriter for DenyingWriter {
    fn write(&self, path: &Path, _content: &[u8]) -> Result<(), HostsError> {
        Err(HostsError::io(
            "write",
            path,
            &std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        ))
    }

    fn check_access(&self, path: &Path) -> Result<(), HostsError> {
        Err(HostsError::io(
            "open for writing",
            path,
            &std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        ))
    }
}
