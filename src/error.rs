//! Error kinds surfaced by the hosts model and the profile store.

use std::path::Path;
use thiserror::Error;

/// Recoverable failures of core operations.
///
/// Parsing never produces one of these; only mutations and file I/O do.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostsError {
    /// `add` of a domain that already has a mapping
    #[error("Domain '{0}' is already mapped")]
    DuplicateDomain(String),

    /// `remove` of a domain with no mapping
    #[error("Domain '{0}' is not mapped")]
    NotFound(String),

    /// Profile name collision on copy/new/save
    #[error("Profile '{0}' already exists")]
    AlreadyExists(String),

    #[error("Profile '{0}' does not exist")]
    ProfileNotFound(String),

    #[error(
        "Invalid profile name '{0}': use 1-64 alphanumeric characters, hyphens (-) or underscores (_)"
    )]
    InvalidProfileName(String),

    /// Any read/write fault, including permission denial on the system path
    #[error("{message}")]
    IoFailure { message: String },
}

impl HostsError {
    /// Build an `IoFailure` describing what was being done to which path.
    pub fn io(action: &str, path: &Path, err: &std::io::Error) -> Self {
        let message = match err.kind() {
            std::io::ErrorKind::PermissionDenied => format!(
                "Failed to {} {}: permission denied (administrator/root privileges are required)",
                action,
                path.display()
            ),
            _ => format!("Failed to {} {}: {}", action, path.display(), err),
        };
        Self::IoFailure { message }
    }
}
