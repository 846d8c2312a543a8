pub mod commands;
pub mod config;
pub mod doctor;
pub mod document;
pub mod entry;
pub mod error;
pub mod fs_utils;
pub mod logging;
pub mod paths;
pub mod profiles;
pub mod system;
pub mod ui;

pub use document::HostDocument;
pub use entry::{Entry, Mapping};
pub use error::HostsError;
pub use profiles::{Profile, ProfileListing, ProfileStore};
pub use system::{FsWriter, HostsWriter};

#[cfg(test)]
pub mod test_utils;
