//! Core profile management logic.
//!
//! A profile is a complete hosts file saved as `<name>.txt` in the profiles
//! directory. Which profile is active is never stored: a profile is current
//! when its bytes equal the live hosts file's bytes at the time of the check,
//! so two identical profiles are both reported current.
//!
//! Nothing is cached between calls. Every operation re-reads what it needs
//! from disk and the [`ProfileListing`] handed back is a snapshot the caller
//! keeps in sync through the store's mutating methods.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::document::HostDocument;
use crate::error::HostsError;
use crate::paths::{PROFILE_EXTENSION, Paths};
use crate::system::{FsWriter, HostsWriter};

/// Name given to the profile synthesized from an unmatched live file
pub const DEFAULT_PROFILE: &str = "default";

/// A saved hosts file variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub name: String,
    pub path: PathBuf,
    /// Derived: content equals the live hosts file
    pub is_current: bool,
}

/// Profiles found in the profiles directory, sorted by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProfileListing {
    profiles: Vec<Profile>,
}

impl ProfileListing {
    pub fn iter(&self) -> std::slice::Iter<'_, Profile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All profiles whose content matches the live file
    pub fn current(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter().filter(|p| p.is_current)
    }

    fn insert(&mut self, profile: Profile) {
        let index = self
            .profiles
            .partition_point(|p| p.name.as_str() < profile.name.as_str());
        self.profiles.insert(index, profile);
    }

    fn remove(&mut self, name: &str) -> Option<Profile> {
        let index = self.profiles.iter().position(|p| p.name == name)?;
        Some(self.profiles.remove(index))
    }
}

impl<'a> IntoIterator for &'a ProfileListing {
    type Item = &'a Profile;
    type IntoIter = std::slice::Iter<'a, Profile>;

    fn into_iter(self) -> Self::IntoIter {
        self.profiles.iter()
    }
}

/// Whether a profile with `profile_content` is the active one
pub fn is_current(profile_content: &[u8], live_content: &[u8]) -> bool {
    profile_content == live_content
}

/// Validate profile name
///
/// Only allows alphanumeric characters, underscores, and hyphens.
pub fn validate_profile_name(name: &str) -> Result<(), HostsError> {
    let valid = !name.is_empty()
        && name.chars().count() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(HostsError::InvalidProfileName(name.to_string()))
    }
}

/// Profile directory plus the live hosts file it switches.
pub struct ProfileStore {
    profiles_dir: PathBuf,
    hosts_file: PathBuf,
    writer: Box<dyn HostsWriter>,
}

impl ProfileStore {
    pub fn new(
        profiles_dir: impl Into<PathBuf>,
        hosts_file: impl Into<PathBuf>,
        writer: Box<dyn HostsWriter>,
    ) -> Self {
        Self {
            profiles_dir: profiles_dir.into(),
            hosts_file: hosts_file.into(),
            writer,
        }
    }

    /// Store over the resolved paths, writing through the real filesystem
    pub fn from_paths(paths: &Paths) -> Self {
        Self::new(
            paths.profiles_dir.clone(),
            paths.hosts_file.clone(),
            Box::new(FsWriter),
        )
    }

    pub fn hosts_file(&self) -> &Path {
        &self.hosts_file
    }

    pub fn profiles_dir(&self) -> &Path {
        &self.profiles_dir
    }

    pub fn profile_path(&self, name: &str) -> PathBuf {
        self.profiles_dir
            .join(format!("{}.{}", name, PROFILE_EXTENSION))
    }

    /// Fail unless the live hosts file exists and can be written.
    pub fn check_live_access(&self) -> Result<(), HostsError> {
        self.writer.check_access(&self.hosts_file)
    }

    /// List profiles and mark the current one(s).
    ///
    /// When no profile matches a non-blank live file, its content is saved as
    /// a new `default` profile. That is the only write this performs.
    pub fn list_profiles(&self) -> Result<ProfileListing, HostsError> {
        self.ensure_profiles_dir()?;
        let live = self.read_live()?;

        let entries = fs::read_dir(&self.profiles_dir)
            .map_err(|e| HostsError::io("read", &self.profiles_dir, &e))?;

        let mut listing = ProfileListing::default();
        for entry in entries {
            let entry = entry.map_err(|e| HostsError::io("read", &self.profiles_dir, &e))?;
            let path = entry.path();
            if !path.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(PROFILE_EXTENSION)
            {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|n| n.to_str()) else {
                continue;
            };
            if validate_profile_name(name).is_err() {
                warn!(path = %path.display(), "skipping profile with an unusable name");
                continue;
            }

            let content = fs::read(&path).map_err(|e| HostsError::io("read", &path, &e))?;
            listing.insert(Profile {
                name: name.to_string(),
                is_current: is_current(&content, &live),
                path,
            });
        }

        if listing.current().next().is_none() && !is_blank(&live) {
            let path = self.profile_path(DEFAULT_PROFILE);
            info!(
                profile = DEFAULT_PROFILE,
                "live hosts file matches no profile, saving it"
            );
            self.writer.write(&path, &live)?;
            listing.remove(DEFAULT_PROFILE);
            listing.insert(Profile {
                name: DEFAULT_PROFILE.to_string(),
                path,
                is_current: true,
            });
        }

        debug!(count = listing.len(), "listed profiles");
        Ok(listing)
    }

    /// Parse the live hosts file
    pub fn load_live(&self) -> Result<HostDocument, HostsError> {
        HostDocument::load(&self.hosts_file)
    }

    /// Parse a saved profile
    pub fn load_profile(&self, name: &str) -> Result<HostDocument, HostsError> {
        validate_profile_name(name)?;
        let path = self.profile_path(name);
        if !path.is_file() {
            return Err(HostsError::ProfileNotFound(name.to_string()));
        }
        HostDocument::load(&path)
    }

    /// Serialize `document` and overwrite `path` with it.
    pub fn save_document(&self, document: &HostDocument, path: &Path) -> Result<(), HostsError> {
        debug!(path = %path.display(), entries = document.len(), "saving document");
        self.writer.write(path, document.to_text().as_bytes())
    }

    /// Save `document` as profile `name`, replacing an existing one only when
    /// `overwrite` is set.
    pub fn save_profile(
        &self,
        listing: &mut ProfileListing,
        name: &str,
        document: &HostDocument,
        overwrite: bool,
    ) -> Result<(), HostsError> {
        validate_profile_name(name)?;
        let path = self.profile_path(name);
        if !overwrite && (listing.contains(name) || path.exists()) {
            return Err(HostsError::AlreadyExists(name.to_string()));
        }

        self.write_profile(listing, name, path, document.to_text().as_bytes())
    }

    /// Save the live hosts file byte for byte as profile `name`.
    ///
    /// Unlike [`save_profile`](Self::save_profile) nothing is parsed, so
    /// aliases and inline comments on mapping lines survive.
    pub fn save_live_as(
        &self,
        listing: &mut ProfileListing,
        name: &str,
        overwrite: bool,
    ) -> Result<(), HostsError> {
        validate_profile_name(name)?;
        let path = self.profile_path(name);
        if !overwrite && (listing.contains(name) || path.exists()) {
            return Err(HostsError::AlreadyExists(name.to_string()));
        }

        let live =
            fs::read(&self.hosts_file).map_err(|e| HostsError::io("read", &self.hosts_file, &e))?;
        self.write_profile(listing, name, path, &live)
    }

    fn write_profile(
        &self,
        listing: &mut ProfileListing,
        name: &str,
        path: PathBuf,
        content: &[u8],
    ) -> Result<(), HostsError> {
        self.ensure_profiles_dir()?;
        self.writer.write(&path, content)?;

        let live = self.read_live()?;
        listing.remove(name);
        listing.insert(Profile {
            name: name.to_string(),
            path,
            is_current: is_current(content, &live),
        });
        Ok(())
    }

    /// Overwrite the live hosts file with a profile's content.
    ///
    /// On success the profile becomes the only one marked current.
    pub fn activate_profile(
        &self,
        listing: &mut ProfileListing,
        name: &str,
    ) -> Result<(), HostsError> {
        let profile = listing
            .get(name)
            .ok_or_else(|| HostsError::ProfileNotFound(name.to_string()))?;
        let content =
            fs::read(&profile.path).map_err(|e| HostsError::io("read", &profile.path, &e))?;

        self.writer.write(&self.hosts_file, &content)?;
        info!(profile = %name, hosts = %self.hosts_file.display(), "activated profile");

        for profile in &mut listing.profiles {
            profile.is_current = profile.name == name;
        }
        Ok(())
    }

    /// Byte-copy profile `source` to a new profile `new_name`.
    pub fn copy_profile(
        &self,
        listing: &mut ProfileListing,
        source: &str,
        new_name: &str,
    ) -> Result<(), HostsError> {
        validate_profile_name(new_name)?;
        let source_path = listing
            .get(source)
            .map(|p| p.path.clone())
            .ok_or_else(|| HostsError::ProfileNotFound(source.to_string()))?;

        let target = self.profile_path(new_name);
        if listing.contains(new_name) || target.exists() {
            return Err(HostsError::AlreadyExists(new_name.to_string()));
        }

        fs::copy(&source_path, &target).map_err(|e| HostsError::io("copy to", &target, &e))?;
        debug!(from = %source, to = %new_name, "copied profile");

        listing.insert(Profile {
            name: new_name.to_string(),
            path: target,
            is_current: false,
        });
        Ok(())
    }

    /// Delete a profile's file and drop it from the listing.
    pub fn delete_profile(
        &self,
        listing: &mut ProfileListing,
        name: &str,
    ) -> Result<Profile, HostsError> {
        let profile = listing
            .get(name)
            .ok_or_else(|| HostsError::ProfileNotFound(name.to_string()))?;

        match fs::remove_file(&profile.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(HostsError::io("delete", &profile.path, &e)),
        }
        debug!(profile = %name, "deleted profile");

        listing
            .remove(name)
            .ok_or_else(|| HostsError::ProfileNotFound(name.to_string()))
    }

    /// Create a profile holding a single comment line.
    ///
    /// `initial_comment` is prefixed with `# ` unless it already starts with `#`.
    pub fn new_profile(
        &self,
        listing: &mut ProfileListing,
        name: &str,
        initial_comment: &str,
    ) -> Result<(), HostsError> {
        validate_profile_name(name)?;
        let path = self.profile_path(name);
        if listing.contains(name) || path.exists() {
            return Err(HostsError::AlreadyExists(name.to_string()));
        }

        let note = initial_comment.trim();
        let line = if note.starts_with('#') {
            format!("{}\n", note)
        } else {
            format!("# {}\n", note)
        };

        self.ensure_profiles_dir()?;
        self.writer.write(&path, line.as_bytes())?;
        debug!(profile = %name, "created profile");

        listing.insert(Profile {
            name: name.to_string(),
            path,
            is_current: false,
        });
        Ok(())
    }

    fn ensure_profiles_dir(&self) -> Result<(), HostsError> {
        fs::create_dir_all(&self.profiles_dir)
            .map_err(|e| HostsError::io("create", &self.profiles_dir, &e))
    }

    /// Live file bytes; a missing live file reads as empty.
    fn read_live(&self) -> Result<Vec<u8>, HostsError> {
        match fs::read(&self.hosts_file) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(HostsError::io("read", &self.hosts_file, &e)),
        }
    }

}

fn is_blank(content: &[u8]) -> bool {
    content.iter().all(u8::is_ascii_whitespace)
}
