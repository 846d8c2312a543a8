//! Ordered, whole-file view of a hosts file.

use std::fs;
use std::path::Path;

use crate::entry::{Entry, Mapping};
use crate::error::HostsError;

/// All entries of one hosts file, in file order.
///
/// Domain uniqueness is kept by [`add_mapping`](Self::add_mapping) and
/// [`remove_mapping`](Self::remove_mapping), not by the type: a file that
/// already contains duplicates loads as-is and lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostDocument {
    entries: Vec<Entry>,
}

impl HostDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse file content. Accepts both `\n` and `\r\n` line endings.
    pub fn parse(text: &str) -> Self {
        Self {
            entries: text.lines().map(Entry::parse).collect(),
        }
    }

    /// Read and parse a file from disk
    pub fn load(path: &Path) -> Result<Self, HostsError> {
        let text = fs::read_to_string(path).map_err(|e| HostsError::io("read", path, &e))?;
        Ok(Self::parse(&text))
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mapping entries only, comments skipped
    pub fn mappings(&self) -> impl Iterator<Item = &Mapping> {
        self.entries.iter().filter_map(Entry::as_mapping)
    }

    /// First mapping for `domain` (exact, case-sensitive)
    pub fn find(&self, domain: &str) -> Option<&Mapping> {
        self.mappings().find(|m| m.domain == domain)
    }

    /// Mutable access to the first mapping for `domain`, for in-place edits
    pub fn find_mut(&mut self, domain: &str) -> Option<&mut Mapping> {
        self.entries
            .iter_mut()
            .filter_map(Entry::as_mapping_mut)
            .find(|m| m.domain == domain)
    }

    /// Append `ip domain` unless the domain is already mapped.
    pub fn add_mapping(&mut self, ip: &str, domain: &str) -> Result<(), HostsError> {
        if self.find(domain).is_some() {
            return Err(HostsError::DuplicateDomain(domain.to_string()));
        }
        self.entries.push(Entry::mapping(ip, domain));
        Ok(())
    }

    /// Remove the first mapping for `domain` and return it.
    pub fn remove_mapping(&mut self, domain: &str) -> Result<Mapping, HostsError> {
        let (index, removed) = self
            .entries
            .iter()
            .enumerate()
            .find_map(|(i, e)| {
                e.as_mapping()
                    .filter(|m| m.domain == domain)
                    .map(|m| (i, m.clone()))
            })
            .ok_or_else(|| HostsError::NotFound(domain.to_string()))?;

        self.entries.remove(index);
        Ok(removed)
    }

    /// Domains that occur in more than one mapping, in first-seen order
    pub fn duplicate_domains(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = Vec::new();
        for mapping in self.mappings() {
            let domain = mapping.domain.as_str();
            if !seen.insert(domain) && !duplicates.contains(&domain) {
                duplicates.push(domain);
            }
        }
        duplicates
    }

    /// Serialize back to file content: one line per entry, newline-terminated.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for entry in &self.entries {
            text.push_str(&entry.to_string());
            text.push('\n');
        }
        text
    }
}
