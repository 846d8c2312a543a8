//! Single-line model of a hosts file.
//!
//! Every line parses into an [`Entry`]; there is no failure case. Lines that
//! are not `ip domain` mappings are kept verbatim as comments.
//!
//! # Lossy normalization
//!
//! A mapping line is serialized back as exactly `"{ip} {domain}"`. Extra
//! whitespace, aliases beyond the first hostname and trailing `# comments` on
//! the same line are dropped the first time the file is saved. Comment and
//! blank lines are never touched.

use serde::Serialize;
use std::fmt;

/// An `ip domain` pair taken from the first two tokens of a line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mapping {
    pub ip: String,
    pub domain: String,
}

impl Mapping {
    pub fn new(ip: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            domain: domain.into(),
        }
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ip, self.domain)
    }
}

/// One physical line of a hosts file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Comment, blank or malformed line, stored exactly as read
    Comment(String),
    Mapping(Mapping),
}

impl Entry {
    /// Parse a raw line (without its line terminator).
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            return Self::Comment(line.to_string());
        }

        let mut tokens = trimmed.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some(ip), Some(domain)) => Self::Mapping(Mapping::new(ip, domain)),
            _ => Self::Comment(line.to_string()),
        }
    }

    pub fn mapping(ip: impl Into<String>, domain: impl Into<String>) -> Self {
        Self::Mapping(Mapping::new(ip, domain))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Self::Comment(_))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(m) => Some(m),
            Self::Comment(_) => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Self::Mapping(m) => Some(m),
            Self::Comment(_) => None,
        }
    }

    /// Domain of a mapping entry, `None` for comments
    pub fn domain(&self) -> Option<&str> {
        self.as_mapping().map(|m| m.domain.as_str())
    }
}

impl From<&str> for Entry {
    fn from(line: &str) -> Self {
        Self::parse(line)
    }
}

/// Serialized form: the raw text for comments, `ip domain` for mappings.
impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comment(raw) => f.write_str(raw),
            Self::Mapping(m) => fmt::Display::fmt(m, f),
        }
    }
}
