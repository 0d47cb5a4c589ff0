//! Remote directory listing types and path navigation.
//!
//! Paths travel as plain strings on the wire, but navigation works on
//! [`BrowsePath`], an ordered list of segments plus an absolute flag.
//! Going "up" from the root is then a structural no-op instead of a
//! string edge case, and going up past the last segment lands on the
//! root.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowseEntry {
    pub name: String,
    /// Absolute, server-canonical path of the entry.
    pub path: String,
    #[serde(rename = "is_dir")]
    pub is_directory: bool,
    /// File size in bytes (files only).
    #[serde(default)]
    pub size: Option<u64>,
    /// Lowercased extension including the dot (files only).
    #[serde(default)]
    pub extension: Option<String>,
}

/// Response of a browse request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowseResult {
    /// Server-canonicalized form of the requested path.
    pub current_path: String,
    #[serde(default)]
    pub parent_path: Option<String>,
    /// Directories first, then files, as ordered by the backend.
    #[serde(rename = "items")]
    pub entries: Vec<BrowseEntry>,
}

/// A navigable path: ordered segments plus an absolute (rooted) flag.
///
/// Empty segments are dropped on parse; `.` is kept as a segment. A
/// relative path with no segments renders as `"."` and an absolute one
/// as `"/"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowsePath {
    absolute: bool,
    segments: Vec<String>,
}

impl BrowsePath {
    pub fn root() -> Self {
        Self {
            absolute: true,
            segments: Vec::new(),
        }
    }

    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let segments = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            absolute: raw.starts_with('/'),
            segments,
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True at the filesystem root.
    pub fn is_root(&self) -> bool {
        self.absolute && self.segments.is_empty()
    }

    /// The path with its last segment removed, or `None` at the root.
    ///
    /// When no segments remain the result is the root, for relative
    /// paths too.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.segments.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(Self {
                absolute: self.absolute,
                segments: rest.to_vec(),
            }),
            _ => Some(Self::root()),
        }
    }
}

impl fmt::Display for BrowsePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.absolute, self.segments.is_empty()) {
            (true, _) => write!(f, "/{}", self.segments.join("/")),
            (false, true) => f.write_str("."),
            (false, false) => f.write_str(&self.segments.join("/")),
        }
    }
}

/// Output folder suggested for a freshly selected input folder.
///
/// Uses the input's parent, unless that parent is the filesystem root
/// (or there is none), in which case the input folder itself is used.
pub fn default_output_folder(input_folder: &str) -> String {
    let path = BrowsePath::parse(input_folder);
    match path.parent() {
        Some(parent) if !parent.is_root() => parent.to_string(),
        _ => input_folder.to_string(),
    }
}
