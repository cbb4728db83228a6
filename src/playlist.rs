//! Ordered collections to pick from.
//!
//! A playlist is any ordered list of entries owned by the caller, such
//! as track identifiers exported from a music service. Selection only
//! ever needs its length and positional access.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a playlist.
#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("failed to read playlist {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("playlist {0} has no entries")]
    Empty(String),
}

/// An ordered, externally supplied list of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    name: String,
    entries: Vec<String>,
}

impl Playlist {
    pub fn new(name: impl Into<String>, entries: Vec<String>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// Parses one entry per line. Blank lines and `#` comments are skipped.
    pub fn parse(name: impl Into<String>, text: &str) -> Self {
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self::new(name, entries)
    }

    /// Loads a playlist from a text file, named after the file stem.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PlaylistError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PlaylistError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let playlist = Self::parse(name, &text);
        if playlist.is_empty() {
            return Err(PlaylistError::Empty(playlist.name));
        }
        Ok(playlist)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entries at `indices`, in the given order.
    ///
    /// Indices past the end are skipped.
    pub fn pick(&self, indices: &[usize]) -> Vec<&str> {
        indices
            .iter()
            .filter_map(|&i| match self.entries.get(i) {
                Some(entry) => Some(entry.as_str()),
                None => {
                    tracing::warn!(index = i, len = self.entries.len(), "Index past end of playlist");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let playlist = Playlist::parse("mix", "# header\nSong A\n\n  Song B  \n#Song C\nSong D\n");
        assert_eq!(playlist.entries(), &["Song A", "Song B", "Song D"]);
        assert_eq!(playlist.name(), "mix");
    }

    #[test]
    fn test_pick_preserves_order() {
        let playlist = Playlist::parse("mix", "a\nb\nc\nd");
        assert_eq!(playlist.pick(&[3, 0, 2]), vec!["d", "a", "c"]);
    }

    #[test]
    fn test_pick_skips_out_of_range() {
        let playlist = Playlist::parse("mix", "a\nb");
        assert_eq!(playlist.pick(&[1, 5]), vec!["b"]);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Playlist::from_file("/nonexistent/playlist.txt"),
            Err(PlaylistError::Read { .. })
        ));
    }
}
