//! Site list files.

use crate::error::Result;
use std::path::Path;

/// Ordered list of site identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteList {
    pub sites: Vec<String>,
}

impl SiteList {
    /// Parse one identifier per non-blank line, trimmed.
    #[must_use]
    pub fn parse(text: &str, max_items: Option<usize>) -> Self {
        let sites = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .take(max_items.unwrap_or(usize::MAX))
            .map(str::to_string)
            .collect();
        Self { sites }
    }

    /// Load a list file. A missing file is an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load<P: AsRef<Path>>(path: P, max_items: Option<usize>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            tracing::debug!("Site list {} not found, using empty list", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text, max_items))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_lines() {
        let list = SiteList::parse("  google.com \n\n\tyoutube.com\n   \nwikipedia.org\n", None);
        assert_eq!(list.sites, vec!["google.com", "youtube.com", "wikipedia.org"]);
    }

    #[test]
    fn test_parse_truncates() {
        let list = SiteList::parse("a\nb\nc\n", Some(2));
        assert_eq!(list.sites, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let list = SiteList::load(dir.path().join("sites.txt"), None).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.txt");
        std::fs::write(&path, "a.com\nb.com\n").unwrap();
        let list = SiteList::load(&path, Some(10)).unwrap();
        assert_eq!(list.len(), 2);
    }
}
