//! File filtering logic for the catalog scan.

use std::path::Path;

/// Extensions accepted when no list is configured, in preference order
pub const DEFAULT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Decides which directory entries are candidate images
#[derive(Debug, Clone)]
pub struct ImageFilter {
    /// Lowercase extensions without the leading dot
    extensions: Vec<String>,
    /// Whether to include hidden files and directories
    include_hidden: bool,
}

impl ImageFilter {
    /// Create a new filter with the default extension list
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            include_hidden: false,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Override the list of extensions to accept.
    ///
    /// Leading dots and case are ignored, so `".JPG"` and `"jpg"` are the same entry.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    /// The accepted extensions
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden && is_hidden(path) {
            return false;
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            }
            None => false,
        }
    }

    /// Check if the walker should descend into a directory
    pub fn should_descend(&self, path: &Path) -> bool {
        self.include_hidden || !is_hidden(path)
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with('.'))
}
