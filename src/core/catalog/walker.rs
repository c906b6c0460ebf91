//! Directory walking implementation using walkdir.

use super::{filter::ImageFilter, CatalogScan, CatalogSource, ImageCatalog, ImageFormat, ImageRecord};
use crate::error::CatalogError;
use crate::events::{CatalogEvent, Event, EventSender};
use image::ImageReader;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Configuration for the catalog scan
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Descend into subdirectories instead of listing direct children only
    pub recursive: bool,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
}

/// Catalog source backed by the local filesystem
pub struct WalkDirCatalog {
    config: CatalogConfig,
    filter: ImageFilter,
}

impl WalkDirCatalog {
    /// Create a new source with the given configuration
    pub fn new(config: CatalogConfig) -> Self {
        let mut filter = ImageFilter::new().with_hidden(config.include_hidden);

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions);
        }

        Self { config, filter }
    }

    fn walk_root(
        &self,
        root: &Path,
        root_index: usize,
        events: &EventSender,
        seen: &mut HashSet<PathBuf>,
        records: &mut Vec<ImageRecord>,
        errors: &mut Vec<CatalogError>,
    ) {
        let max_depth = if self.config.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || self.filter.should_descend(entry.path())
            });

        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    let error = CatalogError::ReadDirectory {
                        path,
                        source: e
                            .into_io_error()
                            .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
                    };
                    self.record_skip(error, events, errors);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() || !self.filter.should_include(path) {
                continue;
            }

            // nested roots and symlinks can reach one file twice
            let identity = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            if !seen.insert(identity) {
                tracing::debug!(path = %path.display(), "already catalogued, skipping");
                continue;
            }

            match read_record(path, root_index) {
                Ok(record) => {
                    events.send(Event::Catalog(CatalogEvent::ImageFound {
                        path: record.path.clone(),
                    }));
                    records.push(record);
                }
                Err(error) => self.record_skip(error, events, errors),
            }
        }
    }

    fn record_skip(&self, error: CatalogError, events: &EventSender, errors: &mut Vec<CatalogError>) {
        let path = match &error {
            CatalogError::RootNotFound { path }
            | CatalogError::UnreadableImage { path, .. }
            | CatalogError::ReadDirectory { path, .. } => path.clone(),
        };
        tracing::warn!(path = %path.display(), "skipping: {error}");
        events.send(Event::Catalog(CatalogEvent::Skipped {
            path,
            message: error.to_string(),
        }));
        errors.push(error);
    }
}

impl CatalogSource for WalkDirCatalog {
    fn scan_with_events(&self, roots: &[PathBuf], events: &EventSender) -> CatalogScan {
        events.send(Event::Catalog(CatalogEvent::Started {
            roots: roots.to_vec(),
        }));

        let mut canonical_roots: Vec<PathBuf> = Vec::new();
        let mut seen = HashSet::new();
        let mut records = Vec::new();
        let mut errors = Vec::new();

        for root in roots {
            let canonical = match fs::canonicalize(root) {
                Ok(path) if path.is_dir() => path,
                _ => {
                    let error = CatalogError::RootNotFound { path: root.clone() };
                    self.record_skip(error, events, &mut errors);
                    continue;
                }
            };

            if canonical_roots.contains(&canonical) {
                tracing::debug!(root = %root.display(), "root listed twice, scanning once");
                continue;
            }

            let root_index = canonical_roots.len();
            self.walk_root(
                &canonical,
                root_index,
                events,
                &mut seen,
                &mut records,
                &mut errors,
            );
            canonical_roots.push(canonical);
        }

        events.send(Event::Catalog(CatalogEvent::Completed {
            total_images: records.len(),
        }));
        tracing::info!(images = records.len(), skipped = errors.len(), "catalog scan complete");

        CatalogScan {
            catalog: ImageCatalog::from_records(canonical_roots, records),
            errors,
        }
    }
}

/// Read dimensions and format from an image header without decoding pixels
pub fn read_header(path: &Path) -> Result<(u32, u32, ImageFormat), CatalogError> {
    let unreadable = |reason: String| CatalogError::UnreadableImage {
        path: path.to_path_buf(),
        reason,
    };

    let reader = ImageReader::open(path)
        .map_err(|e| unreadable(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| unreadable(e.to_string()))?;

    let format = reader
        .format()
        .map(ImageFormat::from_detected)
        .ok_or_else(|| unreadable("format could not be determined".to_string()))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| unreadable(e.to_string()))?;

    if width == 0 || height == 0 {
        return Err(unreadable(format!("empty image ({width}x{height})")));
    }

    Ok((width, height, format))
}

fn read_record(path: &Path, root: usize) -> Result<ImageRecord, CatalogError> {
    let metadata = fs::metadata(path).map_err(|e| CatalogError::UnreadableImage {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let (width, height, format) = read_header(path)?;

    Ok(ImageRecord {
        path: path.to_path_buf(),
        width,
        height,
        format,
        size: metadata.len(),
        root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let img = ImageBuffer::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 64]));
        img.save(&path).unwrap();
        path
    }

    fn scan(roots: &[PathBuf], config: CatalogConfig) -> CatalogScan {
        WalkDirCatalog::new(config).scan(roots)
    }

    #[test]
    fn scan_empty_directory_returns_empty_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let result = scan(&[temp_dir.path().to_path_buf()], CatalogConfig::default());

        assert!(result.catalog.is_empty());
        assert!(result.errors.is_empty());
        assert_eq!(result.catalog.roots().len(), 1);
    }

    #[test]
    fn scan_reads_header_metadata() {
        let temp_dir = TempDir::new().unwrap();
        write_image(temp_dir.path(), "wide.png", 80, 60);
        write_image(temp_dir.path(), "photo.jpg", 40, 30);

        let result = scan(&[temp_dir.path().to_path_buf()], CatalogConfig::default());
        let records = result.catalog.records();

        assert_eq!(records.len(), 2);
        // sorted by file name
        assert!(records[0].path.ends_with("photo.jpg"));
        assert_eq!(records[0].format, ImageFormat::Jpeg);
        assert_eq!((records[0].width, records[0].height), (40, 30));
        assert!(records[1].path.ends_with("wide.png"));
        assert_eq!(records[1].format, ImageFormat::Png);
        assert!(records[1].size > 0);
        assert!(records[1].path.is_absolute());
    }

    #[test]
    fn unreadable_file_is_skipped_with_warning() {
        let temp_dir = TempDir::new().unwrap();
        write_image(temp_dir.path(), "good.png", 10, 10);
        fs::write(temp_dir.path().join("corrupt.jpg"), b"not an image").unwrap();

        let result = scan(&[temp_dir.path().to_path_buf()], CatalogConfig::default());

        assert_eq!(result.catalog.len(), 1);
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(
            result.errors[0],
            CatalogError::UnreadableImage { .. }
        ));
    }

    #[test]
    fn non_images_and_hidden_files_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        write_image(temp_dir.path(), "visible.png", 10, 10);
        write_image(temp_dir.path(), ".hidden.png", 10, 10);
        fs::write(temp_dir.path().join("notes.txt"), b"hello").unwrap();

        let result = scan(&[temp_dir.path().to_path_buf()], CatalogConfig::default());

        assert_eq!(result.catalog.len(), 1);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn non_recursive_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        write_image(temp_dir.path(), "top.png", 10, 10);
        write_image(&nested, "deep.png", 10, 10);

        let flat = scan(&[temp_dir.path().to_path_buf()], CatalogConfig::default());
        assert_eq!(flat.catalog.len(), 1);

        let config = CatalogConfig {
            recursive: true,
            ..Default::default()
        };
        let deep = scan(&[temp_dir.path().to_path_buf()], config);
        assert_eq!(deep.catalog.len(), 2);
    }

    #[test]
    fn recursive_scan_skips_discarded_directory() {
        let temp_dir = TempDir::new().unwrap();
        let discarded = temp_dir.path().join(".discarded");
        fs::create_dir(&discarded).unwrap();
        write_image(temp_dir.path(), "kept.png", 10, 10);
        write_image(&discarded, "gone.png", 10, 10);

        let config = CatalogConfig {
            recursive: true,
            ..Default::default()
        };
        let result = scan(&[temp_dir.path().to_path_buf()], config);

        assert_eq!(result.catalog.len(), 1);
        assert!(result.catalog.records()[0].path.ends_with("kept.png"));
    }

    #[test]
    fn records_remember_their_root() {
        let dir_a = TempDir::new().unwrap();
        let dir_b = TempDir::new().unwrap();
        write_image(dir_a.path(), "a.png", 10, 10);
        write_image(dir_b.path(), "b.png", 10, 10);

        let result = scan(
            &[dir_a.path().to_path_buf(), dir_b.path().to_path_buf()],
            CatalogConfig::default(),
        );

        let roots: Vec<usize> = result.catalog.records().iter().map(|r| r.root).collect();
        assert_eq!(roots, vec![0, 1]);
    }

    #[test]
    fn duplicate_roots_are_scanned_once() {
        let temp_dir = TempDir::new().unwrap();
        write_image(temp_dir.path(), "a.png", 10, 10);
        let root = temp_dir.path().to_path_buf();

        let result = scan(&[root.clone(), root], CatalogConfig::default());

        assert_eq!(result.catalog.len(), 1);
        assert_eq!(result.catalog.roots().len(), 1);
    }

    #[test]
    fn nested_roots_catalogue_each_file_once() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("sub");
        fs::create_dir(&nested).unwrap();
        write_image(temp_dir.path(), "y.png", 10, 10);
        write_image(&nested, "x.png", 10, 10);

        let config = CatalogConfig {
            recursive: true,
            ..Default::default()
        };
        let result = scan(&[temp_dir.path().to_path_buf(), nested], config);

        let paths: HashSet<&PathBuf> = result.catalog.records().iter().map(|r| &r.path).collect();
        assert_eq!(result.catalog.len(), 2);
        assert_eq!(paths.len(), 2);
        assert_eq!(result.catalog.roots().len(), 2);
        assert!(result.errors.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_file_is_not_catalogued_twice() {
        let temp_dir = TempDir::new().unwrap();
        let target = write_image(temp_dir.path(), "a.png", 10, 10);
        std::os::unix::fs::symlink(&target, temp_dir.path().join("b.png")).unwrap();

        let result = scan(&[temp_dir.path().to_path_buf()], CatalogConfig::default());

        assert_eq!(result.catalog.len(), 1);
        assert!(result.catalog.records()[0].path.ends_with("a.png"));
    }

    #[test]
    fn missing_root_is_recorded_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        write_image(temp_dir.path(), "a.png", 10, 10);

        let result = scan(
            &[
                PathBuf::from("/nonexistent/path/12345"),
                temp_dir.path().to_path_buf(),
            ],
            CatalogConfig::default(),
        );

        assert_eq!(result.catalog.len(), 1);
        assert!(matches!(
            result.errors[0],
            CatalogError::RootNotFound { .. }
        ));
    }

    #[test]
    fn custom_extension_list_is_honoured() {
        let temp_dir = TempDir::new().unwrap();
        write_image(temp_dir.path(), "a.png", 10, 10);
        write_image(temp_dir.path(), "b.jpg", 10, 10);

        let config = CatalogConfig {
            extensions: Some(vec!["jpg".to_string()]),
            ..Default::default()
        };
        let result = scan(&[temp_dir.path().to_path_buf()], config);

        assert_eq!(result.catalog.len(), 1);
        assert_eq!(result.catalog.records()[0].format, ImageFormat::Jpeg);
    }
}
