//! # Catalog Module
//!
//! Discovers images under the input roots and records their header metadata.
//!
//! Only headers are read here (dimensions and format). Pixel data is decoded
//! later, per pair, by the scorer.
//!
//! ## Example
//! ```rust,ignore
//! use pair_cull::core::catalog::{CatalogConfig, CatalogSource, WalkDirCatalog};
//!
//! let source = WalkDirCatalog::new(CatalogConfig::default());
//! let scan = source.scan(&["/Users/photos".into()]);
//! println!("{} images, {} skipped", scan.catalog.len(), scan.errors.len());
//! ```

mod filter;
mod walker;

pub use filter::{ImageFilter, DEFAULT_EXTENSIONS};
pub use walker::{read_header, CatalogConfig, WalkDirCatalog};

use crate::error::CatalogError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Image formats the engine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Other,
}

impl ImageFormat {
    /// Map the format detected by the `image` crate
    pub fn from_detected(format: image::ImageFormat) -> Self {
        match format {
            image::ImageFormat::Png => ImageFormat::Png,
            image::ImageFormat::Jpeg => ImageFormat::Jpeg,
            image::ImageFormat::Gif => ImageFormat::Gif,
            image::ImageFormat::WebP => ImageFormat::WebP,
            _ => ImageFormat::Other,
        }
    }

    /// Quality rank used when comparing two records.
    ///
    /// Lossless PNG outranks JPEG; other formats have no rank.
    pub fn rank(&self) -> Option<u8> {
        match self {
            ImageFormat::Png => Some(1),
            ImageFormat::Jpeg => Some(0),
            _ => None,
        }
    }

    /// Short upper-case name for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Gif => "GIF",
            ImageFormat::WebP => "WEBP",
            ImageFormat::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of a record inside its catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub usize);

/// A discovered image and its header metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Absolute path to the image
    pub path: PathBuf,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Format detected from the file contents
    pub format: ImageFormat,
    /// File size in bytes
    pub size: u64,
    /// Index of the input root the image was found under
    pub root: usize,
}

impl ImageRecord {
    /// Width divided by height
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Directory that directly contains the image
    pub fn parent(&self) -> Option<&Path> {
        self.path.parent()
    }
}

/// All images found in one scan, in discovery order
#[derive(Debug, Clone, Default)]
pub struct ImageCatalog {
    roots: Vec<PathBuf>,
    records: Vec<ImageRecord>,
}

impl ImageCatalog {
    /// Build a catalog from records gathered elsewhere.
    ///
    /// Each record's `root` must index into `roots`.
    pub fn from_records(roots: Vec<PathBuf>, records: Vec<ImageRecord>) -> Self {
        debug_assert!(records.iter().all(|r| r.root < roots.len()));
        Self { roots, records }
    }

    /// The input roots, after canonicalisation and de-duplication
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Look up a record
    pub fn get(&self, id: RecordId) -> Option<&ImageRecord> {
        self.records.get(id.0)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the scan found no images
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records with their ids, in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &ImageRecord)> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| (RecordId(i), record))
    }

    /// Records in discovery order
    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }
}

impl std::ops::Index<RecordId> for ImageCatalog {
    type Output = ImageRecord;

    fn index(&self, id: RecordId) -> &ImageRecord {
        &self.records[id.0]
    }
}

/// Result of a catalog scan
#[derive(Debug)]
pub struct CatalogScan {
    /// Successfully catalogued images
    pub catalog: ImageCatalog,
    /// Files and roots that were skipped (non-fatal)
    pub errors: Vec<CatalogError>,
}

/// Anything that can produce a catalog from a set of roots
///
/// Implement this trait to feed the pipeline from somewhere other than the
/// local filesystem (e.g., for testing).
pub trait CatalogSource: Send + Sync {
    /// Scan roots and return the catalog
    fn scan(&self, roots: &[PathBuf]) -> CatalogScan {
        self.scan_with_events(roots, &crate::events::null_sender())
    }

    /// Scan with progress reporting via events
    fn scan_with_events(&self, roots: &[PathBuf], events: &EventSender) -> CatalogScan;
}
