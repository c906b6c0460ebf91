//! Read-only snapshots handed to the presentation layer.

use super::compare::QualityComparison;
use super::Side;
use crate::core::catalog::{ImageFormat, ImageRecord};
use crate::core::discard::DiscardRecord;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What the UI shows for one side of a pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSummary {
    /// Absolute path
    pub path: PathBuf,
    /// Path with the prefix shared by both sides removed
    pub display_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    /// File size in bytes
    pub size: u64,
}

impl ImageSummary {
    fn new(record: &ImageRecord, display_path: PathBuf) -> Self {
        Self {
            path: record.path.clone(),
            display_path,
            width: record.width,
            height: record.height,
            format: record.format,
            size: record.size,
        }
    }
}

/// Snapshot of the current pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairView {
    /// Rank of the pair in the queue
    pub index: usize,
    /// Number of pairs in the queue
    pub total: usize,
    pub left: ImageSummary,
    pub right: ImageSummary,
    /// Attribute comparisons from the left image's point of view
    pub comparison: QualityComparison,
    pub similarity_score: f64,
    /// Side that would be kept by `select`
    pub selected: Side,
    /// Fraction of the queue consumed
    pub progress: f64,
}

impl PairView {
    pub(crate) fn build(
        index: usize,
        total: usize,
        left: &ImageRecord,
        right: &ImageRecord,
        similarity_score: f64,
        selected: Side,
        progress: f64,
    ) -> Self {
        let (left_display, right_display) = strip_common_prefix(&left.path, &right.path);
        Self {
            index,
            total,
            left: ImageSummary::new(left, left_display),
            right: ImageSummary::new(right, right_display),
            comparison: QualityComparison::between(left, right),
            similarity_score,
            selected,
            progress,
        }
    }

    /// Summary of the given side
    pub fn side(&self, side: Side) -> &ImageSummary {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Comparisons from the given side's point of view
    pub fn comparison_for(&self, side: Side) -> QualityComparison {
        match side {
            Side::Left => self.comparison,
            Side::Right => self.comparison.reversed(),
        }
    }
}

/// Counts and moves for a whole session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total: usize,
    pub resolved: usize,
    pub skipped: usize,
    /// Pairs passed over because one image had already been discarded
    pub auto_skipped: usize,
    pub discarded: Vec<DiscardRecord>,
}

/// Drop the leading components both paths share
pub fn strip_common_prefix(a: &Path, b: &Path) -> (PathBuf, PathBuf) {
    let shared = a
        .components()
        .zip(b.components())
        .take_while(|(x, y)| x == y)
        .count();
    let rest = |p: &Path| p.components().skip(shared).collect::<PathBuf>();
    (rest(a), rest(b))
}
