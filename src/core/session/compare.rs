//! Per-attribute quality comparison between the two sides of a pair.
//!
//! Results are tags, not colours; the presentation layer picks the styling.

use crate::core::catalog::ImageRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Outcome of comparing one attribute, from the first image's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeComparison {
    /// First image is better
    Greater,
    /// Second image is better
    Less,
    /// Same value
    Equal,
    /// Different, but neither dominates
    Incomparable,
}

impl AttributeComparison {
    /// The same comparison seen from the other image
    pub fn reverse(self) -> Self {
        match self {
            AttributeComparison::Greater => AttributeComparison::Less,
            AttributeComparison::Less => AttributeComparison::Greater,
            other => other,
        }
    }

    fn from_ordering(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Greater => AttributeComparison::Greater,
            Ordering::Less => AttributeComparison::Less,
            Ordering::Equal => AttributeComparison::Equal,
        }
    }
}

/// Resolution wins only when it is strictly larger in both dimensions
pub fn compare_resolution(a: &ImageRecord, b: &ImageRecord) -> AttributeComparison {
    match (a.width.cmp(&b.width), a.height.cmp(&b.height)) {
        (Ordering::Equal, Ordering::Equal) => AttributeComparison::Equal,
        (Ordering::Greater, Ordering::Greater) => AttributeComparison::Greater,
        (Ordering::Less, Ordering::Less) => AttributeComparison::Less,
        _ => AttributeComparison::Incomparable,
    }
}

/// PNG ranks above JPEG; same formats tie; anything else is incomparable
pub fn compare_format(a: &ImageRecord, b: &ImageRecord) -> AttributeComparison {
    if a.format == b.format {
        return AttributeComparison::Equal;
    }
    match (a.format.rank(), b.format.rank()) {
        (Some(ra), Some(rb)) => AttributeComparison::from_ordering(ra.cmp(&rb)),
        _ => AttributeComparison::Incomparable,
    }
}

/// All attribute comparisons for one pair, from the left image's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityComparison {
    pub resolution: AttributeComparison,
    pub format: AttributeComparison,
}

impl QualityComparison {
    pub fn between(left: &ImageRecord, right: &ImageRecord) -> Self {
        Self {
            resolution: compare_resolution(left, right),
            format: compare_format(left, right),
        }
    }

    /// The comparison from the right image's point of view
    pub fn reversed(&self) -> Self {
        Self {
            resolution: self.resolution.reverse(),
            format: self.format.reverse(),
        }
    }
}
