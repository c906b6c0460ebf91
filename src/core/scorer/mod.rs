//! # Scorer Module
//!
//! Computes a structural similarity score for each candidate pair.
//!
//! ## Working shape
//! Both images of a pair are resized to one shared shape derived from the
//! mean of their aspect ratios, with the longer edge equal to the configured
//! `resolution`. Because both land on the same grid, no padding or cropping
//! is ever applied before SSIM.
//!
//! ## Parallelism
//! Pairs are independent. `score_all` maps them over the rayon pool, each
//! worker holding its own resizer; the only shared state is a progress
//! counter and the collected results.

mod decode;
mod resize;
mod ssim;

pub use decode::LumaDecoder;
pub use resize::LumaResizer;
pub use ssim::{effective_window, mean_ssim, DEFAULT_WINDOW};

use crate::core::cancel::CancellationToken;
use crate::core::catalog::{ImageCatalog, ImageRecord};
use crate::core::pairing::ComparisonPair;
use crate::error::{ConfigError, ScoreError};
use crate::events::{Event, EventSender, ScoreEvent, ScoreProgress};
use image::GrayImage;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default working resolution (longest edge, in pixels)
pub const DEFAULT_RESOLUTION: u32 = 100;

/// Shared shape both images of a pair are resized to.
///
/// With `a` the mean aspect ratio: portrait-ish pairs get
/// `(floor(resolution * a), resolution)`, others
/// `(resolution, floor(resolution / a))`. Each side is at least one pixel.
pub fn common_shape(left: (u32, u32), right: (u32, u32), resolution: u32) -> (u32, u32) {
    let ratio = |(w, h): (u32, u32)| w as f64 / h as f64;
    let mean = (ratio(left) + ratio(right)) / 2.0;
    let res = resolution as f64;

    let (width, height) = if mean < 1.0 {
        ((res * mean) as u32, resolution)
    } else {
        (resolution, (res / mean) as u32)
    };

    (width.max(1), height.max(1))
}

/// Scored pairs plus the pairs that had to be dropped
#[derive(Debug, Default)]
pub struct ScoreBatch {
    /// Pairs with a similarity score, in input order
    pub scored: Vec<ComparisonPair>,
    /// One entry per dropped pair
    pub failures: Vec<ScoreError>,
}

/// SSIM scorer at a fixed working resolution
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    resolution: u32,
    window: u32,
}

impl SimilarityScorer {
    /// Create a scorer; `resolution` must be positive
    pub fn new(resolution: u32) -> Result<Self, ConfigError> {
        if resolution == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "resolution must be a positive number of pixels".to_string(),
            ));
        }
        Ok(Self {
            resolution,
            window: DEFAULT_WINDOW,
        })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Score two already decoded grayscale images
    pub fn score_luma(
        &self,
        resizer: &mut LumaResizer,
        left: (&GrayImage, &ImageRecord),
        right: (&GrayImage, &ImageRecord),
    ) -> Result<f64, ScoreError> {
        let (width, height) = common_shape(left.0.dimensions(), right.0.dimensions(), self.resolution);

        let a = resizer.resize(left.0, width, height, &left.1.path)?;
        let b = resizer.resize(right.0, width, height, &right.1.path)?;

        mean_ssim(&a, &b, self.window).ok_or_else(|| ScoreError::ScoringFailure {
            path: left.1.path.clone(),
            reason: "resized images differ in shape".to_string(),
        })
    }

    /// Decode and score one pair of records
    pub fn score_pair(&self, left: &ImageRecord, right: &ImageRecord) -> Result<f64, ScoreError> {
        self.score_with(&mut LumaResizer::new(), left, right)
    }

    fn score_with(
        &self,
        resizer: &mut LumaResizer,
        left: &ImageRecord,
        right: &ImageRecord,
    ) -> Result<f64, ScoreError> {
        let a = LumaDecoder::decode(left)?;
        let b = LumaDecoder::decode(right)?;
        self.score_luma(resizer, (&a, left), (&b, right))
    }

    /// Score every pair in parallel.
    ///
    /// Pairs whose images fail to decode are dropped and reported in
    /// `failures`. If `cancel` fires, all partial results are discarded and
    /// `ScoreError::Cancelled` is returned.
    pub fn score_all(
        &self,
        catalog: &ImageCatalog,
        pairs: &[ComparisonPair],
        cancel: &CancellationToken,
        events: &EventSender,
    ) -> Result<ScoreBatch, ScoreError> {
        let total = pairs.len();
        events.send(Event::Score(ScoreEvent::Started { total_pairs: total }));

        let completed = AtomicUsize::new(0);

        let outcomes: Vec<Option<Result<ComparisonPair, ScoreError>>> = pairs
            .par_iter()
            .map_init(LumaResizer::new, |resizer, pair| {
                if cancel.is_cancelled() {
                    return None;
                }

                let outcome = self
                    .score_with(resizer, &catalog[pair.left], &catalog[pair.right])
                    .map(|score| pair.with_score(score));

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Err(ref e) = outcome {
                    tracing::warn!("dropping pair: {e}");
                    if let ScoreError::ScoringFailure { path, .. } = e {
                        events.send(Event::Score(ScoreEvent::Dropped {
                            path: path.clone(),
                            message: e.to_string(),
                        }));
                    }
                }
                events.send(Event::Score(ScoreEvent::Progress(ScoreProgress {
                    completed: done,
                    total,
                })));

                Some(outcome)
            })
            .collect();

        if cancel.is_cancelled() {
            tracing::info!(
                completed = completed.load(Ordering::Relaxed),
                total,
                "scoring cancelled, discarding partial results"
            );
            return Err(ScoreError::Cancelled);
        }

        let mut batch = ScoreBatch::default();
        for outcome in outcomes.into_iter().flatten() {
            match outcome {
                Ok(pair) => batch.scored.push(pair),
                Err(e) => batch.failures.push(e),
            }
        }

        events.send(Event::Score(ScoreEvent::Completed {
            scored: batch.scored.len(),
            dropped: batch.failures.len(),
        }));

        Ok(batch)
    }
}
