//! Event type definitions for progress reporting.

use crate::core::session::Side;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the comparison pipeline and the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Catalog scan events
    Catalog(CatalogEvent),
    /// Pair generation events
    Pairing(PairingEvent),
    /// Similarity scoring events
    Score(ScoreEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
    /// Interactive session events
    Session(SessionEvent),
}

/// Events during the catalog scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CatalogEvent {
    /// Scanning has started
    Started { roots: Vec<PathBuf> },
    /// An image was accepted into the catalog
    ImageFound { path: PathBuf },
    /// A file was skipped but scanning continues
    Skipped { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_images: usize },
}

/// Events during pair generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PairingEvent {
    /// Pair generation completed
    Completed {
        /// Number of unordered pairs before filtering
        candidates: usize,
        /// Number of pairs kept for scoring
        kept: usize,
    },
}

/// Events during similarity scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScoreEvent {
    /// Scoring has started
    Started { total_pairs: usize },
    /// Progress update during scoring
    Progress(ScoreProgress),
    /// A pair could not be scored and was dropped
    Dropped { path: PathBuf, message: String },
    /// Scoring completed
    Completed { scored: usize, dropped: usize },
}

/// Progress information during scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreProgress {
    /// Number of pairs finished so far (scored or dropped)
    pub completed: usize,
    /// Total number of pairs to score
    pub total: usize,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline was cancelled
    Cancelled,
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Cataloging,
    Pairing,
    Scoring,
    Ranking,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Images accepted into the catalog
    pub total_images: usize,
    /// Pairs that survived filtering
    pub candidate_pairs: usize,
    /// Pairs with a similarity score
    pub scored_pairs: usize,
    /// Pairs dropped because an image failed to decode
    pub dropped_pairs: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Events from the interactive session controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// The highlighted side changed
    Toggled { index: usize, selected: Side },
    /// A pair was resolved by keeping one side
    Resolved {
        index: usize,
        kept: PathBuf,
        discarded: PathBuf,
    },
    /// A pair was skipped by the user
    Skipped { index: usize },
    /// A pair was skipped because one of its images is already discarded
    AutoSkipped { index: usize, path: PathBuf },
    /// Moving an image aside failed; the pair stays current
    DiscardFailed { index: usize, message: String },
    /// Every pair has been consumed
    Finished { resolved: usize, skipped: usize },
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Cataloging => write!(f, "Cataloging"),
            PipelinePhase::Pairing => write!(f, "Pairing"),
            PipelinePhase::Scoring => write!(f, "Scoring"),
            PipelinePhase::Ranking => write!(f, "Ranking"),
        }
    }
}
