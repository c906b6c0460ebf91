//! # Session Module
//!
//! Walks the ranked queue one pair at a time and applies the user's
//! keep/discard decisions.
//!
//! ## States
//! A session is either `Active` on some pair with one side highlighted, or
//! `Finished`. `Toggle` flips the highlight, `Select` keeps the highlighted
//! side and discards the other, `Skip` moves on without touching the
//! filesystem. Commands on a finished session are ignored.
//!
//! Pairs that contain an image already discarded earlier in the session are
//! passed over automatically, so no file is ever moved twice.

mod compare;
mod controller;
mod view;

pub use compare::{compare_format, compare_resolution, AttributeComparison, QualityComparison};
pub use controller::SessionController;
pub use view::{strip_common_prefix, ImageSummary, PairView, SessionSummary};

use crate::core::discard::DiscardRecord;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One side of a pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    /// The opposite side
    pub fn other(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Where the session is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Active { index: usize, selected: Side },
    Finished,
}

/// Position and counters of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: SessionPhase,
    /// Number of pairs in the queue
    pub total: usize,
    pub resolved: usize,
    pub skipped: usize,
    pub auto_skipped: usize,
}

impl SessionState {
    pub(crate) fn start(total: usize) -> Self {
        let phase = if total == 0 {
            SessionPhase::Finished
        } else {
            SessionPhase::Active {
                index: 0,
                selected: Side::Left,
            }
        };
        Self {
            phase,
            total,
            resolved: 0,
            skipped: 0,
            auto_skipped: 0,
        }
    }

    /// Index of the current pair; `total` once finished
    pub fn index(&self) -> usize {
        match self.phase {
            SessionPhase::Active { index, .. } => index,
            SessionPhase::Finished => self.total,
        }
    }

    /// Highlighted side, if a pair is current
    pub fn selected(&self) -> Option<Side> {
        match self.phase {
            SessionPhase::Active { selected, .. } => Some(selected),
            SessionPhase::Finished => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    /// Fraction of the queue consumed, in [0, 1]
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.index() as f64 / self.total as f64
        }
    }
}

/// Commands the presentation layer can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionCommand {
    /// Flip the highlighted side
    Toggle,
    /// Keep the highlighted side, discard the other
    Select,
    /// Leave both images and move on
    Skip,
}

/// What a command did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandOutcome {
    Toggled { selected: Side },
    Resolved { kept: PathBuf, discarded: DiscardRecord },
    Skipped,
    /// The session was already finished
    Ignored,
}
