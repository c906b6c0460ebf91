//! # Core Module
//!
//! The presentation-agnostic pair culling engine.
//!
//! ## Modules
//! - `catalog` - Discovers images and reads their headers
//! - `pairing` - Enumerates candidate pairs
//! - `scorer` - Computes SSIM similarity per pair
//! - `ranking` - Orders pairs most similar first
//! - `session` - Keep/discard state machine over the ranked pairs
//! - `discard` - Moves rejected images aside
//! - `pipeline` - Orchestrates catalog through ranking

pub mod cancel;
pub mod catalog;
pub mod discard;
pub mod pairing;
pub mod pipeline;
pub mod ranking;
pub mod scorer;
pub mod session;

// Re-export commonly used types
pub use cancel::CancellationToken;
pub use catalog::{ImageCatalog, ImageFormat, ImageRecord, RecordId};
pub use discard::{DiscardRecord, DiscardStore, FsDiscardStore};
pub use pairing::{ComparisonPair, PairingRules};
pub use pipeline::{ComparisonConfig, ComparisonPipeline, ComparisonResult};
pub use ranking::RankedQueue;
pub use session::{
    AttributeComparison, CommandOutcome, PairView, SessionCommand, SessionController, SessionState,
    Side,
};
