//! # Pipeline Module
//!
//! Orchestrates the comparison workflow that feeds a session.
//!
//! ## Pipeline Stages
//! 1. **Catalog** - Discover images and read their headers
//! 2. **Pair** - Enumerate candidate pairs under the pairing rules
//! 3. **Score** - SSIM for every candidate (parallel, cancellable)
//! 4. **Rank** - Sort most similar first
//!
//! The result owns the catalog and the ranked queue and converts into a
//! [`SessionController`](crate::core::session::SessionController).

mod executor;

pub use crate::core::cancel::CancellationToken;
pub use executor::{ComparisonConfig, ComparisonPipeline, ComparisonPipelineBuilder, ComparisonResult};
