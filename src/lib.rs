//! # Pair Cull
//!
//! Finds visually similar image pairs and lets a person decide, pair by
//! pair, which image to keep.
//!
//! ## Core Philosophy
//! - **Never delete** - rejected images are moved into a `.discarded` folder
//! - **Never overwrite** - a name clash in `.discarded` stops the move
//! - **Most similar first** - pairs are reviewed in descending SSIM order
//!
//! ## Architecture
//! The library is split into a core engine and presentation layers:
//! - `core` - Catalog, pairing, scoring, ranking and the review session
//! - `events` - Event-driven progress reporting
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{PairCullError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG` wins
/// when set; otherwise `verbose` picks `debug` over `warn`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    // a subscriber installed by the host application takes precedence
    let _ = tracing::subscriber::set_global_default(subscriber);
}
