//! # pair-cull CLI
//!
//! Finds similar image pairs and walks through them interactively.
//!
//! ## Usage
//! ```bash
//! pair-cull ~/Photos
//! pair-cull ~/Photos ~/Backup --cross --tolerance 0.05
//! pair-cull ~/Photos --list --output json
//! ```

mod cli;

use pair_cull::Result;

fn main() -> Result<()> {
    cli::run()
}
