//! # CLI Module
//!
//! Command-line interface for the pair culling engine.
//!
//! ## Usage
//! ```bash
//! # Review similar pairs in one directory
//! pair-cull ~/Photos
//!
//! # Only compare images across two directories
//! pair-cull ~/Photos ~/Phone --cross
//!
//! # Print the ranked pairs as JSON instead of starting a session
//! pair-cull ~/Photos --list --output json
//! ```

mod interactive;

use clap::{Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use pair_cull::core::discard::FsDiscardStore;
use pair_cull::core::pipeline::{ComparisonPipeline, ComparisonResult};
use pair_cull::core::scorer::DEFAULT_RESOLUTION;
use pair_cull::error::Result;
use pair_cull::events::{CatalogEvent, Event, EventChannel, PipelineEvent, ScoreEvent};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;

/// Pair Cull - review similar images two at a time
#[derive(Parser, Debug)]
#[command(name = "pair-cull")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories to compare
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Only compare images across directories
    #[arg(short = 'x', long)]
    cross: bool,

    /// Aspect ratio tolerance
    #[arg(short, long, default_value_t = 0.1)]
    tolerance: f64,

    /// Resolution at which to compute SSIM
    #[arg(short, long, default_value_t = DEFAULT_RESOLUTION)]
    resolution: u32,

    /// Descend into subdirectories
    #[arg(long)]
    recursive: bool,

    /// Include hidden files
    #[arg(long)]
    include_hidden: bool,

    /// Print the ranked pairs and exit without a session
    #[arg(long)]
    list: bool,

    /// Output format for --list
    #[arg(short, long, value_enum, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    pair_cull::init_tracing(cli.verbose);

    let pretty = cli.output == OutputFormat::Pretty;
    let term = Term::stderr();

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Pair Cull").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))?;
        term.write_line("")?;
    }

    let pipeline = ComparisonPipeline::builder()
        .paths(cli.paths.clone())
        .cross_only(cli.cross)
        .aspect_tolerance(cli.tolerance)
        .resolution(cli.resolution)
        .recursive(cli.recursive)
        .include_hidden(cli.include_hidden)
        .build()?;

    let result = run_pipeline(&pipeline, pretty)?;

    if pretty {
        print_summary(&term, &result, cli.verbose)?;
    }

    if cli.list {
        return match cli.output {
            OutputFormat::Pretty => print_pretty_list(&result),
            OutputFormat::Json => print_json_list(&result),
        };
    }

    let stdout = Term::stdout();
    if !stdout.is_term() {
        term.write_line(&format!(
            "{}",
            style("Not a terminal, printing the ranked pairs instead.").yellow()
        ))?;
        return print_pretty_list(&result);
    }

    let session = result.into_session(Box::new(FsDiscardStore::new()));
    interactive::run_session(&stdout, session)
}

fn run_pipeline(pipeline: &ComparisonPipeline, pretty: bool) -> Result<ComparisonResult> {
    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = pretty.then(|| {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        pb
    });

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        let Some(pb) = progress else {
            receiver.iter().for_each(drop);
            return;
        };
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Catalog(CatalogEvent::Completed { total_images }) => {
                    pb.set_message(format!("{total_images} images"));
                }
                Event::Score(ScoreEvent::Started { total_pairs }) => {
                    pb.set_length(total_pairs as u64);
                    pb.set_message("Computing SSIM");
                }
                Event::Score(ScoreEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Cancelled)
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    result
}

fn print_summary(term: &Term, result: &ComparisonResult, verbose: bool) -> Result<()> {
    term.write_line(&format!(
        "{} Comparison Complete",
        style("✓").green().bold()
    ))?;
    term.write_line(&format!(
        "  {} images catalogued in {:.1}s",
        style(result.summary.total_images).cyan(),
        result.duration_ms as f64 / 1000.0
    ))?;
    term.write_line(&format!(
        "  {} pairs to review",
        style(result.summary.scored_pairs).cyan()
    ))?;

    if !result.warnings.is_empty() {
        term.write_line(&format!(
            "  {} {} warnings",
            style("⚠").yellow(),
            result.warnings.len()
        ))?;
        if verbose {
            for warning in &result.warnings {
                term.write_line(&format!("    {}", style(warning).dim()))?;
            }
        }
    }

    term.write_line("")?;
    Ok(())
}

fn print_pretty_list(result: &ComparisonResult) -> Result<()> {
    let term = Term::stdout();

    if result.queue.is_empty() {
        term.write_line("No similar pairs found.")?;
        return Ok(());
    }

    for (rank, pair) in result.queue.iter().enumerate() {
        let left = &result.catalog[pair.left];
        let right = &result.catalog[pair.right];
        term.write_line(&format!(
            "{:>4}  {}  {}  {}",
            style(rank + 1).dim(),
            style(format!("{:.4}", pair.similarity_score)).yellow(),
            display_path(&left.path),
            display_path(&right.path)
        ))?;
    }
    Ok(())
}

fn print_json_list(result: &ComparisonResult) -> Result<()> {
    let output = serde_json::json!({
        "total_images": result.summary.total_images,
        "candidate_pairs": result.summary.candidate_pairs,
        "dropped_pairs": result.summary.dropped_pairs,
        "duration_ms": result.duration_ms,
        "warnings": result.warnings,
        "pairs": result.queue.iter().enumerate().map(|(rank, pair)| {
            serde_json::json!({
                "rank": rank,
                "similarity_score": pair.similarity_score,
                "aspect_ratio_delta": pair.aspect_ratio_delta,
                "left": result.catalog[pair.left],
                "right": result.catalog[pair.right],
            })
        }).collect::<Vec<_>>()
    });

    let text = serde_json::to_string_pretty(&output).map_err(io::Error::other)?;
    println!("{text}");
    Ok(())
}

/// Path with the home directory shortened to `~`
fn display_path(path: &Path) -> String {
    dirs::home_dir()
        .and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf))
        .map(|rest| format!("~/{}", rest.display()))
        .unwrap_or_else(|| path.display().to_string())
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
