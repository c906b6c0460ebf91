//! Pipeline execution implementation.

use crate::core::cancel::CancellationToken;
use crate::core::catalog::{CatalogConfig, CatalogSource, ImageCatalog, WalkDirCatalog};
use crate::core::discard::DiscardStore;
use crate::core::pairing::{generate_pairs, PairingRules};
use crate::core::ranking::RankedQueue;
use crate::core::scorer::{SimilarityScorer, DEFAULT_RESOLUTION};
use crate::core::session::SessionController;
use crate::error::{ConfigError, PairCullError, ScoreError};
use crate::events::{
    null_sender, Event, EventSender, PairingEvent, PipelineEvent, PipelinePhase, PipelineSummary,
};
use std::path::PathBuf;
use std::time::Instant;

/// Configuration for one comparison run
#[derive(Debug, Clone)]
pub struct ComparisonConfig {
    /// Directories to scan
    pub roots: Vec<PathBuf>,
    /// Only pair images from different directories
    pub cross_only: bool,
    /// Minimum aspect ratio difference for a pair to be kept
    pub aspect_tolerance: f64,
    /// Working resolution for scoring (longest edge, in pixels)
    pub resolution: u32,
    /// Catalog scan configuration
    pub catalog: CatalogConfig,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            cross_only: false,
            aspect_tolerance: PairingRules::default().aspect_tolerance,
            resolution: DEFAULT_RESOLUTION,
            catalog: CatalogConfig::default(),
        }
    }
}

impl ComparisonConfig {
    /// Reject configurations that cannot produce a meaningful run
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| Err(ConfigError::InvalidConfiguration(message.to_string()));

        if self.roots.is_empty() {
            return invalid("at least one directory is required");
        }
        if self.cross_only && self.roots.len() < 2 {
            return invalid("cross-directory comparison needs at least two directories");
        }
        if !self.aspect_tolerance.is_finite() || self.aspect_tolerance < 0.0 {
            return invalid("aspect tolerance must be a finite, non-negative number");
        }
        if self.resolution == 0 {
            return invalid("resolution must be a positive number of pixels");
        }
        Ok(())
    }

    /// Pairing rules derived from this configuration
    pub fn pairing_rules(&self) -> PairingRules {
        PairingRules {
            cross_only: self.cross_only,
            aspect_tolerance: self.aspect_tolerance,
        }
    }
}

/// Result of pipeline execution
#[derive(Debug)]
pub struct ComparisonResult {
    /// Every image found
    pub catalog: ImageCatalog,
    /// Scored pairs, most similar first
    pub queue: RankedQueue,
    /// Non-fatal problems (skipped files, dropped pairs)
    pub warnings: Vec<String>,
    /// Counts for display
    pub summary: PipelineSummary,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ComparisonResult {
    /// Start a review session over the ranked queue
    pub fn into_session(self, store: Box<dyn DiscardStore>) -> SessionController {
        SessionController::new(self.catalog, self.queue, store)
    }
}

/// Builder for pipeline configuration
pub struct ComparisonPipelineBuilder {
    config: ComparisonConfig,
    source: Option<Box<dyn CatalogSource>>,
    cancel: Option<CancellationToken>,
}

impl ComparisonPipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: ComparisonConfig::default(),
            source: None,
            cancel: None,
        }
    }

    /// Start from an existing configuration
    pub fn config(mut self, config: ComparisonConfig) -> Self {
        self.config = config;
        self
    }

    /// Add directories to scan
    pub fn paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config.roots = paths;
        self
    }

    /// Only pair images from different directories
    pub fn cross_only(mut self, cross_only: bool) -> Self {
        self.config.cross_only = cross_only;
        self
    }

    /// Set the aspect ratio tolerance
    pub fn aspect_tolerance(mut self, tolerance: f64) -> Self {
        self.config.aspect_tolerance = tolerance;
        self
    }

    /// Set the working resolution
    pub fn resolution(mut self, resolution: u32) -> Self {
        self.config.resolution = resolution;
        self
    }

    /// Set catalog configuration
    pub fn catalog_config(mut self, config: CatalogConfig) -> Self {
        self.config.catalog = config;
        self
    }

    /// Descend into subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.catalog.recursive = recursive;
        self
    }

    /// Include hidden files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.catalog.include_hidden = include;
        self
    }

    /// Restrict the accepted file extensions
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.catalog.extensions = Some(extensions);
        self
    }

    /// Use a custom catalog source instead of the filesystem walker
    pub fn source(mut self, source: Box<dyn CatalogSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Share a cancellation token with the caller
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Validate the configuration and build the pipeline
    pub fn build(self) -> Result<ComparisonPipeline, ConfigError> {
        self.config.validate()?;
        let scorer = SimilarityScorer::new(self.config.resolution)?;
        let source = self
            .source
            .unwrap_or_else(|| Box::new(WalkDirCatalog::new(self.config.catalog.clone())));

        Ok(ComparisonPipeline {
            config: self.config,
            source,
            scorer,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

impl Default for ComparisonPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Catalog, pair, score and rank in one run
pub struct ComparisonPipeline {
    config: ComparisonConfig,
    source: Box<dyn CatalogSource>,
    scorer: SimilarityScorer,
    cancel: CancellationToken,
}

impl ComparisonPipeline {
    /// Create a new pipeline builder
    pub fn builder() -> ComparisonPipelineBuilder {
        ComparisonPipelineBuilder::new()
    }

    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Handle that stops the scoring stage when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<ComparisonResult, PairCullError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<ComparisonResult, PairCullError> {
        let start_time = Instant::now();
        let mut warnings = Vec::new();

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Cataloging
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Cataloging,
        }));

        let scan = self.source.scan_with_events(&self.config.roots, events);
        warnings.extend(scan.errors.iter().map(ToString::to_string));
        let catalog = scan.catalog;

        // Phase 2: Pairing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Pairing,
        }));

        let candidates = PairingRules::count_candidates(catalog.len());
        let pairs = generate_pairs(&catalog, &self.config.pairing_rules());
        events.send(Event::Pairing(PairingEvent::Completed {
            candidates,
            kept: pairs.len(),
        }));
        tracing::info!(candidates, kept = pairs.len(), "pairs generated");

        // Phase 3: Scoring
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scoring,
        }));

        let batch = match self.scorer.score_all(&catalog, &pairs, &self.cancel, events) {
            Ok(batch) => batch,
            Err(ScoreError::Cancelled) => {
                events.send(Event::Pipeline(PipelineEvent::Cancelled));
                return Err(ScoreError::Cancelled.into());
            }
            Err(e) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
                return Err(e.into());
            }
        };
        warnings.extend(batch.failures.iter().map(ToString::to_string));
        let dropped_pairs = batch.failures.len();

        // Phase 4: Ranking
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Ranking,
        }));

        let queue = RankedQueue::new(batch.scored);
        let duration_ms = start_time.elapsed().as_millis() as u64;

        let summary = PipelineSummary {
            total_images: catalog.len(),
            candidate_pairs: pairs.len(),
            scored_pairs: queue.total(),
            dropped_pairs,
            duration_ms,
        };
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: summary.clone(),
        }));
        tracing::info!(
            images = summary.total_images,
            pairs = summary.scored_pairs,
            warnings = warnings.len(),
            duration_ms,
            "comparison complete"
        );

        Ok(ComparisonResult {
            catalog,
            queue,
            warnings,
            summary,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{CatalogScan, ImageFormat, ImageRecord};
    use crate::events::{EventChannel, ScoreEvent};
    use image::{ImageBuffer, Rgb};
    use std::path::Path;
    use tempfile::TempDir;

    fn write_image(dir: &Path, name: &str, width: u32, height: u32) {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 90])
        });
        img.save(dir.join(name)).unwrap();
    }

    /// Returns a fixed catalog regardless of the roots
    struct FixedSource(Vec<ImageRecord>);

    impl CatalogSource for FixedSource {
        fn scan_with_events(&self, roots: &[PathBuf], _events: &EventSender) -> CatalogScan {
            CatalogScan {
                catalog: ImageCatalog::from_records(roots.to_vec(), self.0.clone()),
                errors: Vec::new(),
            }
        }
    }

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = ComparisonConfig::default();
        assert!(!config.cross_only);
        assert_eq!(config.aspect_tolerance, 0.1);
        assert_eq!(config.resolution, 100);
    }

    #[test]
    fn invalid_configurations_are_rejected() {
        let root = vec![PathBuf::from("/photos")];

        assert!(ComparisonPipeline::builder().build().is_err());
        assert!(ComparisonPipeline::builder()
            .paths(root.clone())
            .resolution(0)
            .build()
            .is_err());
        assert!(ComparisonPipeline::builder()
            .paths(root.clone())
            .aspect_tolerance(-0.1)
            .build()
            .is_err());
        assert!(ComparisonPipeline::builder()
            .paths(root.clone())
            .aspect_tolerance(f64::NAN)
            .build()
            .is_err());
        assert!(ComparisonPipeline::builder()
            .paths(root.clone())
            .cross_only(true)
            .build()
            .is_err());
        assert!(ComparisonPipeline::builder().paths(root).build().is_ok());
    }

    #[test]
    fn empty_directory_gives_empty_queue() {
        let temp_dir = TempDir::new().unwrap();

        let result = ComparisonPipeline::builder()
            .paths(vec![temp_dir.path().to_path_buf()])
            .build()
            .unwrap()
            .run()
            .unwrap();

        assert!(result.catalog.is_empty());
        assert!(result.queue.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn two_image_scenario_yields_one_pair() {
        let temp_dir = TempDir::new().unwrap();
        write_image(temp_dir.path(), "a.png", 800, 600);
        write_image(temp_dir.path(), "b.jpg", 400, 300);

        let result = ComparisonPipeline::builder()
            .paths(vec![temp_dir.path().to_path_buf()])
            .aspect_tolerance(0.0)
            .resolution(32)
            .build()
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(result.catalog.len(), 2);
        assert_eq!(result.queue.total(), 1);
        let pair = result.queue.peek().unwrap();
        assert!(pair.similarity_score > 0.5, "score {}", pair.similarity_score);
        assert_eq!(result.summary.scored_pairs, 1);
    }

    #[test]
    fn unreadable_files_become_warnings() {
        let temp_dir = TempDir::new().unwrap();
        write_image(temp_dir.path(), "a.png", 20, 20);
        std::fs::write(temp_dir.path().join("broken.png"), b"nope").unwrap();

        let result = ComparisonPipeline::builder()
            .paths(vec![temp_dir.path().to_path_buf()])
            .build()
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(result.catalog.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("broken.png"));
    }

    #[test]
    fn undecodable_pairs_are_dropped_with_warning() {
        let temp_dir = TempDir::new().unwrap();
        write_image(temp_dir.path(), "a.png", 20, 20);
        let record = |name: &str| ImageRecord {
            path: temp_dir.path().join(name),
            width: 20,
            height: 10,
            format: ImageFormat::Png,
            size: 0,
            root: 0,
        };
        let source = FixedSource(vec![record("a.png"), record("missing.png")]);

        let result = ComparisonPipeline::builder()
            .paths(vec![temp_dir.path().to_path_buf()])
            .aspect_tolerance(0.0)
            .source(Box::new(source))
            .build()
            .unwrap()
            .run()
            .unwrap();

        assert!(result.queue.is_empty());
        assert_eq!(result.summary.dropped_pairs, 1);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn cancelled_run_returns_error_and_event() {
        let temp_dir = TempDir::new().unwrap();
        write_image(temp_dir.path(), "a.png", 20, 20);
        write_image(temp_dir.path(), "b.png", 20, 20);

        let token = CancellationToken::new();
        let pipeline = ComparisonPipeline::builder()
            .paths(vec![temp_dir.path().to_path_buf()])
            .aspect_tolerance(0.0)
            .cancellation_token(token.clone())
            .build()
            .unwrap();
        token.cancel();

        let (sender, receiver) = EventChannel::new();
        let result = pipeline.run_with_events(&sender);
        drop(sender);

        assert!(matches!(
            result,
            Err(PairCullError::Score(ScoreError::Cancelled))
        ));
        assert!(receiver
            .iter()
            .any(|e| matches!(e, Event::Pipeline(PipelineEvent::Cancelled))));
    }

    #[test]
    fn cancelling_while_scoring_stops_the_run() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["a.png", "b.png", "c.png", "d.png"] {
            write_image(temp_dir.path(), name, 20, 20);
        }
        let pipeline = ComparisonPipeline::builder()
            .paths(vec![temp_dir.path().to_path_buf()])
            .aspect_tolerance(0.0)
            .resolution(16)
            .build()
            .unwrap();
        let token = pipeline.cancellation_token();

        // a rendezvous channel holds the scorer until the listener has seen
        // each event, so the cancel lands between the first and second pair
        let (raw, rx) = crossbeam_channel::bounded(0);
        let sender = EventSender::new(raw);
        let listener = std::thread::spawn(move || {
            let mut cancelled_event = false;
            for event in rx.iter() {
                match event {
                    Event::Score(ScoreEvent::Progress(_)) => token.cancel(),
                    Event::Pipeline(PipelineEvent::Cancelled) => cancelled_event = true,
                    _ => {}
                }
            }
            cancelled_event
        });

        let result = pipeline.run_with_events(&sender);
        drop(sender);

        assert!(matches!(
            result,
            Err(PairCullError::Score(ScoreError::Cancelled))
        ));
        assert!(listener.join().unwrap());
    }

    #[test]
    fn phases_are_reported_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let (sender, receiver) = EventChannel::new();

        ComparisonPipeline::builder()
            .paths(vec![temp_dir.path().to_path_buf()])
            .build()
            .unwrap()
            .run_with_events(&sender)
            .unwrap();
        drop(sender);

        let phases: Vec<PipelinePhase> = receiver
            .iter()
            .filter_map(|e| match e {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => Some(phase),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![
                PipelinePhase::Cataloging,
                PipelinePhase::Pairing,
                PipelinePhase::Scoring,
                PipelinePhase::Ranking,
            ]
        );
    }
}
