use super::view::{PairView, SessionSummary};
use super::{CommandOutcome, SessionCommand, SessionPhase, SessionState, Side};
use crate::core::catalog::{ImageCatalog, RecordId};
use crate::core::discard::{DiscardRecord, DiscardStore};
use crate::core::pairing::ComparisonPair;
use crate::core::ranking::RankedQueue;
use crate::error::DiscardError;
use crate::events::{Event, EventSender, SessionEvent};
use std::collections::HashSet;

/// Drives one review session over a ranked queue
pub struct SessionController {
    catalog: ImageCatalog,
    queue: RankedQueue,
    store: Box<dyn DiscardStore>,
    state: SessionState,
    discarded: Vec<DiscardRecord>,
    discarded_ids: HashSet<RecordId>,
    events: EventSender,
}

impl SessionController {
    /// Start a session on the first pair of `queue`
    pub fn new(catalog: ImageCatalog, queue: RankedQueue, store: Box<dyn DiscardStore>) -> Self {
        let state = SessionState::start(queue.total());
        Self {
            catalog,
            queue,
            store,
            state,
            discarded: Vec::new(),
            discarded_ids: HashSet::new(),
            events: crate::events::null_sender(),
        }
    }

    /// Report session events to `events`
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn progress(&self) -> f64 {
        self.state.progress()
    }

    pub fn catalog(&self) -> &ImageCatalog {
        &self.catalog
    }

    pub fn queue(&self) -> &RankedQueue {
        &self.queue
    }

    /// Files moved aside so far, oldest first
    pub fn discarded(&self) -> &[DiscardRecord] {
        &self.discarded
    }

    /// Snapshot of the current pair, `None` once finished
    pub fn current_view(&self) -> Option<PairView> {
        let SessionPhase::Active { index, selected } = self.state.phase else {
            return None;
        };
        let pair = self.queue.peek()?;
        Some(PairView::build(
            index,
            self.state.total,
            &self.catalog[pair.left],
            &self.catalog[pair.right],
            pair.similarity_score,
            selected,
            self.state.progress(),
        ))
    }

    /// Dispatch a command
    pub fn apply(&mut self, command: SessionCommand) -> Result<CommandOutcome, DiscardError> {
        match command {
            SessionCommand::Toggle => Ok(self.toggle()),
            SessionCommand::Select => self.select(),
            SessionCommand::Skip => Ok(self.skip()),
        }
    }

    /// Flip the highlighted side
    pub fn toggle(&mut self) -> CommandOutcome {
        let SessionPhase::Active { index, selected } = self.state.phase else {
            return ignored("toggle");
        };
        let selected = selected.other();
        self.state.phase = SessionPhase::Active { index, selected };
        self.events
            .send(Event::Session(SessionEvent::Toggled { index, selected }));
        CommandOutcome::Toggled { selected }
    }

    /// Keep the highlighted image and discard the other one.
    ///
    /// If the discard fails the session stays on the same pair with the
    /// same highlight, and the error is returned.
    pub fn select(&mut self) -> Result<CommandOutcome, DiscardError> {
        let SessionPhase::Active { index, selected } = self.state.phase else {
            return Ok(ignored("select"));
        };
        let Some(pair) = self.queue.peek() else {
            self.finish();
            return Ok(CommandOutcome::Ignored);
        };
        let (kept_id, discarded_id) = match selected {
            Side::Left => (pair.left, pair.right),
            Side::Right => (pair.right, pair.left),
        };

        let record = match self.store.discard(&self.catalog[discarded_id]) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(index, "discard failed: {e}");
                self.events.send(Event::Session(SessionEvent::DiscardFailed {
                    index,
                    message: e.to_string(),
                }));
                return Err(e);
            }
        };

        let kept = self.catalog[kept_id].path.clone();
        self.events.send(Event::Session(SessionEvent::Resolved {
            index,
            kept: kept.clone(),
            discarded: record.original.clone(),
        }));

        self.discarded_ids.insert(discarded_id);
        self.discarded.push(record.clone());
        self.state.resolved += 1;
        self.advance();

        Ok(CommandOutcome::Resolved {
            kept,
            discarded: record,
        })
    }

    /// Move past the current pair without touching the filesystem
    pub fn skip(&mut self) -> CommandOutcome {
        let SessionPhase::Active { index, .. } = self.state.phase else {
            return ignored("skip");
        };
        self.events.send(Event::Session(SessionEvent::Skipped { index }));
        self.state.skipped += 1;
        self.advance();
        CommandOutcome::Skipped
    }

    /// End the session and report what happened
    pub fn into_summary(self) -> SessionSummary {
        self.summary()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            total: self.state.total,
            resolved: self.state.resolved,
            skipped: self.state.skipped,
            auto_skipped: self.state.auto_skipped,
            discarded: self.discarded.clone(),
        }
    }

    fn advance(&mut self) {
        self.queue.advance();
        self.pass_over_stale_pairs();

        if self.queue.is_exhausted() {
            self.finish();
        } else {
            self.state.phase = SessionPhase::Active {
                index: self.queue.index(),
                selected: Side::Left,
            };
        }
    }

    fn pass_over_stale_pairs(&mut self) {
        while let Some(pair) = self.queue.peek() {
            let Some(stale) = self.stale_member(pair) else {
                break;
            };
            let index = self.queue.index();
            let path = self.catalog[stale].path.clone();
            tracing::debug!(index, path = %path.display(), "pair refers to a discarded image");
            self.events
                .send(Event::Session(SessionEvent::AutoSkipped { index, path }));
            self.state.auto_skipped += 1;
            self.queue.advance();
        }
    }

    fn stale_member(&self, pair: &ComparisonPair) -> Option<RecordId> {
        pair.ids()
            .into_iter()
            .find(|id| self.discarded_ids.contains(id))
    }

    fn finish(&mut self) {
        if self.state.is_finished() {
            return;
        }
        self.state.phase = SessionPhase::Finished;
        tracing::info!(
            resolved = self.state.resolved,
            skipped = self.state.skipped,
            auto_skipped = self.state.auto_skipped,
            "session finished"
        );
        self.events.send(Event::Session(SessionEvent::Finished {
            resolved: self.state.resolved,
            skipped: self.state.skipped,
        }));
    }
}

fn ignored(command: &str) -> CommandOutcome {
    tracing::debug!(command, "session finished, ignoring command");
    CommandOutcome::Ignored
}
