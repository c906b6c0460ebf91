//! crossbeam-channel plumbing between the engine and its listeners.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Engine-side handle. Clones share one channel.
///
/// A send never fails: once the listener hangs up, events are dropped and
/// the run carries on.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Wrap any crossbeam sender, bounded or not.
    pub fn new(sender: Sender<Event>) -> Self {
        Self { inner: sender }
    }

    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Listener-side handle.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Blocking iterator; ends once every sender is dropped.
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }

    /// Everything already queued, without waiting for more.
    pub fn drain(&self) -> Vec<Event> {
        self.inner.try_iter().collect()
    }
}

pub struct EventChannel;

impl EventChannel {
    /// Unbounded channel; the engine never waits on a slow listener.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (EventSender::new(sender), EventReceiver { inner: receiver })
    }
}

/// Sender with no listener, for headless runs.
pub fn null_sender() -> EventSender {
    let (sender, _) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{PipelineEvent, ScoreEvent, ScoreProgress};
    use std::thread;

    fn progress(completed: usize) -> Event {
        Event::Score(ScoreEvent::Progress(ScoreProgress {
            completed,
            total: 3,
        }))
    }

    #[test]
    fn worker_progress_arrives_in_order() {
        let (sender, receiver) = EventChannel::new();

        let worker = thread::spawn(move || {
            for completed in 1..=3 {
                sender.send(progress(completed));
            }
        });

        let seen: Vec<usize> = receiver
            .iter()
            .filter_map(|e| match e {
                Event::Score(ScoreEvent::Progress(p)) => Some(p.completed),
                _ => None,
            })
            .collect();
        worker.join().unwrap();

        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn sending_without_a_listener_is_silent() {
        let sender = null_sender();
        sender.send(Event::Pipeline(PipelineEvent::Started));
        sender.clone().send(progress(1));
    }

    #[test]
    fn drain_returns_only_what_is_queued() {
        let (sender, receiver) = EventChannel::new();
        assert!(receiver.drain().is_empty());

        sender.send(Event::Pipeline(PipelineEvent::Started));
        sender.send(progress(1));

        assert_eq!(receiver.drain().len(), 2);
        assert!(receiver.drain().is_empty());
    }

    #[test]
    fn iteration_stops_after_the_last_clone_drops() {
        let (sender, receiver) = EventChannel::new();
        let clone = sender.clone();
        sender.send(Event::Pipeline(PipelineEvent::Started));
        drop(sender);
        clone.send(Event::Pipeline(PipelineEvent::Cancelled));
        drop(clone);

        assert_eq!(receiver.iter().count(), 2);
    }

    #[test]
    fn wrapped_rendezvous_sender_hands_off_each_event() {
        let (raw, rx) = crossbeam_channel::bounded(0);
        let sender = EventSender::new(raw);

        let listener = thread::spawn(move || rx.iter().count());
        sender.send(progress(1));
        sender.send(progress(2));
        drop(sender);

        assert_eq!(listener.join().unwrap(), 2);
    }
}
