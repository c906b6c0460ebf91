//! # Events Module
//!
//! Event-driven architecture for GUI-ready progress reporting.
//!
//! ## Design
//! The core library emits events through channels, allowing any UI
//! (CLI, GUI, web) to subscribe and display progress.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Score(ScoreEvent::Progress(p)) => println!("Scored {}/{}", p.completed, p.total),
//!             _ => {}
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
