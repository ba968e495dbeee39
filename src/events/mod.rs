//! # Events Module
//!
//! Progress reporting for enumeration, hashing and marking.
//!
//! ## Design
//! The core library emits events through channels, so the terminal front
//! end (or any other display) can subscribe and repaint progress while the
//! coordinator keeps polling the hashing workers.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Hash(HashEvent::Progress(p)) = event {
//!             println!("{p}");
//!         }
//!     }
//! });
//!
//! pipeline.run(&store, &cancel, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
