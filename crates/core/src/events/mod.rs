//! Scheduled delivery events.
//!
//! Defines the `newsletter.schedule` event contract and the scheduler trait
//! through which core services talk to the event-delivery substrate. Adapter
//! crates implement the trait for remote substrates; an in-process
//! implementation is provided here.

mod delivery_event;
mod scheduler;

pub use delivery_event::*;
pub use scheduler::*;
