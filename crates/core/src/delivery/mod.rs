//! Consumer side of scheduled delivery events.
//!
//! Submitted events cannot be cancelled, so every fired event passes through
//! the [`DeliveryGate`] which re-reads the stored preference before anything
//! is sent.

mod delivery_gate;
mod delivery_model;
mod delivery_traits;


pub use delivery_gate::{dispatch, DeliveryGate};
pub use delivery_model::*;
pub use delivery_traits::DeliveryHandlerTrait;
