//! Dispatch Queue & Pump (C8, §4.8) and the outbound sink interface (§6).
//!
//! The Engine Actor is the sole producer into a [`DispatchRing`]; a
//! dedicated pump thread is the sole consumer, forwarding events to a
//! [`DispatchSink`] in order and gating modifier transitions through a
//! ref-count table so overlapping chords never release a modifier early.
//! The sink itself — synthetic input injection — is a non-goal; only the
//! trait and a logging stand-in are implemented here.

mod modifiers;
mod pump;
mod ring;

pub use modifiers::ModifierRefCounts;
pub use pump::{DispatchSink, LoggingSink, Pump, PumpShutdown, spawn_pump};
pub use ring::DispatchRing;
