//! Engine Actor (C7, §4.7): the single-writer thread that owns touch
//! session state and is the only thing allowed to mutate it. Everything
//! upstream (capture, configuration, UI) only ever posts a message through
//! an [`EngineHandle`]; everything downstream only ever reads a published
//! snapshot or drains the dispatch ring. [`EngineCore`] is kept separate
//! from the thread/inbox plumbing so a synchronous replay driver can step
//! the identical state machine without any of the concurrency.

mod actor;
mod engine_core;
mod inbox;

pub use actor::{Engine, EngineHandle, spawn_engine};
pub use engine_core::EngineCore;
pub use inbox::EngineMessage;
