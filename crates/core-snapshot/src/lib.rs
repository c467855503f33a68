//! Snapshot Service (C9, §4.9): engine-owned, revision-stamped
//! `RenderSnapshot`/`StatusSnapshot` publication. The engine thread is the
//! sole writer; UI threads call only `SnapshotPublisher::read_render`/
//! `read_status`, each a single bounded-time lock acquisition plus an `Arc`
//! clone — never a blocking wait on the engine.

pub mod publisher;
pub mod render;
pub mod slot;
pub mod status;

pub use publisher::SnapshotPublisher;
pub use render::{ContactPosition, RenderPatch, RenderSnapshot, SideContacts};
pub use slot::SnapshotSlot;
pub use status::{Diagnostics, ReleaseDroppedCounts, StatusPatch, StatusSnapshot};
