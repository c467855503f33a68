//! Owns the render and status snapshot slots on behalf of the Engine Actor.
//! The engine thread is the sole writer; every other thread only ever reads.

use std::sync::Arc;

use crate::render::{RenderPatch, RenderSnapshot};
use crate::slot::SnapshotSlot;
use crate::status::{StatusPatch, StatusSnapshot};

pub struct SnapshotPublisher {
    render: SnapshotSlot<RenderSnapshot>,
    status: SnapshotSlot<StatusSnapshot>,
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        Self {
            render: SnapshotSlot::new(RenderSnapshot::default()),
            status: SnapshotSlot::new(StatusSnapshot::default()),
        }
    }

    pub fn read_render(&self) -> Arc<RenderSnapshot> {
        self.render.read()
    }

    pub fn read_status(&self) -> Arc<StatusSnapshot> {
        self.status.read()
    }

    /// Apply a render delta, advancing `RenderSnapshot.revision` by one.
    pub fn publish_render(&self, patch: RenderPatch) {
        let next = self.render.read().apply(patch);
        tracing::trace!(target: "core_snapshot", revision = next.revision, "publish render snapshot");
        self.render.publish(next);
    }

    /// Apply a status delta, advancing `StatusSnapshot.revision` by one.
    pub fn publish_status(&self, patch: StatusPatch) {
        let next = self.status.read().apply(patch);
        tracing::trace!(target: "core_snapshot", revision = next.revision, "publish status snapshot");
        self.status.publish(next);
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SideContacts;
    use crate::status::Diagnostics;
    use core_events::Side;
    use core_state::IntentMode;

    #[test]
    fn publishing_render_and_status_independently_advances_each_revision() {
        let publisher = SnapshotPublisher::new();
        publisher.publish_render(RenderPatch {
            side: Side::Left,
            contacts: SideContacts::empty(),
            highlighted_key: None,
            layer: 0,
            frame_seq: 1,
        });
        publisher.publish_status(StatusPatch {
            side: Side::Left,
            intent: IntentMode::KeyCandidate,
            contact_count: 1,
            layer: 0,
            typing_enabled: true,
            keyboard_mode: false,
            diagnostics: Diagnostics::default(),
        });

        assert_eq!(publisher.read_render().revision, 1);
        assert_eq!(publisher.read_status().revision, 1);
    }

    #[test]
    fn reads_before_and_after_publish_are_frame_boundary_consistent() {
        let publisher = SnapshotPublisher::new();
        let before = publisher.read_render();
        publisher.publish_render(RenderPatch {
            side: Side::Right,
            contacts: SideContacts::empty(),
            highlighted_key: None,
            layer: 2,
            frame_seq: 9,
        });
        let after = publisher.read_render();
        assert_eq!(before.revision, 0);
        assert_eq!(after.revision, 1);
        assert_eq!(after.frame_seq, 9);
    }
}
