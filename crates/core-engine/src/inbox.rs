//! Bounded engine inbox (§4.7, §8 invariant 7): newest-Ingest-wins
//! backpressure that never drops a configuration message. Mirrors
//! `core-dispatch::DispatchRing`'s `Mutex`+`Condvar` ring, since both need to
//! scan past the front of the queue to apply a selective eviction policy no
//! channel type exposes.

use std::collections::VecDeque;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::{Condvar, Mutex};

use core_config::TouchProcessorConfig;
use core_events::{Frame, INBOX_INGEST_REPLACED, Side};
use core_keymap::{KeyLayout, Keymap};

pub enum EngineMessage {
    Ingest { side: Side, frame: Frame },
    ApplyConfig(TouchProcessorConfig),
    ApplyKeymap(Keymap),
    ApplyLayouts { left: KeyLayout, right: KeyLayout },
    SetLayer(u8),
    SetTypingEnabled(bool),
    SetKeyboardMode(bool),
    Shutdown,
}

/// At capacity, an incoming `Ingest` replaces the queue's existing `Ingest`
/// for the same side rather than blocking the producer (`INBOX_INGEST_REPLACED`
/// counts the replacement). Every other message kind is never dropped: in the
/// degenerate case where the queue is full of non-`Ingest` messages, the push
/// is allowed to exceed `capacity` by one rather than discard a config change.
pub struct EngineInbox {
    capacity: usize,
    state: Mutex<VecDeque<EngineMessage>>,
    ready: Condvar,
}

impl EngineInbox {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(VecDeque::with_capacity(capacity)),
            ready: Condvar::new(),
        }
    }

    pub fn push(&self, message: EngineMessage) {
        let mut queue = self.state.lock().unwrap();
        if queue.len() >= self.capacity {
            if let EngineMessage::Ingest { side, .. } = &message {
                if let Some(pos) = queue
                    .iter()
                    .position(|queued| matches!(queued, EngineMessage::Ingest { side: s, .. } if s == side))
                {
                    queue.remove(pos);
                    INBOX_INGEST_REPLACED.fetch_add(1, Relaxed);
                }
            }
        }
        queue.push_back(message);
        self.ready.notify_one();
    }

    /// Block until a message is available (the actor's only suspension
    /// point, §5).
    pub fn pop_blocking(&self) -> EngineMessage {
        let mut queue = self.state.lock().unwrap();
        while queue.is_empty() {
            queue = self.ready.wait(queue).unwrap();
        }
        queue.pop_front().unwrap()
    }

    pub fn try_pop(&self) -> Option<EngineMessage> {
        self.state.lock().unwrap().pop_front()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::Contact;

    fn frame_msg(side: Side, id: u32) -> EngineMessage {
        let mut frame = Frame::new(0, 0, 0, 1000, 1000);
        frame.push_contact(Contact::new(id, 10, 10, core_events::ContactFlags::TIP));
        EngineMessage::Ingest { side, frame }
    }

    #[test]
    fn a_full_inbox_coalesces_same_side_ingest_and_counts_the_replacement() {
        let inbox = EngineInbox::new(1);
        inbox.push(frame_msg(Side::Left, 1));
        let before = INBOX_INGEST_REPLACED.load(Relaxed);
        inbox.push(frame_msg(Side::Left, 2));
        assert_eq!(INBOX_INGEST_REPLACED.load(Relaxed), before + 1);
        assert_eq!(inbox.len(), 1);

        match inbox.pop_blocking() {
            EngineMessage::Ingest { frame, .. } => {
                assert_eq!(frame.contacts()[0].id, 2, "the newer frame survives")
            }
            _ => panic!("expected an Ingest message"),
        }
    }

    #[test]
    fn config_messages_are_never_dropped_even_past_capacity() {
        let inbox = EngineInbox::new(1);
        inbox.push(EngineMessage::SetLayer(1));
        inbox.push(EngineMessage::SetLayer(2));
        assert_eq!(inbox.len(), 2, "both config messages survive past the nominal capacity");
    }

    #[test]
    fn ingest_for_one_side_does_not_displace_the_other_sides_pending_frame() {
        let inbox = EngineInbox::new(2);
        inbox.push(frame_msg(Side::Left, 1));
        inbox.push(frame_msg(Side::Right, 2));
        inbox.push(frame_msg(Side::Left, 3));

        let mut sides_seen = Vec::new();
        while let Some(EngineMessage::Ingest { side, .. }) = inbox.try_pop() {
            sides_seen.push(side);
        }
        assert_eq!(sides_seen, vec![Side::Right, Side::Left]);
    }
}
