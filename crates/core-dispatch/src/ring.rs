//! Bounded dispatch ring (§4.8): drop-oldest-non-modifier backpressure so
//! the Engine Actor's producer side never blocks.

use std::collections::VecDeque;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use core_events::{DISPATCH_DROPPED, DispatchEvent};

/// Push never blocks: once `capacity` is reached, the oldest non-modifier
/// event is evicted to make room. Modifier events are never evicted (§8
/// invariant 5, modifier balance); in the degenerate case where every
/// queued event is a modifier, the new one is pushed past capacity rather
/// than corrupting a pump's ref-count bookkeeping.
pub struct DispatchRing {
    capacity: usize,
    state: Mutex<VecDeque<DispatchEvent>>,
    ready: Condvar,
}

impl DispatchRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(VecDeque::with_capacity(capacity)),
            ready: Condvar::new(),
        }
    }

    pub fn push(&self, event: DispatchEvent) {
        let mut queue = self.state.lock().unwrap();
        if queue.len() >= self.capacity {
            if let Some(pos) = queue.iter().position(|e| !e.is_modifier()) {
                queue.remove(pos);
                DISPATCH_DROPPED.fetch_add(1, Relaxed);
            }
            // Else every queued event is already a modifier; push past
            // capacity rather than corrupting ref-count bookkeeping.
        }
        queue.push_back(event);
        self.ready.notify_one();
    }

    /// Block up to `timeout` for the next event (§5: "dispatch pump
    /// suspends on dispatch queue receive with a timeout equal to the tick
    /// period").
    pub fn pop_timeout(&self, timeout: Duration) -> Option<DispatchEvent> {
        let mut queue = self.state.lock().unwrap();
        if queue.is_empty() {
            let (guard, _) = self.ready.wait_timeout(queue, timeout).unwrap();
            queue = guard;
        }
        queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
