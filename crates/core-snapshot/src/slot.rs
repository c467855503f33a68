//! Lock-protected double buffer for snapshot publication (§4.9, Open
//! Question 1): a `Mutex` guards a small `Arc` swap rather than lock-free
//! atomics, trading a constant-bounded lock hold for simplicity.

use std::sync::{Arc, Mutex};

pub struct SnapshotSlot<T> {
    current: Mutex<Arc<T>>,
}

impl<T> SnapshotSlot<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: Mutex::new(Arc::new(initial)),
        }
    }

    /// One `Arc` clone (refcount bump) per read; no copy of the snapshot
    /// body, no blocking wait beyond the mutex's own bounded hold time.
    pub fn read(&self) -> Arc<T> {
        self.current.lock().expect("snapshot slot poisoned").clone()
    }

    /// Install a freshly-built snapshot. Only the engine thread calls this.
    pub fn publish(&self, next: T) {
        *self.current.lock().expect("snapshot slot poisoned") = Arc::new(next);
    }
}
