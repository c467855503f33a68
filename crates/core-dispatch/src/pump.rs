//! Dispatch pump thread (§4.8, §5): the sole consumer of the
//! [`DispatchRing`], gating modifier forwarding through ref-counting and
//! driving `sink.tick` at a minimum rate so the sink can emit key-repeat.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use core_events::{DispatchEvent, DispatchKind, ModifierKey};

use crate::modifiers::ModifierRefCounts;
use crate::ring::DispatchRing;

/// Outbound dispatch sink (§6): `dispatch` posts one semantic command,
/// `tick` drives repeat/hold timing. A non-goal in this workspace — real
/// implementations inject synthetic input into the host OS — so only the
/// trait plus a logging stand-in live here.
pub trait DispatchSink: Send {
    fn dispatch(&mut self, event: &DispatchEvent);
    fn tick(&mut self, now_ticks: i64);
}

/// Stand-in sink that logs every call instead of touching the platform
/// (the real injection target is a non-goal, §1).
#[derive(Debug, Default)]
pub struct LoggingSink;

impl DispatchSink for LoggingSink {
    fn dispatch(&mut self, event: &DispatchEvent) {
        tracing::info!(target: "dispatch", kind = ?event.kind, ticks = event.timestamp_ticks, "dispatch");
    }

    fn tick(&mut self, now_ticks: i64) {
        tracing::trace!(target: "dispatch", now_ticks, "tick");
    }
}

#[derive(Clone)]
pub struct PumpShutdown {
    tx: crossbeam_channel::Sender<()>,
}

impl PumpShutdown {
    pub fn signal(&self) {
        let _ = self.tx.send(());
    }
}

/// A running pump plus the handles needed to stop it and to inspect its
/// modifier ref-count table (introspection added beyond the spec's minimum
/// so invariant 5, modifier balance, can be asserted directly in tests).
pub struct Pump {
    thread: Option<JoinHandle<()>>,
    shutdown: PumpShutdown,
    modifiers: Arc<Mutex<ModifierRefCounts>>,
}

impl Pump {
    pub fn modifier_snapshot(&self) -> HashMap<ModifierKey, u32> {
        self.modifiers.lock().unwrap().snapshot()
    }

    /// Signal shutdown and block until the pump thread has flushed held
    /// modifiers and exited.
    pub fn shutdown(mut self) {
        self.shutdown.signal();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Spawn the dedicated pump thread. `now_ticks` supplies each tick's
/// timestamp — injectable so tests can drive deterministic time rather than
/// reading the wall clock directly.
pub fn spawn_pump(
    ring: Arc<DispatchRing>,
    mut sink: Box<dyn DispatchSink>,
    tick_hz: u64,
    now_ticks: impl Fn() -> i64 + Send + 'static,
) -> Pump {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let period = Duration::from_millis((1000 / tick_hz.max(1)).max(1));
    let modifiers = Arc::new(Mutex::new(ModifierRefCounts::new()));
    let pump_modifiers = modifiers.clone();

    let thread = thread::spawn(move || {
        loop {
            if rx.try_recv().is_ok() {
                break;
            }
            if let Some(event) = ring.pop_timeout(period) {
                forward(&mut sink, &pump_modifiers, event);
            }
            sink.tick(now_ticks());
        }
        let held = pump_modifiers.lock().unwrap().flush_all();
        for key in held {
            sink.dispatch(&DispatchEvent::new(DispatchKind::ModifierUp(key), now_ticks()));
        }
    });

    Pump {
        thread: Some(thread),
        shutdown: PumpShutdown { tx },
        modifiers,
    }
}

fn forward(sink: &mut Box<dyn DispatchSink>, modifiers: &Arc<Mutex<ModifierRefCounts>>, event: DispatchEvent) {
    let should_forward = match &event.kind {
        DispatchKind::ModifierDown(key) => modifiers.lock().unwrap().on_down(*key),
        DispatchKind::ModifierUp(key) => modifiers.lock().unwrap().on_up(*key),
        _ => true,
    };
    if should_forward {
        sink.dispatch(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::SemanticAction;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[derive(Default)]
    struct RecordingSink {
        events: Arc<Mutex<Vec<DispatchEvent>>>,
    }

    impl DispatchSink for RecordingSink {
        fn dispatch(&mut self, event: &DispatchEvent) {
            self.events.lock().unwrap().push(event.clone());
        }

        fn tick(&mut self, _now_ticks: i64) {}
    }

    #[test]
    fn overlapping_modifier_downs_forward_only_the_first() {
        let ring = Arc::new(DispatchRing::new(16));
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingSink { events: events.clone() };
        let clock = Arc::new(AtomicI64::new(0));
        let pump_clock = clock.clone();

        let pump = spawn_pump(ring.clone(), Box::new(sink), 1000, move || pump_clock.load(Ordering::Relaxed));

        ring.push(DispatchEvent::new(DispatchKind::ModifierDown(ModifierKey::Shift), 0));
        ring.push(DispatchEvent::new(DispatchKind::ModifierDown(ModifierKey::Shift), 1));
        ring.push(DispatchEvent::new(DispatchKind::KeyTap(SemanticAction::Letter('a')), 2));

        std::thread::sleep(Duration::from_millis(50));
        let snapshot = pump.modifier_snapshot();
        assert_eq!(snapshot.get(&ModifierKey::Shift), Some(&2));

        pump.shutdown();

        let recorded = events.lock().unwrap();
        let modifier_downs = recorded
            .iter()
            .filter(|e| matches!(e.kind, DispatchKind::ModifierDown(ModifierKey::Shift)))
            .count();
        assert_eq!(modifier_downs, 1);
        let modifier_ups = recorded
            .iter()
            .filter(|e| matches!(e.kind, DispatchKind::ModifierUp(ModifierKey::Shift)))
            .count();
        assert_eq!(modifier_ups, 1, "shutdown must flush the still-held modifier");
    }
}
