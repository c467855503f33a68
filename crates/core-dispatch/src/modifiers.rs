//! Modifier ref-counting (§4.8): overlapping chords post overlapping
//! `ModifierDown`/`Up` pairs for the same key; the physical modifier must
//! transition only on the 0↔1 boundary.

use std::collections::HashMap;

use core_events::ModifierKey;

#[derive(Debug, Default)]
pub struct ModifierRefCounts {
    counts: HashMap<ModifierKey, u32>,
}

impl ModifierRefCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment `key`'s ref count; returns `true` on the 0→1 transition,
    /// the only time the sink should see a physical `ModifierDown`.
    pub fn on_down(&mut self, key: ModifierKey) -> bool {
        let count = self.counts.entry(key).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Decrement `key`'s ref count; returns `true` on the 1→0 transition.
    pub fn on_up(&mut self, key: ModifierKey) -> bool {
        let count = self.counts.entry(key).or_insert(0);
        if *count > 0 {
            *count -= 1;
        }
        *count == 0
    }

    /// Read-only snapshot for tests asserting modifier balance directly.
    pub fn snapshot(&self) -> HashMap<ModifierKey, u32> {
        self.counts.clone()
    }

    /// Reset every held modifier to zero and return the keys that were
    /// held, so a caller (the pump, at shutdown) can synthesize the
    /// matching `ModifierUp` events before releasing the sink.
    pub fn flush_all(&mut self) -> Vec<ModifierKey> {
        let held: Vec<ModifierKey> = self
            .counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(key, _)| *key)
            .collect();
        for key in &held {
            self.counts.insert(*key, 0);
        }
        held
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_zero_to_one_and_one_to_zero_edges_report_true() {
        let mut counts = ModifierRefCounts::new();
        assert!(counts.on_down(ModifierKey::Shift));
        assert!(!counts.on_down(ModifierKey::Shift));
        assert!(!counts.on_up(ModifierKey::Shift));
        assert!(counts.on_up(ModifierKey::Shift));
    }

    #[test]
    fn flush_all_reports_and_clears_held_modifiers() {
        let mut counts = ModifierRefCounts::new();
        counts.on_down(ModifierKey::Shift);
        counts.on_down(ModifierKey::Control);
        counts.on_up(ModifierKey::Control);

        let held = counts.flush_all();
        assert_eq!(held, vec![ModifierKey::Shift]);
        assert!(counts.flush_all().is_empty());
    }
}
