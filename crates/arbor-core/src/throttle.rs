//! Per-marker admission throttle.
//!
//! A side table from marker id to the tick it was last admitted at. The
//! first sighting always admits; after that a marker waits at least the
//! configured interval between admissions. Stamps are transient and never
//! persisted.

use std::collections::{BTreeMap, BTreeSet};

use arbor_types::MarkerId;

/// Admission stamps for trigger markers.
#[derive(Debug, Clone)]
pub struct TriggerThrottle {
    interval: u64,
    last_admitted: BTreeMap<MarkerId, u64>,
}

impl TriggerThrottle {
    /// A throttle admitting each marker at most once per `interval` ticks.
    pub const fn new(interval: u64) -> Self {
        Self {
            interval,
            last_admitted: BTreeMap::new(),
        }
    }

    /// Decide whether `marker` runs at world time `now`, stamping it if so.
    ///
    /// A clock that went backwards reads as zero elapsed and is refused.
    pub fn admit(&mut self, marker: MarkerId, now: u64) -> bool {
        if let Some(last) = self.last_admitted.get(&marker)
            && now.saturating_sub(*last) < self.interval
        {
            return false;
        }
        self.last_admitted.insert(marker, now);
        true
    }

    /// Forget markers that are no longer alive.
    pub fn prune(&mut self, alive: &BTreeSet<MarkerId>) {
        self.last_admitted.retain(|id, _| alive.contains(id));
    }

    /// Number of markers with a stamp.
    pub fn tracked(&self) -> usize {
        self.last_admitted.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_first_then_waits_for_the_interval() {
        let mut throttle = TriggerThrottle::new(20);
        let marker = MarkerId::new();
        assert!(throttle.admit(marker, 100));
        assert!(!throttle.admit(marker, 115));
        assert!(throttle.admit(marker, 121));
        assert!(!throttle.admit(marker, 140));
        assert!(throttle.admit(marker, 141));
    }

    #[test]
    fn exactly_one_interval_later_is_admitted() {
        let mut throttle = TriggerThrottle::new(20);
        let marker = MarkerId::new();
        assert!(throttle.admit(marker, 0));
        assert!(throttle.admit(marker, 20));
    }

    #[test]
    fn markers_are_throttled_independently() {
        let mut throttle = TriggerThrottle::new(20);
        let a = MarkerId::new();
        let b = MarkerId::new();
        assert!(throttle.admit(a, 100));
        assert!(throttle.admit(b, 105));
        assert!(!throttle.admit(a, 110));
    }

    #[test]
    fn backwards_clock_is_refused() {
        let mut throttle = TriggerThrottle::new(20);
        let marker = MarkerId::new();
        assert!(throttle.admit(marker, 500));
        assert!(!throttle.admit(marker, 10));
    }

    #[test]
    fn prune_drops_dead_markers() {
        let mut throttle = TriggerThrottle::new(20);
        let alive = MarkerId::new();
        let dead = MarkerId::new();
        throttle.admit(alive, 0);
        throttle.admit(dead, 0);
        throttle.prune(&BTreeSet::from([alive]));
        assert_eq!(throttle.tracked(), 1);
        assert!(throttle.admit(dead, 1));
    }
}
