//! Per-particle timers with explicit cancellation
//!
//! Timers are plain data keyed by particle and purpose. Removing a particle
//! cancels all of its entries, so nothing can fire against a released handle.

use drizzle_core::ParticleId;
use std::collections::HashMap;

/// What a timer does when it comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    /// Fade finished: remove the particle
    FadeComplete,
    /// Bounce effect finished: clear the effect flag
    BounceEnd,
}

/// At most one pending timer per (particle, kind)
#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: HashMap<(ParticleId, TimerKind), f64>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` for `id` at `due_ms`, replacing any earlier entry.
    ///
    /// Returns true if an existing timer was replaced.
    pub fn schedule(&mut self, id: ParticleId, kind: TimerKind, due_ms: f64) -> bool {
        self.timers.insert((id, kind), due_ms).is_some()
    }

    /// Cancel every timer owned by `id`; returns how many were pending
    pub fn cancel_all(&mut self, id: ParticleId) -> usize {
        let before = self.timers.len();
        self.timers.retain(|(owner, _), _| *owner != id);
        before - self.timers.len()
    }

    /// Remove and return every timer due at `now_ms`, earliest first
    pub fn take_due(&mut self, now_ms: f64) -> Vec<(ParticleId, TimerKind)> {
        let mut due: Vec<_> = self
            .timers
            .iter()
            .filter(|(_, at)| **at <= now_ms)
            .map(|(key, at)| (*at, *key))
            .collect();
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for (_, key) in &due {
            self.timers.remove(key);
        }
        due.into_iter().map(|(_, key)| key).collect()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_replaces() {
        let mut timers = TimerQueue::new();
        let id = ParticleId::from_raw(1);
        assert!(!timers.schedule(id, TimerKind::FadeComplete, 100.0));
        assert!(timers.schedule(id, TimerKind::FadeComplete, 300.0));
        assert_eq!(timers.len(), 1);
        assert!(timers.take_due(200.0).is_empty());
        assert_eq!(timers.take_due(300.0), vec![(id, TimerKind::FadeComplete)]);
    }

    #[test]
    fn test_take_due_orders_and_consumes() {
        let mut timers = TimerQueue::new();
        let a = ParticleId::from_raw(1);
        let b = ParticleId::from_raw(2);
        timers.schedule(b, TimerKind::FadeComplete, 50.0);
        timers.schedule(a, TimerKind::BounceEnd, 20.0);
        timers.schedule(a, TimerKind::FadeComplete, 500.0);

        let due = timers.take_due(100.0);
        assert_eq!(due, vec![(a, TimerKind::BounceEnd), (b, TimerKind::FadeComplete)]);
        assert!(timers.take_due(100.0).is_empty());
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_cancel_all() {
        let mut timers = TimerQueue::new();
        let a = ParticleId::from_raw(1);
        let b = ParticleId::from_raw(2);
        timers.schedule(a, TimerKind::BounceEnd, 20.0);
        timers.schedule(a, TimerKind::FadeComplete, 40.0);
        timers.schedule(b, TimerKind::FadeComplete, 40.0);

        assert_eq!(timers.cancel_all(a), 2);
        assert_eq!(timers.cancel_all(a), 0);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.take_due(40.0), vec![(b, TimerKind::FadeComplete)]);
    }
}
