//! The step loop never runs on its own. Something outside the player decides when time passes
//! and hands each `Tick` back to `Player::step`.

use std::collections::VecDeque;
use std::time::Duration;

/// One scheduled step. It only acts if nothing has started or stopped the loop since it was
/// scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    pub(crate) generation: u64,
}

impl Tick {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

pub trait Scheduler {
    /// Arrange for `tick` to reach `Player::step` once `delay` of real time passes.
    fn schedule(&mut self, delay: Duration, tick: Tick);

    /// Drop anything pending. A tick that still arrives later is ignored anyway.
    fn cancel_all(&mut self) {}
}

/// An in-process timer queue with its own clock. Tests move the clock by hand; the real-time
/// driver keeps it in step with the wall clock.
#[derive(Debug, Default)]
pub struct TickQueue {
    now: Duration,
    // Sorted by deadline
    pending: VecDeque<(Duration, Tick)>,
}

impl TickQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time since the queue was created, on its own clock
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.front().map(|(deadline, _)| *deadline)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The earliest tick due by `until`, moving the clock up to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<Tick> {
        match self.pending.front() {
            Some((deadline, _)) if *deadline <= until => {}
            _ => return None,
        }
        let (deadline, tick) = self.pending.pop_front()?;
        self.now = self.now.max(deadline);
        Some(tick)
    }

    /// The clock never goes backwards.
    pub fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }
}

impl Scheduler for TickQueue {
    fn schedule(&mut self, delay: Duration, tick: Tick) {
        let deadline = self.now + delay;
        // Ties fire in the order they were scheduled
        let idx = self.pending.partition_point(|(t, _)| *t <= deadline);
        self.pending.insert(idx, (deadline, tick));
    }

    fn cancel_all(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(generation: u64) -> Tick {
        Tick { generation }
    }

    #[test]
    fn fires_in_deadline_order() {
        let mut queue = TickQueue::new();
        queue.schedule(Duration::from_millis(200), tick(1));
        queue.schedule(Duration::from_millis(100), tick(2));
        queue.schedule(Duration::from_millis(100), tick(3));
        assert_eq!(queue.next_deadline(), Some(Duration::from_millis(100)));

        let until = Duration::from_millis(150);
        assert_eq!(queue.pop_due(until), Some(tick(2)));
        assert_eq!(queue.pop_due(until), Some(tick(3)));
        assert_eq!(queue.pop_due(until), None);
        assert_eq!(queue.now(), Duration::from_millis(100));

        queue.advance_to(until);
        assert_eq!(queue.now(), until);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn delays_are_relative_to_the_clock() {
        let mut queue = TickQueue::new();
        queue.advance_to(Duration::from_secs(5));
        queue.advance_to(Duration::from_secs(1));
        assert_eq!(queue.now(), Duration::from_secs(5));
        queue.schedule(Duration::from_millis(100), tick(1));
        assert_eq!(queue.next_deadline(), Some(Duration::from_millis(5100)));
        queue.cancel_all();
        assert!(queue.is_empty());
    }
}
