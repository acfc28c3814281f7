//! The simulator's priority queue: events pop in non-decreasing
//! `event_time` order, ties broken FIFO by insertion sequence.

use std::cmp::Reverse;

use priority_queue::PriorityQueue;

use crate::event::SimEvent;

/// `PriorityQueue` is keyed on the item itself (it's backed by an
/// index map), so two structurally-identical events pushed back to back
/// would collide and merge into one entry. Tagging each push with a
/// monotonic sequence number keeps every entry distinct and doubles as
/// the FIFO tie-break key.
pub struct EventQueue {
    queue: PriorityQueue<(SimEvent, u64), Reverse<(i64, u64)>>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            queue: PriorityQueue::new(),
            next_sequence: 0,
        }
    }

    pub fn push(&mut self, event: SimEvent) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let priority = Reverse((event.event_time(), sequence));
        self.queue.push((event, sequence), priority);
    }

    pub fn push_all(&mut self, events: impl IntoIterator<Item = SimEvent>) {
        for event in events {
            self.push(event);
        }
    }

    /// Pops the event with the smallest `(event_time, sequence)` — i.e.
    /// the earliest-due event, ties broken by insertion order.
    pub fn pop_min(&mut self) -> Option<SimEvent> {
        self.queue.pop().map(|((event, _sequence), _priority)| event)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
