//! FIFO event queue.
//!
//! The sole communication channel between engine components. Insertion
//! order is the only order: any temporal ordering must be established by
//! callers before pushing. Not a concurrent queue; `pop` never blocks.

use std::collections::VecDeque;
use tradesim_core::Event;

/// Ordered, mutable buffer of pending events.
#[derive(Debug, Default)]
pub struct EventQueue {
    queue: VecDeque<Event>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Append an event to the tail.
    pub fn push(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Remove and return the head, or `None` if the queue is empty.
    pub fn pop(&mut self) -> Option<Event> {
        self.queue.pop_front()
    }

    /// Whether the queue holds no events.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
