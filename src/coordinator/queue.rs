//! Pending work items owned by the coordinator.
//!
//! Only the results of popping ever leave the coordinator; workers never see
//! the queue itself.

use crate::core::WorkItem;
use std::collections::VecDeque;

/// FIFO queue of work items for one run
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: VecDeque<WorkItem>,
    initial_len: usize,
    popped: usize,
}

impl WorkQueue {
    pub fn new(items: Vec<WorkItem>) -> Self {
        let initial_len = items.len();
        Self {
            items: items.into(),
            initial_len,
            popped: 0,
        }
    }

    /// Take the head item, or `None` once the queue is drained
    pub fn pop(&mut self) -> Option<WorkItem> {
        let item = self.items.pop_front()?;
        self.popped += 1;
        Some(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items the queue was created with
    pub fn initial_len(&self) -> usize {
        self.initial_len
    }

    /// Number of items handed out so far
    pub fn popped(&self) -> usize {
        self.popped
    }
}
