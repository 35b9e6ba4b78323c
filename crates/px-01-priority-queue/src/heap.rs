//! # Exit Priority Min-Heap
//!
//! Array-backed, 1-indexed binary min-heap over [`ExitPriority`] values.
//! Slot 0 of the backing array is a permanent sentinel so that parent and
//! child index arithmetic stays `i / 2`, `2 * i`, `2 * i + 1`.
//!
//! Invariants enforced:
//!
//! - Heap property: every parent compares `<=` both children; restored by
//!   `insert` (sift up) and `delete_min` (sift down) before returning.
//! - Drain ordering: repeated `delete_min` yields a non-decreasing
//!   sequence of priorities.
//! - Duplicates are permitted and processed independently; the heap is
//!   not a set.

use crate::error::QueueError;
use shared_types::ExitPriority;

/// Min-heap of exit priorities.
#[derive(Debug, Clone)]
pub struct ExitQueue {
    /// 1-indexed storage; `heap[0]` is unused.
    heap: Vec<ExitPriority>,
}

impl Default for ExitQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ExitQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            heap: vec![ExitPriority(primitive_types::U256::zero())],
        }
    }

    /// Number of queued priorities.
    pub fn len(&self) -> usize {
        self.heap.len() - 1
    }

    /// Whether the queue holds no priorities.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts a priority, restoring the heap property.
    pub fn insert(&mut self, priority: ExitPriority) {
        self.heap.push(priority);
        self.sift_up(self.len());
    }

    /// The smallest queued priority, without removing it.
    pub fn peek_min(&self) -> Result<ExitPriority, QueueError> {
        self.heap.get(1).copied().ok_or(QueueError::Empty)
    }

    /// Removes and returns the smallest queued priority.
    pub fn delete_min(&mut self) -> Result<ExitPriority, QueueError> {
        let min = self.peek_min()?;
        let last = self.len();
        self.heap.swap(1, last);
        self.heap.pop();
        if !self.is_empty() {
            self.sift_down(1);
        }
        Ok(min)
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 1 && self.heap[i / 2] > self.heap[i] {
            self.heap.swap(i / 2, i);
            i /= 2;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.len();
        loop {
            let left = 2 * i;
            let right = 2 * i + 1;
            let mut smallest = i;
            if left <= len && self.heap[left] < self.heap[smallest] {
                smallest = left;
            }
            if right <= len && self.heap[right] < self.heap[smallest] {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.heap.swap(i, smallest);
            i = smallest;
        }
    }
}
