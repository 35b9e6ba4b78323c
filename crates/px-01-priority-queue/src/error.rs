//! Error types for the exit priority queue.

use thiserror::Error;

/// All errors the queue can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// `delete_min` or `peek_min` on an empty heap.
    #[error("Priority queue is empty")]
    Empty,
}
