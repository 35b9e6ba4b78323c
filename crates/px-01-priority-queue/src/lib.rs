//! # PX-01 Priority Queue
//!
//! The finalization order oracle: a binary min-heap over 256-bit exit
//! priorities. Repeated `delete_min` calls yield priorities in
//! non-decreasing order, which is the property the whole exit pipeline
//! leans on.
//!
//! ## Access discipline
//!
//! The heap is an opaque structure with exactly three mutating-or-reading
//! operations (`insert`, `delete_min`, `peek_min`). It is constructed by
//! and held privately inside the exit processor; nothing else ever holds
//! a handle to it, so priority manipulation by arbitrary callers is ruled
//! out structurally rather than by a runtime owner check.
//!
//! ## Module Structure
//!
//! ```text
//! px-01-priority-queue/
//! ├── error.rs    # QueueError
//! └── heap.rs     # ExitQueue min-heap
//! ```

pub mod error;
pub mod heap;

pub use error::QueueError;
pub use heap::ExitQueue;
