//! # Plasma-Exit Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── helpers.rs       # Shared harness: clock, blocks, funds, processor
//! │
//! └── integration/     # Cross-crate flows
//!     ├── standard_exit_flow.rs
//!     ├── in_flight_exit_flow.rs
//!     └── processing.rs
//! ```
//!
//! Unlike the per-crate unit tests, the flows here run the whole stack:
//! transactions are really included in Merkle-rooted blocks and every
//! inclusion proof is a real sibling path checked by the production
//! verifier, not an accept-all stub.
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p px-tests
//!
//! # By category
//! cargo test -p px-tests integration::
//!
//! # Benchmarks
//! cargo bench -p px-tests
//! ```

#![allow(dead_code)]

pub mod helpers;

#[cfg(test)]
mod integration;
