//! Cross-crate flows, run against the full processor with real Merkle
//! inclusion proofs.

mod in_flight_exit_flow;
mod processing;
mod service_flow;
mod standard_exit_flow;
