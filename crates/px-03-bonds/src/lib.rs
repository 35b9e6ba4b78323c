//! # PX-03 Bond Sizing
//!
//! Slow-moving economic parameters. A bond value can be nudged up or down
//! by at most a factor of two per proposal, and a proposal only takes
//! effect after a waiting period, so bond inflation can track gas and
//! asset price drift without being usable for griefing.
//!
//! One [`BondSize`] instance backs each economic knob of the framework:
//! the standard exit bond, the in-flight exit bond, the piggyback bond
//! and the process bounty.

pub mod bond;
pub mod error;

pub use bond::BondSize;
pub use error::BondError;
