//! Property-based fuzz testing library for the task market
//!
//! Scenarios drive a real `Market` with generated inputs and check the
//! ledger invariants after every call: escrow books match token balances,
//! task and dispute statuses only move along their state machines, and
//! nothing is paid out twice.
//!
//! # Usage
//!
//! ```bash
//! # Run all property-based tests
//! cargo test --release -p task-market-fuzz
//!
//! # Run the fuzz test runner
//! cargo run --release -p task-market-fuzz
//!
//! # Run with more iterations
//! PROPTEST_CASES=10000 cargo test --release -p task-market-fuzz
//! ```

pub mod arbitrary;
pub mod invariants;
pub mod scenarios;

pub use arbitrary::*;
pub use invariants::*;
pub use scenarios::*;

// Include fuzz targets as test modules
#[cfg(test)]
#[path = "../fuzz_targets/task_lifecycle.rs"]
mod task_lifecycle_tests;

#[cfg(test)]
#[path = "../fuzz_targets/escrow_conservation.rs"]
mod escrow_conservation_tests;

#[cfg(test)]
#[path = "../fuzz_targets/vote_dispute.rs"]
mod vote_dispute_tests;

#[cfg(test)]
#[path = "../fuzz_targets/resolve_dispute.rs"]
mod resolve_dispute_tests;
