//! # Engine Module
//!
//! The stateful side of the search: configuration, candidate generation, resource guarding,
//! and result selection.
//!
//! - **Configuration** ([`config`]) - The immutable [`config::SearchConfig`] and its builder
//! - **Generation** ([`generation`]) - Alphabet reduction plus exhaustive and random permutation generation
//! - **Memory Guard** ([`memory`]) - Periodic resource-pressure probing for graceful early termination
//! - **Ranking** ([`ranking`]) - Goal filtering, outcome deduplication and two-key ordering
//! - **Progress Monitoring** ([`progress`]) - Progress events delivered to an optional callback
//! - **Error Handling** ([`error`]) - Engine-level error types

pub mod config;
pub mod error;
pub mod generation;
pub mod memory;
pub mod progress;
pub mod ranking;
