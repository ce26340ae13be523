//! # Workflows Module
//!
//! Top-level entry points that drive the full search pipeline.
//!
//! - **Search Workflow** ([`search`]) - Alphabet reduction, generation, simulation, filtering,
//!   deduplication and ranking, returning a [`search::SearchReport`].

pub mod search;
