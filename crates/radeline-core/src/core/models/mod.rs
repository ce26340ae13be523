//! # Core Models Module
//!
//! Data structures describing what the search produces and consumes.
//!
//! - [`input`] - Key symbols, axes, input runs and run-length encoded sequences
//! - [`result`] - The outcome of simulating one input sequence
//! - [`state`] - The initial player state and Celeste Studio info parsing

pub mod input;
pub mod result;
pub mod state;
