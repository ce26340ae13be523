//! # Core Module
//!
//! Stateless building blocks shared by the engine and by consumers of search results.
//!
//! - **Models** ([`models`]) - Key symbols, run-length encoded input sequences, simulation results
//!   and the initial player state
//! - **Physics** ([`physics`]) - Fixed-timestep integrators for the horizontal and vertical axes
//! - **I/O** ([`io`]) - The printed result-line format and its conversion to input-script text

pub mod io;
pub mod models;
pub mod physics;
