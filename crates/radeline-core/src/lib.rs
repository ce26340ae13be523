//! # Radeline Core Library
//!
//! Offline search for Celeste input scripts: candidate input sequences are generated,
//! stepped frame-by-frame through a one-axis movement model, and the ones that land
//! in a goal region are deduplicated and ranked.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`InputSequence`, `SimulationResult`),
//!   the deterministic physics integrators, and the printed result-line format.
//!
//! - **[`engine`]: The Logic Core.** Configuration, permutation generation, the memory guard,
//!   and the filter/dedup/rank stage.
//!
//! - **[`workflows`]: The Public API.** The staged search pipeline that ties generation,
//!   simulation and ranking together into a single [`workflows::search::run`] call.

pub mod core;
pub mod engine;
pub mod workflows;
