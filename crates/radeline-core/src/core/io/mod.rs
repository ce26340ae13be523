//! Printed representations of search results.
//!
//! A result line is the de facto interchange format with the input-script tooling:
//! `(<position>, <velocity>) [[<frames>, '<label>'], ...]`. The layout of brackets, quotes
//! and separators is load-bearing; [`result_line`] renders and parses it, and [`script`]
//! converts a parsed line into one-input-per-line script text.

pub mod result_line;
pub mod script;
