//! SMS protocol arithmetic.
//!
//! # Responsibilities
//! - Classify text as GSM 7-bit or UCS-2 (16-bit)
//! - Compute how many protocol segments a message occupies
//!
//! # Design Decisions
//! - Pure functions, no I/O; every caller gets the same answer
//! - Length is counted in Unicode code points, never bytes

pub mod segments;

pub use segments::{count_segments, is_gsm7, Encoding};
