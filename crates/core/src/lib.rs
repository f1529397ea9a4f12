//! Split-lease scheduling and pricing engine.
//!
//! Pure functions over plain data: weekly night patterns, wraparound-aware
//! contiguity, check-in/check-out resolution, move-in and schedule
//! validation, and tiered nightly pricing. No I/O and no clock access;
//! callers pass listing configuration and the reference date in.

pub mod availability;
pub mod booking;
pub mod check_in;
pub mod config;
pub mod contiguity;
pub mod error;
pub mod listing_adapter;
pub mod move_in;
pub mod pricing;
pub mod schedule;
pub mod types;
pub mod weekly_pattern;
