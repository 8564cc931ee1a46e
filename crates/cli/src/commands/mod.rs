//! Subcommand implementations.
//!
//! Commands write their output to a caller-supplied writer so they can be
//! tested without capturing stdout.

pub mod blog;
pub mod cart;
pub mod shipping;
