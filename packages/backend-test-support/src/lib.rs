//! Shared test support for the blackjack backend.
//!
//! Currently this is just the unified logging initialization used by both
//! unit tests and integration test binaries.

pub mod logging;
