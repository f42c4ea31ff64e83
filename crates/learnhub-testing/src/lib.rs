//! Test utilities for Learnhub services.
//!
//! Import from `[dev-dependencies]` only; never in production code.

pub mod session;
