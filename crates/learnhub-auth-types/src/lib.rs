//! Session types shared by the Learnhub HTTP surface.
//!
//! Provides session JWT issue/validation, cookie builders, and the `Session` extractor.

pub mod cookie;
pub mod identity;
pub mod token;
