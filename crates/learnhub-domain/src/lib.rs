//! Domain types shared across Learnhub crates.
//!
//! This crate contains only pure types and rules with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; handlers only touch it for parsing.

pub mod course;
pub mod lecture;
pub mod order;
pub mod pagination;
pub mod review;
pub mod user;
