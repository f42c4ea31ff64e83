//! SeaORM entities for the marketplace database.

pub mod categories;
pub mod courses;
pub mod lectures;
pub mod orders;
pub mod reviews;
pub mod sections;
pub mod users;
