pub use sea_orm_migration::prelude::*;

mod m20261016_000001_create_users;
mod m20261016_000002_create_categories;
mod m20261016_000003_create_courses;
mod m20261016_000004_create_sections;
mod m20261016_000005_create_lectures;
mod m20261016_000006_create_orders;
mod m20261016_000007_create_reviews;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261016_000001_create_users::Migration),
            Box::new(m20261016_000002_create_categories::Migration),
            Box::new(m20261016_000003_create_courses::Migration),
            Box::new(m20261016_000004_create_sections::Migration),
            Box::new(m20261016_000005_create_lectures::Migration),
            Box::new(m20261016_000006_create_orders::Migration),
            Box::new(m20261016_000007_create_reviews::Migration),
        ]
    }
}
