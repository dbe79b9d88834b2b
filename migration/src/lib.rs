pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;
mod m20250301_000002_create_apps;
mod m20250301_000003_create_catalog;
mod m20250301_000004_create_budgets;
mod m20250301_000005_create_orders;
mod m20250301_000006_create_cart_items;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_apps::Migration),
            Box::new(m20250301_000003_create_catalog::Migration),
            Box::new(m20250301_000004_create_budgets::Migration),
            Box::new(m20250301_000005_create_orders::Migration),
            Box::new(m20250301_000006_create_cart_items::Migration),
        ]
    }
}
