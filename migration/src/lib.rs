pub use sea_orm_migration::prelude::*;

mod m20260801_000001_create_trading_settings;
mod m20260801_000002_create_operations_and_bots;
mod m20260801_000003_create_signals_and_groups;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_trading_settings::Migration),
            Box::new(m20260801_000002_create_operations_and_bots::Migration),
            Box::new(m20260801_000003_create_signals_and_groups::Migration),
        ]
    }
}
