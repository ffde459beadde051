//! `SeaORM` Entity for exchange positions.
//!
//! Entry fields are immutable after creation; exit price, close time and
//! both profit fields are set exactly when status transitions to
//! "closed", and never again.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "operations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    pub user_id: i64,
    pub symbol: String,
    pub direction: String, // "long" or "short"
    pub status: String,    // "pending", "open", "closed", "cancelled"
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub entry_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))", nullable)]
    pub exit_price: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub quantity: Decimal,
    pub leverage: i32,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub investment: Decimal,
    pub take_profit: i32, // percent, on leveraged P/L
    pub stop_loss: i32,   // percent, on leveraged P/L
    #[sea_orm(column_type = "Decimal(Some((20, 8)))", nullable)]
    pub profit_loss: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub profit_loss_percentage: Option<Decimal>,
    pub opened_at: Option<DateTimeUtc>,
    pub closed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::signal_groups::Entity")]
    SignalGroups,
}

impl Related<super::signal_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SignalGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
