//! `SeaORM` Entity for inbound strategy signals.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "signals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    pub ticker: String,
    pub side: String, // "buy", "sell", "hold"
    pub timeframe: String,
    pub strategy: String,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub price: Decimal,
    pub processed: bool, // one-way flag, flipped exactly once by ingestion
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::signal_group_signals::Entity")]
    SignalGroupSignals,
}

impl Related<super::signal_group_signals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SignalGroupSignals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
