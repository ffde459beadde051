//! `SeaORM` Entity for per-user trading configuration.
//!
//! Consumed, never mutated, by the engine. `api_key` / `api_secret` are
//! stored sealed (see `shared::crypto`) and are opaque to the core.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "trading_settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    #[sea_orm(unique)]
    pub user_id: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub api_key: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub api_secret: Option<String>,
    pub symbol: String,
    pub investment_percentage: i32,
    pub leverage: i32,
    pub take_profit: i32,
    pub stop_loss: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub telegram_chat_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub webhook_url: Option<String>,
    pub created_at: Option<DateTimeUtc>,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
