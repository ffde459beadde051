//! `SeaORM` Entity for consensus signal groups.
//!
//! A group is a frozen snapshot of the five signals that triggered
//! consensus; `operation_id` is written at most once, when a position is
//! actually opened from the group.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "signal_groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    pub direction: String, // "buy" or "sell"
    #[sea_orm(column_type = "BigUnsigned", nullable)]
    pub operation_id: Option<u64>,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::signal_group_signals::Entity")]
    SignalGroupSignals,
    #[sea_orm(
        belongs_to = "super::operations::Entity",
        from = "Column::OperationId",
        to = "super::operations::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Operations,
}

impl Related<super::signal_group_signals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SignalGroupSignals.def()
    }
}

impl Related<super::operations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Operations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
