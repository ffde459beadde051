//! `SeaORM` Entity for signal group membership.
//!
//! Membership rows also mark a signal as consumed by consensus: the
//! detector excludes signals that already belong to a group.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "signal_group_signals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    #[sea_orm(column_type = "BigUnsigned")]
    pub signal_group_id: u64,
    #[sea_orm(column_type = "BigUnsigned")]
    pub signal_id: u64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::signal_groups::Entity",
        from = "Column::SignalGroupId",
        to = "super::signal_groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    SignalGroups,
    #[sea_orm(
        belongs_to = "super::signals::Entity",
        from = "Column::SignalId",
        to = "super::signals::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Signals,
}

impl Related<super::signal_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SignalGroups.def()
    }
}

impl Related<super::signals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Signals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
