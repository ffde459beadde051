//! `SeaORM` Entity for per-user automation state.
//!
//! `current_operation_id` is non-null exactly while status = "operating";
//! at most one open operation is ever reachable through it.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "bots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub status: String, // "idle", "listening", "confirming", "operating"
    pub confirming_count: i32,
    #[sea_orm(column_type = "BigUnsigned", nullable)]
    pub current_operation_id: Option<u64>,
    pub created_at: Option<DateTimeUtc>,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::operations::Entity",
        from = "Column::CurrentOperationId",
        to = "super::operations::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Operations,
}

impl Related<super::operations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Operations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
