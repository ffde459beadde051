use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One exchange position per row, open or closed
        manager
            .create_table(
                Table::create()
                    .table(Operations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Operations::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(Operations::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Operations::Symbol).string().not_null())
                    .col(ColumnDef::new(Operations::Direction).string().not_null()) // "long" or "short"
                    .col(ColumnDef::new(Operations::Status).string().not_null().default("open")) // "pending", "open", "closed", "cancelled"
                    .col(ColumnDef::new(Operations::EntryPrice).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(Operations::ExitPrice).decimal_len(20, 8).null()) // set on close only
                    .col(ColumnDef::new(Operations::Quantity).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(Operations::Leverage).integer().not_null())
                    .col(ColumnDef::new(Operations::Investment).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(Operations::TakeProfit).integer().not_null())
                    .col(ColumnDef::new(Operations::StopLoss).integer().not_null())
                    .col(ColumnDef::new(Operations::ProfitLoss).decimal_len(20, 8).null())
                    .col(ColumnDef::new(Operations::ProfitLossPercentage).decimal_len(10, 2).null())
                    .col(ColumnDef::new(Operations::OpenedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(Operations::ClosedAt).timestamp().null())
                    .index(
                        Index::create()
                            .name("idx_operations_user_status")
                            .table(Operations::Table)
                            .col(Operations::UserId)
                            .col(Operations::Status)
                    )
                    .index(
                        Index::create()
                            .name("idx_operations_status")
                            .table(Operations::Table)
                            .col(Operations::Status)
                    )
                    .to_owned(),
            )
            .await?;

        // Per-user automation state
        manager
            .create_table(
                Table::create()
                    .table(Bots::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bots::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(Bots::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Bots::Status).string().not_null().default("idle")) // "idle", "listening", "confirming", "operating"
                    .col(ColumnDef::new(Bots::ConfirmingCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Bots::CurrentOperationId).big_unsigned().null())
                    .col(ColumnDef::new(Bots::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(Bots::UpdatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP")))
                    .index(
                        Index::create()
                            .name("idx_bots_user")
                            .table(Bots::Table)
                            .col(Bots::UserId)
                            .unique()
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bots_current_operation")
                            .from(Bots::Table, Bots::CurrentOperationId)
                            .to(Operations::Table, Operations::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Operations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Operations {
    Table,
    Id,
    UserId,
    Symbol,
    Direction,
    Status,
    EntryPrice,
    ExitPrice,
    Quantity,
    Leverage,
    Investment,
    TakeProfit,
    StopLoss,
    ProfitLoss,
    ProfitLossPercentage,
    OpenedAt,
    ClosedAt,
}

#[derive(DeriveIden)]
enum Bots {
    Table,
    Id,
    UserId,
    Status,
    ConfirmingCount,
    CurrentOperationId,
    CreatedAt,
    UpdatedAt,
}
