use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Raw inbound signals, one per strategy recommendation
        manager
            .create_table(
                Table::create()
                    .table(Signals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Signals::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(Signals::Ticker).string().not_null())
                    .col(ColumnDef::new(Signals::Side).string().not_null()) // "buy", "sell", "hold"
                    .col(ColumnDef::new(Signals::Timeframe).string().not_null())
                    .col(ColumnDef::new(Signals::Strategy).string().not_null())
                    .col(ColumnDef::new(Signals::Price).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(Signals::Processed).boolean().not_null().default(false))
                    .col(ColumnDef::new(Signals::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .index(
                        Index::create()
                            .name("idx_signals_ticker_created")
                            .table(Signals::Table)
                            .col(Signals::Ticker)
                            .col(Signals::CreatedAt)
                    )
                    .index(
                        Index::create()
                            .name("idx_signals_processed")
                            .table(Signals::Table)
                            .col(Signals::Processed)
                    )
                    .to_owned(),
            )
            .await?;

        // One row per detected consensus
        manager
            .create_table(
                Table::create()
                    .table(SignalGroups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SignalGroups::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(SignalGroups::Direction).string().not_null()) // "buy" or "sell"
                    .col(ColumnDef::new(SignalGroups::OperationId).big_unsigned().null()) // write-once, set when a position opens
                    .col(ColumnDef::new(SignalGroups::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_signal_groups_operation")
                            .from(SignalGroups::Table, SignalGroups::OperationId)
                            .to(Operations::Table, Operations::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                    )
                    .to_owned(),
            )
            .await?;

        // Exactly five membership rows per group
        manager
            .create_table(
                Table::create()
                    .table(SignalGroupSignals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SignalGroupSignals::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(SignalGroupSignals::SignalGroupId).big_unsigned().not_null())
                    .col(ColumnDef::new(SignalGroupSignals::SignalId).big_unsigned().not_null())
                    .index(
                        Index::create()
                            .name("idx_group_signal_unique")
                            .table(SignalGroupSignals::Table)
                            .col(SignalGroupSignals::SignalGroupId)
                            .col(SignalGroupSignals::SignalId)
                            .unique()
                    )
                    .index(
                        Index::create()
                            .name("idx_group_signals_signal")
                            .table(SignalGroupSignals::Table)
                            .col(SignalGroupSignals::SignalId)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_signals_group")
                            .from(SignalGroupSignals::Table, SignalGroupSignals::SignalGroupId)
                            .to(SignalGroups::Table, SignalGroups::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_signals_signal")
                            .from(SignalGroupSignals::Table, SignalGroupSignals::SignalId)
                            .to(Signals::Table, Signals::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SignalGroupSignals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SignalGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Signals::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Signals {
    Table,
    Id,
    Ticker,
    Side,
    Timeframe,
    Strategy,
    Price,
    Processed,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SignalGroups {
    Table,
    Id,
    Direction,
    OperationId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SignalGroupSignals {
    Table,
    Id,
    SignalGroupId,
    SignalId,
}

#[derive(DeriveIden)]
enum Operations {
    Table,
    Id,
}
