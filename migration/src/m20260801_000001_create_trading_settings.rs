use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TradingSettings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TradingSettings::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(TradingSettings::UserId).big_integer().not_null())
                    .col(ColumnDef::new(TradingSettings::ApiKey).text().null()) // sealed, opaque to the engine
                    .col(ColumnDef::new(TradingSettings::ApiSecret).text().null()) // sealed, opaque to the engine
                    .col(ColumnDef::new(TradingSettings::Symbol).string().not_null().default("BTCUSDT"))
                    .col(ColumnDef::new(TradingSettings::InvestmentPercentage).integer().not_null().default(100))
                    .col(ColumnDef::new(TradingSettings::Leverage).integer().not_null().default(25))
                    .col(ColumnDef::new(TradingSettings::TakeProfit).integer().not_null().default(25))
                    .col(ColumnDef::new(TradingSettings::StopLoss).integer().not_null().default(25))
                    .col(ColumnDef::new(TradingSettings::TelegramChatId).text().null())
                    .col(ColumnDef::new(TradingSettings::WebhookUrl).text().null())
                    .col(ColumnDef::new(TradingSettings::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(TradingSettings::UpdatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP")))
                    .index(
                        Index::create()
                            .name("idx_trading_settings_user")
                            .table(TradingSettings::Table)
                            .col(TradingSettings::UserId)
                            .unique()
                    )
                    .index(
                        Index::create()
                            .name("idx_trading_settings_symbol")
                            .table(TradingSettings::Table)
                            .col(TradingSettings::Symbol)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TradingSettings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TradingSettings {
    Table,
    Id,
    UserId,
    ApiKey,
    ApiSecret,
    Symbol,
    InvestmentPercentage,
    Leverage,
    TakeProfit,
    StopLoss,
    TelegramChatId,
    WebhookUrl,
    CreatedAt,
    UpdatedAt,
}
