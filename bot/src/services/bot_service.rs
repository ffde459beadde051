//! Per-user bot state machine: start / stop / restart plus the two
//! transitions driven by the position lifecycle.
//!
//! Stopping never auto-closes an open operation; the monitor keeps
//! watching it and the close path still returns the bot to listening.

use chrono::Utc;
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use shared::entity::bots;
use shared::{BotPhase, Error};
use tracing::info;

pub async fn get_or_create(db: &DatabaseConnection, user_id: i64) -> Result<bots::Model, Error> {
    if let Some(bot) = bots::Entity::find()
        .filter(bots::Column::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(bot);
    }

    let bot = bots::ActiveModel {
        user_id: ActiveValue::Set(user_id),
        status: ActiveValue::Set(BotPhase::Idle.as_str().to_string()),
        confirming_count: ActiveValue::Set(0),
        created_at: ActiveValue::Set(Some(Utc::now())),
        updated_at: ActiveValue::Set(Some(Utc::now())),
        ..Default::default()
    };
    let id = bots::Entity::insert(bot).exec(db).await?.last_insert_id;
    bots::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("bot", user_id))
}

async fn set_phase(
    db: &DatabaseConnection,
    user_id: i64,
    phase: BotPhase,
) -> Result<bots::Model, Error> {
    let bot = get_or_create(db, user_id).await?;
    let mut update: bots::ActiveModel = bot.into();
    update.status = ActiveValue::Set(phase.as_str().to_string());
    update.updated_at = ActiveValue::Set(Some(Utc::now()));
    Ok(bots::Entity::update(update).exec(db).await?)
}

pub async fn start(db: &DatabaseConnection, user_id: i64) -> Result<bots::Model, Error> {
    let bot = set_phase(db, user_id, BotPhase::Listening).await?;
    info!("Bot started for user {user_id}");
    Ok(bot)
}

pub async fn stop(db: &DatabaseConnection, user_id: i64) -> Result<bots::Model, Error> {
    let bot = set_phase(db, user_id, BotPhase::Idle).await?;
    info!("Bot stopped for user {user_id}");
    Ok(bot)
}

pub async fn restart(db: &DatabaseConnection, user_id: i64) -> Result<bots::Model, Error> {
    stop(db, user_id).await?;
    start(db, user_id).await
}

/// Transition into operating, pointing at the freshly opened operation.
pub async fn mark_operating(
    db: &DatabaseConnection,
    user_id: i64,
    operation_id: u64,
) -> Result<bots::Model, Error> {
    let bot = get_or_create(db, user_id).await?;
    let mut update: bots::ActiveModel = bot.into();
    update.status = ActiveValue::Set(BotPhase::Operating.as_str().to_string());
    update.current_operation_id = ActiveValue::Set(Some(operation_id));
    update.updated_at = ActiveValue::Set(Some(Utc::now()));
    Ok(bots::Entity::update(update).exec(db).await?)
}

/// Clears the pointer and returns the bot to listening, but only while it
/// still points at the given operation. Returns whether it did.
pub async fn release_operation(
    db: &DatabaseConnection,
    user_id: i64,
    operation_id: u64,
) -> Result<bool, Error> {
    let bot = get_or_create(db, user_id).await?;
    if bot.current_operation_id != Some(operation_id) {
        return Ok(false);
    }

    let mut update: bots::ActiveModel = bot.into();
    update.status = ActiveValue::Set(BotPhase::Listening.as_str().to_string());
    update.current_operation_id = ActiveValue::Set(None);
    update.updated_at = ActiveValue::Set(Some(Utc::now()));
    bots::Entity::update(update).exec(db).await?;
    Ok(true)
}
