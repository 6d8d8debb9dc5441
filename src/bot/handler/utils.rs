use teloxide::{
    prelude::*,
    types::{Message, User},
};

use crate::bot::{
    config::BotConfig, dispatcher::BotError, history::HistoricalMessage,
    processor::record_message,
};

/* Common utilites for handlers. */

// Records a message in its chat's history log. Failures are logged, never raised.
pub fn record_message_history(msg: &Message, config: &BotConfig) {
    let history = match HistoricalMessage::from_telegram(msg) {
        Some(history) => history,
        None => return,
    };

    let chat_id = msg.chat.id.to_string();
    if let Err(err) = record_message(&chat_id, &history, config) {
        log::error!(
            "History - Failed to record message {} in chat {}: {}",
            msg.id.0,
            chat_id,
            err
        );
    }
}

// Sends a message to the chat of `msg`, and records it in the history log.
pub async fn send_bot_message(
    bot: &Bot,
    msg: &Message,
    text: String,
    config: &BotConfig,
) -> Result<Message, BotError> {
    let sent = bot.send_message(msg.chat.id, text).await?;
    record_message_history(&sent, config);
    Ok(sent)
}

// Checks that a message was sent in a group or supergroup.
pub fn is_group_chat(msg: &Message) -> bool {
    msg.chat.is_group() || msg.chat.is_supergroup()
}

// Checks that a user is a configured owner, or an owner or admin of the chat.
pub async fn is_recovery_admin(
    bot: &Bot,
    chat_id: ChatId,
    user: &User,
    config: &BotConfig,
) -> Result<bool, BotError> {
    if config.owner_ids.contains(&user.id) {
        return Ok(true);
    }

    let member = bot.get_chat_member(chat_id, user.id).await?;
    Ok(member.kind.is_privileged())
}
