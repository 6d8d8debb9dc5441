use std::sync::Arc;

use teloxide::prelude::*;

use crate::bot::{
    config::BotConfig, dispatcher::HandlerResult, history::UserKey, processor::view_balance,
};

use super::{constants::UNKNOWN_ERROR_MESSAGE, utils::send_bot_message};

// Same form as a balance snapshot, so this bot's own replies can be recovered later.
fn display_balance(user: &UserKey, balance: i64) -> String {
    format!("💰 {user} Your balance is: {balance}")
}

/* Balance command.
 * Displays the balance of a user in the group, the sender by default.
 */
pub async fn action_balance(
    bot: Bot,
    msg: Message,
    config: Arc<BotConfig>,
    user: Option<String>,
) -> HandlerResult {
    let chat_id = msg.chat.id.to_string();
    let sender = match msg.from() {
        Some(sender) => sender.clone(),
        None => return Ok(()),
    };

    let user = match user {
        Some(username) => UserKey::from_username(&username),
        None => UserKey::from_user(&sender),
    };

    match view_balance(&chat_id, &user) {
        Ok(Some(balance)) => {
            send_bot_message(
                &bot,
                &msg,
                display_balance(&user, balance),
                &config,
            )
            .await?;
            log::info!(
                "View Balance - User {} viewed the balance of {} in chat {}",
                sender.id,
                user,
                chat_id
            );
        }
        Ok(None) => {
            send_bot_message(
                &bot,
                &msg,
                format!("🤷 I have no balance recorded for {user} in this chat."),
                &config,
            )
            .await?;
        }
        Err(err) => {
            send_bot_message(&bot, &msg, UNKNOWN_ERROR_MESSAGE.to_string(), &config).await?;
            log::error!(
                "View Balance - User {} failed to view the balance of {} in chat {}: {}",
                sender.id,
                user,
                chat_id,
                err
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::patterns::{
        RecoveryPatterns, REWARD_PATTERN_DEFAULT, SLOT_PATTERN_DEFAULT, SNAPSHOT_PATTERN_DEFAULT,
    };

    #[test]
    fn test_display_balance_is_a_snapshot() {
        let patterns = RecoveryPatterns::new(
            REWARD_PATTERN_DEFAULT,
            SLOT_PATTERN_DEFAULT,
            SNAPSHOT_PATTERN_DEFAULT,
        )
        .unwrap();

        let reply = display_balance(&UserKey::from_username("Alice"), 250);
        assert_eq!(reply, "💰 @alice Your balance is: 250");
        assert_eq!(patterns.match_snapshot(&reply), Some(250));
        assert_eq!(patterns.match_reward(&reply), None);
    }
}
