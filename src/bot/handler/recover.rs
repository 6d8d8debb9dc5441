use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{ChatAction, Me, MessageId, ParseMode},
    utils::command::{BotCommands, ParseError},
};

use crate::bot::{
    config::BotConfig,
    dispatcher::{Command, HandlerResult, RecoverArgs},
    history::UserKey,
    processor::{recover_economy, RecoverRequest, RecoverySummary},
};

use super::{
    constants::{
        COMMAND_RECOVER, NOT_AUTHORIZED_MESSAGE, NOT_GROUP_MESSAGE, RECOVERING_MESSAGE,
        RECOVER_USAGE_MESSAGE, UNKNOWN_ERROR_MESSAGE,
    },
    utils::{is_group_chat, is_recovery_admin, record_message_history, send_bot_message},
};

/* Utilities */

// Checks whether a message is a /recover command, addressed to any bot.
pub fn is_recover_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or_default();
    let name = command.split('@').next().unwrap_or_default();
    name.eq_ignore_ascii_case(COMMAND_RECOVER)
}

// Reply to a /recover command whose arguments could not be parsed.
// None when the command parses, or is addressed to another bot.
fn display_parse_error(text: &str, bot_name: &str) -> Option<String> {
    match Command::parse(text, bot_name) {
        Ok(_) | Err(ParseError::WrongBotName(_)) => None,
        Err(err) => Some(format!("❌ {err}\n\n{RECOVER_USAGE_MESSAGE}")),
    }
}

// Deleting the placeholder is best effort, the summary is sent regardless.
async fn delete_placeholder(bot: &Bot, chat_id: ChatId, placeholder_id: MessageId) {
    if let Err(err) = bot.delete_message(chat_id, placeholder_id).await {
        log::warn!(
            "Recover Economy - Failed to delete placeholder message {} in group {}: {}",
            placeholder_id.0,
            chat_id,
            err
        );
    }
}

fn display_summary(summary: &RecoverySummary) -> String {
    match &summary.oldest_date {
        Some(date) => {
            let flushed_info = if summary.flushed > 0 {
                format!(
                    " Another {} members were set from their payday credits alone.",
                    summary.flushed
                )
            } else {
                "".to_string()
            };
            format!(
                "Done. Set the balance of {} members. Data was recovered from messages dating back to {date}.{flushed_info}",
                summary.recovered
            )
        }
        None => format!(
            "Done. I read through {} messages but found no balances to recover.",
            summary.messages_scanned
        ),
    }
}

/* Recover command.
 * Rebuilds the economy of a group chat from its history log.
 * Only available to the chat's admins, in group chats.
 * A placeholder message is shown while the history is replayed, then replaced by a summary.
 */
pub async fn action_recover(
    bot: Bot,
    msg: Message,
    me: Me,
    config: Arc<BotConfig>,
    args: RecoverArgs,
) -> HandlerResult {
    let chat_id = msg.chat.id.to_string();
    let sender = match msg.from() {
        Some(sender) => sender.clone(),
        None => return Ok(()),
    };

    let (num_accounts, num_messages, reporter) = match args {
        RecoverArgs::Usage => {
            send_bot_message(&bot, &msg, RECOVER_USAGE_MESSAGE.to_string(), &config).await?;
            return Ok(());
        }
        RecoverArgs::Economy {
            num_accounts,
            num_messages,
            reporter,
        } => (num_accounts, num_messages, reporter),
    };

    if !is_group_chat(&msg) {
        send_bot_message(&bot, &msg, NOT_GROUP_MESSAGE.to_string(), &config).await?;
        log::info!(
            "Recover Economy - User {} tried to recover outside a group in chat {}",
            sender.id,
            chat_id
        );
        return Ok(());
    }

    if !is_recovery_admin(&bot, msg.chat.id, &sender, &config).await? {
        send_bot_message(&bot, &msg, NOT_AUTHORIZED_MESSAGE.to_string(), &config).await?;
        log::info!(
            "Recover Economy - User {} is not allowed to recover in group {}",
            sender.id,
            chat_id
        );
        return Ok(());
    }

    // Reporter defaults to this bot
    let reporter = match reporter {
        Some(username) => UserKey::from_username(&username),
        None => UserKey::from_user(&me.user),
    };
    let request = RecoverRequest {
        reporter,
        num_accounts,
        num_messages,
    };

    let placeholder = bot
        .send_message(msg.chat.id, RECOVERING_MESSAGE)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    record_message_history(&placeholder, &config);
    bot.send_chat_action(msg.chat.id, ChatAction::Typing).await?;

    log::info!(
        "Recover Economy - User {} started recovery in group {}: {:?}",
        sender.id,
        chat_id,
        request
    );

    let task_chat_id = chat_id.clone();
    let task_config = Arc::clone(&config);
    let task_request = request.clone();
    let summary = tokio::task::spawn_blocking(move || {
        recover_economy(&task_chat_id, &task_request, &task_config)
    })
    .await?;

    delete_placeholder(&bot, msg.chat.id, placeholder.id).await;

    match summary {
        Ok(summary) => {
            send_bot_message(&bot, &msg, display_summary(&summary), &config).await?;
            log::info!(
                "Recover Economy - Performed data recovery in group {} for user {}, and set the balance of {} members ({} from cumulative balances). Data was recovered from messages dating back to {}.",
                chat_id,
                sender.id,
                summary.recovered,
                summary.flushed,
                summary.oldest_date.as_deref().unwrap_or("nothing")
            );
        }
        Err(err) => {
            send_bot_message(&bot, &msg, UNKNOWN_ERROR_MESSAGE.to_string(), &config).await?;
            log::error!(
                "Recover Economy - User {} failed to recover economy for group {} with {:?}: {}",
                sender.id,
                chat_id,
                request,
                err
            );
        }
    }

    Ok(())
}

/* Invalid recover command.
 * Called when a /recover command has arguments that cannot be parsed.
 * Replies with what went wrong, and the usage.
 */
pub async fn action_recover_invalid(
    bot: Bot,
    msg: Message,
    me: Me,
    config: Arc<BotConfig>,
) -> HandlerResult {
    let text = match msg.text() {
        Some(text) => text,
        None => return Ok(()),
    };

    if let Some(reply) = display_parse_error(text, me.username()) {
        send_bot_message(&bot, &msg, reply, &config).await?;
        log::info!(
            "Recover Economy - Rejected invalid arguments in chat {}: {}",
            msg.chat.id,
            text
        );
    }

    Ok(())
}
