use std::sync::Arc;

use teloxide::{prelude::*, utils::command::BotCommands};

use crate::bot::{
    config::BotConfig,
    dispatcher::{Command, HandlerResult},
};

use super::{
    constants::{COMMAND_BALANCE, COMMAND_HELP, COMMAND_RECOVER},
    utils::send_bot_message,
};

/* Invalid state.
 * This action is invoked when there is a non-command message addressed to the bot.
 * The message has already been recorded, so there is nothing else to do.
 */
pub async fn invalid_state(_bot: Bot, _msg: Message) -> HandlerResult {
    Ok(())
}

/* Start command.
 * Displays a welcome message to the user.
 */
pub async fn action_start(bot: Bot, msg: Message, config: Arc<BotConfig>) -> HandlerResult {
    let introduction = "👋 Hello! I'm CreditScribe! 😊\n\n📜 I keep a log of this group's messages, so if your economy ever loses its balances, I can read back through the slot machine and payday replies and rebuild them!";
    let recover_info = format!("🛠 Admins can run {COMMAND_RECOVER} economy to rebuild balances, and anyone can check their {COMMAND_BALANCE} afterwards.");
    let closing = format!("🤗 Ask me for {COMMAND_HELP} anytime!");

    send_bot_message(
        &bot,
        &msg,
        format!("{introduction}\n\n{recover_info}\n\n{closing}"),
        &config,
    )
    .await?;
    Ok(())
}

/* Help command.
 * Displays a list of commands available to the user.
 */
pub async fn action_help(bot: Bot, msg: Message, config: Arc<BotConfig>) -> HandlerResult {
    let commands = Command::descriptions().to_string();

    send_bot_message(
        &bot,
        &msg,
        format!("⭐️ My Commands ⭐️\n\n{commands}"),
        &config,
    )
    .await?;
    Ok(())
}
