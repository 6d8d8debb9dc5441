/* Constants used across handlers. */

pub const COMMAND_HELP: &str = "/help";
pub const COMMAND_RECOVER: &str = "/recover";
pub const COMMAND_BALANCE: &str = "/balance";

pub const RECOVER_USAGE_MESSAGE: &str = "Recover data from this chat's history.\n\n\
    /recover economy [accounts] [messages] [@bot]\n\n\
    accounts: number of accounts to recover, 100 by default. If the history does not hold enough data, I'll recover as many as I can.\n\
    messages: number of messages to read through, 1000 by default. The more messages, the longer this takes.\n\
    @bot: the bot who ran the slot machines. Defaults to me.";
// MarkdownV2, rendered in italics
pub const RECOVERING_MESSAGE: &str = "_Recovering economy data, please standby\\.\\.\\._";
pub const NOT_GROUP_MESSAGE: &str = "Recovery only works in group chats! 👥";
pub const NOT_AUTHORIZED_MESSAGE: &str =
    "Sorry, only the group's admins can recover data here! 🔒";
pub const UNKNOWN_ERROR_MESSAGE: &str =
    "❓ Hmm, something went wrong! Sorry, I can't do that right now, please try again later!";
