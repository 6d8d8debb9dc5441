use std::sync::Arc;

use teloxide::{
    prelude::*,
    utils::command::{BotCommands, ParseError},
    RequestError,
};

use super::{
    config::BotConfig,
    handler::{
        action_balance, action_help, action_recover, action_recover_invalid, action_start,
        invalid_state, is_recover_command, record_message_history,
    },
    processor::ProcessError,
    reconciler::{NUM_ACCOUNTS_DEFAULT, NUM_MESSAGES_DEFAULT},
};

/* Dispatcher routes every update to its handler.
 * All messages pass through the history recorder first,
 * then commands are matched. A /recover command with bad arguments
 * gets an error reply, and anything else is ignored.
 */

/* Types */
pub type HandlerResult = Result<(), BotError>;

#[derive(thiserror::Error, Debug)]
pub enum BotError {
    #[error("Process error: {0}")]
    ProcessError(ProcessError),
    #[error("Request error: {0}")]
    RequestError(RequestError),
    #[error("Task error: {0}")]
    TaskError(tokio::task::JoinError),
}

impl From<RequestError> for BotError {
    fn from(request_error: RequestError) -> BotError {
        BotError::RequestError(request_error)
    }
}

impl From<ProcessError> for BotError {
    fn from(process_error: ProcessError) -> BotError {
        BotError::ProcessError(process_error)
    }
}

impl From<tokio::task::JoinError> for BotError {
    fn from(join_error: tokio::task::JoinError) -> BotError {
        BotError::TaskError(join_error)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RecoverArgs {
    // No subcommand given, show usage
    Usage,
    Economy {
        num_accounts: usize,
        num_messages: usize,
        reporter: Option<String>,
    },
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "Show this help message.")]
    Help,
    #[command(description = "Start the bot.")]
    Start,
    #[command(
        description = "Recover economy data from this chat: /recover economy [accounts] [messages] [@bot]",
        parse_with = parse_recover_args
    )]
    Recover(RecoverArgs),
    #[command(
        description = "View a balance: /balance [@user]",
        parse_with = parse_balance_args
    )]
    Balance(Option<String>),
}

/* Command argument parsers */

fn incorrect_format(message: String) -> ParseError {
    ParseError::IncorrectFormat(message.into())
}

// Parses "economy [num_accounts] [num_messages] [@reporter]".
fn parse_recover_args(input: String) -> Result<(RecoverArgs,), ParseError> {
    let mut args = input.split_whitespace();
    match args.next() {
        None => return Ok((RecoverArgs::Usage,)),
        Some(subcommand) if subcommand.eq_ignore_ascii_case("economy") => (),
        Some(subcommand) => {
            return Err(incorrect_format(format!(
                "Unknown recovery target: {subcommand}"
            )))
        }
    }

    let mut num_accounts = NUM_ACCOUNTS_DEFAULT;
    let mut num_messages = NUM_MESSAGES_DEFAULT;
    let mut reporter = None;
    let mut numbers = 0;

    for arg in args {
        if reporter.is_some() {
            return Err(incorrect_format(format!("Unexpected argument: {arg}")));
        }
        if arg.starts_with('@') {
            reporter = Some(arg.to_string());
            continue;
        }

        let number = arg
            .parse::<usize>()
            .map_err(|_| incorrect_format(format!("Not a number: {arg}")))?;
        match numbers {
            0 => num_accounts = number,
            1 => num_messages = number,
            _ => return Err(incorrect_format(format!("Unexpected argument: {arg}"))),
        }
        numbers += 1;
    }

    Ok((RecoverArgs::Economy {
        num_accounts,
        num_messages,
        reporter,
    },))
}

// Parses an optional "@username".
fn parse_balance_args(input: String) -> Result<(Option<String>,), ParseError> {
    let mut args = input.split_whitespace();
    let user = args.next().map(|arg| arg.to_string());
    if let Some(arg) = args.next() {
        return Err(incorrect_format(format!("Unexpected argument: {arg}")));
    }
    Ok((user,))
}

/* Main Dispatch function */
pub async fn run_dispatcher(bot: Bot, config: BotConfig) {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(action_start))
        .branch(case![Command::Help].endpoint(action_help))
        .branch(case![Command::Recover(args)].endpoint(action_recover))
        .branch(case![Command::Balance(user)].endpoint(action_balance));

    let message_handler = Update::filter_message()
        .inspect(|msg: Message, config: Arc<BotConfig>| record_message_history(&msg, &config))
        .branch(command_handler)
        .branch(
            dptree::filter(|msg: Message| msg.text().map(is_recover_command).unwrap_or(false))
                .endpoint(action_recover_invalid),
        )
        .branch(dptree::endpoint(invalid_state));

    Dispatcher::builder(bot, message_handler)
        .dependencies(dptree::deps![Arc::new(config)])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
