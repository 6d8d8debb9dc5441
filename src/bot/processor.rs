use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::{
    config::BotConfig,
    history::{HistoricalMessage, UserKey},
    reconciler::{LogEvents, Reconciler, ResolutionResult},
    redis::{fetch_history, record_history, retrieve_balance, CrudError, RedisLedger},
};

/* Processor is the overall logic center of the bot.
 * It handles the main logic, communicating with the front-facing handler
 * and the back-facing redis manager.
 * It defines and executes the main functions required of the bot,
 * and handles exceptions and errors in the back.
 */

#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    #[error("{0}")]
    CrudError(CrudError),
}

// Implement the From trait to convert from CrudError to ProcessError
impl From<CrudError> for ProcessError {
    fn from(crud_error: CrudError) -> ProcessError {
        ProcessError::CrudError(crud_error)
    }
}

// Parameters of an economy recovery, with the reporter already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoverRequest {
    pub reporter: UserKey,
    pub num_accounts: usize,
    pub num_messages: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecoverySummary {
    pub recovered: usize,
    pub flushed: usize,
    pub messages_scanned: usize,
    // Date of the oldest message used, in the configured time zone
    pub oldest_date: Option<String>,
}

impl RecoverySummary {
    fn from_result(result: &ResolutionResult, time_zone: &Tz) -> RecoverySummary {
        RecoverySummary {
            recovered: result.recovered_count(),
            flushed: result.flushed_count(),
            messages_scanned: result.messages_scanned,
            oldest_date: result
                .oldest_timestamp
                .map(|timestamp| format_date(timestamp, time_zone)),
        }
    }
}

/* Utility functions */
fn format_date(timestamp: DateTime<Utc>, time_zone: &Tz) -> String {
    timestamp
        .with_timezone(time_zone)
        .format("%Y-%m-%d")
        .to_string()
}

/* Records a message into the history log of a chat.
 * Execution flow: Append to history, trimmed to the configured capacity.
 */
pub fn record_message(
    chat_id: &str,
    message: &HistoricalMessage,
    config: &BotConfig,
) -> Result<(), ProcessError> {
    record_history(chat_id, message, config.history_capacity)?;
    Ok(())
}

/* Recovers the economy of a group chat from its history log.
 * Execution flow: Open history and ledger, replay history newest first,
 * set every recovered balance, summarise.
 * Balances set before a failure are kept.
 */
pub fn recover_economy(
    chat_id: &str,
    request: &RecoverRequest,
    config: &BotConfig,
) -> Result<RecoverySummary, ProcessError> {
    let history = fetch_history(chat_id, request.num_messages)?;
    let mut ledger = RedisLedger::open(chat_id)?;

    let reconciler = Reconciler::new(request.reporter.clone(), config.patterns.clone())
        .max_accounts(request.num_accounts)
        .max_messages(request.num_messages)
        .accumulate(config.accumulate);
    let result = reconciler.run(history, &mut ledger, &mut LogEvents)?;

    Ok(RecoverySummary::from_result(&result, &config.time_zone))
}

/* Views the balance of a user in a group chat.
 */
pub fn view_balance(chat_id: &str, user: &UserKey) -> Result<Option<i64>, ProcessError> {
    let balance = retrieve_balance(chat_id, user)?;
    Ok(balance)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::bot::reconciler::{Resolution, ResolvedBalance};

    #[test]
    fn test_format_date_uses_time_zone() {
        let timestamp = Utc.with_ymd_and_hms(2018, 3, 1, 20, 30, 0).unwrap();
        assert_eq!(format_date(timestamp, &Tz::UTC), "2018-03-01");
        assert_eq!(format_date(timestamp, &Tz::Asia__Singapore), "2018-03-02");
    }

    #[test]
    fn test_summary_from_result() {
        let result = ResolutionResult {
            balances: vec![
                ResolvedBalance {
                    user: UserKey::from_username("alice"),
                    balance: 60,
                    resolution: Resolution::Snapshot,
                },
                ResolvedBalance {
                    user: UserKey::from_username("bob"),
                    balance: 5,
                    resolution: Resolution::Flushed,
                },
            ],
            messages_scanned: 12,
            oldest_timestamp: Some(Utc.with_ymd_and_hms(2018, 3, 1, 12, 0, 0).unwrap()),
        };

        assert_eq!(
            RecoverySummary::from_result(&result, &Tz::UTC),
            RecoverySummary {
                recovered: 1,
                flushed: 1,
                messages_scanned: 12,
                oldest_date: Some("2018-03-01".to_string()),
            }
        );
    }

    #[test]
    fn test_summary_without_data() {
        let summary = RecoverySummary::from_result(&ResolutionResult::default(), &Tz::UTC);
        assert_eq!(summary.recovered, 0);
        assert_eq!(summary.oldest_date, None);
    }
}
