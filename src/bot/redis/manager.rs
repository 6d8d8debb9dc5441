use std::vec;

use redis::{Connection, RedisError};

use super::{
    balance::{get_balance, get_balance_exists, set_balance},
    connect::{connect, DBError},
    history::{add_history_entry, get_history_page, get_latest_history_seq},
};
use crate::bot::{
    history::{HistoricalMessage, UserKey},
    reconciler::Ledger,
};

#[derive(thiserror::Error, Debug)]
pub enum CrudError {
    #[error("Redis operation error: {0}")]
    RedisError(RedisError),
    #[error("Redis database error: {0}")]
    DBError(DBError),
    #[error("History entry serialization error: {0}")]
    SerializationError(serde_json::Error),
}

// Implement the From trait to convert from RedisError to CrudError
impl From<RedisError> for CrudError {
    fn from(redis_error: RedisError) -> CrudError {
        CrudError::RedisError(redis_error)
    }
}

// Implement the From trait to convert from DBError to CrudError
impl From<DBError> for CrudError {
    fn from(db_error: DBError) -> CrudError {
        CrudError::DBError(db_error)
    }
}

// Implement the From trait to convert from serde_json::Error to CrudError
impl From<serde_json::Error> for CrudError {
    fn from(json_error: serde_json::Error) -> CrudError {
        CrudError::SerializationError(json_error)
    }
}

/* Redis Manager
 * Manager represents a module that manages all database operations.
 * No external package should call any of the database operations directly,
 * only through the manager.
 * The manager then exposes APIs for the main package to call.
 */

const HISTORY_PAGE_SIZE: usize = 100;

/* Records a message in the history log of a chat.
 * Called for every message the bot sees or sends.
 */
pub fn record_history(
    chat_id: &str,
    message: &HistoricalMessage,
    capacity: usize,
) -> Result<(), CrudError> {
    let mut con = connect()?;

    let entry = serde_json::to_string(message)?;
    add_history_entry(&mut con, chat_id, &entry, capacity)?;

    Ok(())
}

/* Opens the history log of a chat for reading, newest message first.
 * At most `limit` entries are read. Entries are fetched a page at a time,
 * and only when the previous page has been consumed.
 */
pub fn fetch_history(chat_id: &str, limit: usize) -> Result<HistoryCursor, CrudError> {
    let mut con = connect()?;

    // Only entries up to the newest one at the start of the scan are read.
    // Sequence numbers do not shift when the log is trimmed.
    let latest = get_latest_history_seq(&mut con, chat_id)?;

    Ok(HistoryCursor {
        con,
        chat_id: chat_id.to_string(),
        max_seq: if limit == 0 { None } else { latest },
        remaining: limit,
        page: Vec::new().into_iter(),
    })
}

/* Retrieves the balance of a user in a chat, if one has been set.
 */
pub fn retrieve_balance(chat_id: &str, user: &UserKey) -> Result<Option<i64>, CrudError> {
    let mut con = connect()?;

    if !get_balance_exists(&mut con, chat_id, user.as_str())? {
        return Ok(None);
    }
    let balance = get_balance(&mut con, chat_id, user.as_str())?;
    Ok(Some(balance))
}

pub struct HistoryCursor {
    con: Connection,
    chat_id: String,
    // Newest sequence number not yet fetched, None once exhausted
    max_seq: Option<u64>,
    remaining: usize,
    page: vec::IntoIter<String>,
}

impl HistoryCursor {
    fn fetch_page(&mut self, max_seq: u64) -> Result<(), CrudError> {
        let count = HISTORY_PAGE_SIZE.min(self.remaining);
        let page = get_history_page(&mut self.con, &self.chat_id, max_seq, count)?;

        self.remaining -= page.len();
        self.max_seq = match page.last() {
            Some((oldest, _)) if page.len() == count && self.remaining > 0 => oldest.checked_sub(1),
            _ => None,
        };
        self.page = page
            .into_iter()
            .map(|(_, entry)| entry)
            .collect::<Vec<_>>()
            .into_iter();
        Ok(())
    }
}

impl Iterator for HistoryCursor {
    type Item = Result<HistoricalMessage, CrudError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.page.next() {
                match serde_json::from_str(&entry) {
                    Ok(message) => return Some(Ok(message)),
                    Err(err) => {
                        log::warn!(
                            "History - Skipped unreadable entry in chat {}: {}",
                            self.chat_id,
                            err
                        );
                        continue;
                    }
                }
            }

            let max_seq = self.max_seq?;
            if let Err(err) = self.fetch_page(max_seq) {
                self.max_seq = None;
                return Some(Err(err));
            }
        }
    }
}

/* Ledger of a single chat, backed by Redis balances.
 */
pub struct RedisLedger {
    con: Connection,
    chat_id: String,
}

impl RedisLedger {
    pub fn open(chat_id: &str) -> Result<RedisLedger, CrudError> {
        Ok(RedisLedger {
            con: connect()?,
            chat_id: chat_id.to_string(),
        })
    }
}

impl Ledger for RedisLedger {
    type Error = CrudError;

    fn set_balance(&mut self, user: &UserKey, balance: i64) -> Result<(), CrudError> {
        set_balance(&mut self.con, &self.chat_id, user.as_str(), balance)?;
        Ok(())
    }
}
