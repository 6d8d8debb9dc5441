use redis::{Commands, Connection, RedisResult};

/* History CRUD Operations
 * History is the log of messages the bot has seen in a chat.
 * Entries live in a sorted set scored by a per-chat sequence number,
 * so an entry keeps its position when older entries are trimmed away.
 * Each member is "{seq}:{entry}", the entry being a JSON encoded HistoricalMessage.
 * Has add, latest sequence, page, length, and delete operations.
 */

const HISTORY_KEY: &str = "history";
const HISTORY_SEQ_KEY: &str = "history_seq";

fn history_key(chat_id: &str) -> String {
    format!("{HISTORY_KEY}:{chat_id}")
}

fn history_seq_key(chat_id: &str) -> String {
    format!("{HISTORY_SEQ_KEY}:{chat_id}")
}

// Appends an entry, keeping only the newest `capacity` entries.
// Returns the sequence number given to the entry.
pub fn add_history_entry(
    con: &mut Connection,
    chat_id: &str,
    entry: &str,
    capacity: usize,
) -> RedisResult<u64> {
    let key = history_key(chat_id);
    let seq: u64 = con.incr(history_seq_key(chat_id), 1)?;
    let _: () = con.zadd(&key, format!("{seq}:{entry}"), seq)?;
    let _: () = con.zremrangebyrank(&key, 0, -(capacity as isize) - 1)?;
    Ok(seq)
}

// Gets the sequence number of the newest entry ever added, if any
pub fn get_latest_history_seq(con: &mut Connection, chat_id: &str) -> RedisResult<Option<u64>> {
    con.get(history_seq_key(chat_id))
}

// Gets the number of entries in a chat's history
#[allow(dead_code)]
pub fn get_history_length(con: &mut Connection, chat_id: &str) -> RedisResult<usize> {
    con.zcard(history_key(chat_id))
}

// Gets up to `count` entries with a sequence number of at most `max_seq`, newest first
pub fn get_history_page(
    con: &mut Connection,
    chat_id: &str,
    max_seq: u64,
    count: usize,
) -> RedisResult<Vec<(u64, String)>> {
    let members: Vec<String> =
        con.zrevrangebyscore_limit(history_key(chat_id), max_seq, "-inf", 0, count as isize)?;

    Ok(members
        .into_iter()
        .filter_map(|member| {
            let (seq, entry) = member.split_once(':')?;
            Some((seq.parse::<u64>().ok()?, entry.to_string()))
        })
        .collect())
}

// Deletes a chat's history and its sequence counter
// Mainly for testing purposes
#[allow(dead_code)]
pub fn delete_history(con: &mut Connection, chat_id: &str) -> RedisResult<()> {
    con.del(&[history_key(chat_id), history_seq_key(chat_id)])
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::redis::connect::connect;

    #[test]
    #[ignore = "requires a running Redis server"]
    fn test_add_history_entry_trims() {
        let mut con = connect().unwrap();
        let chat_id = "test_history_chat";
        delete_history(&mut con, chat_id).unwrap();

        for entry in ["one", "two", "three", "four"] {
            assert!(add_history_entry(&mut con, chat_id, entry, 3).is_ok());
        }

        assert_eq!(get_history_length(&mut con, chat_id).unwrap(), 3);
        assert_eq!(get_latest_history_seq(&mut con, chat_id).unwrap(), Some(4));
        assert_eq!(
            get_history_page(&mut con, chat_id, 4, 10).unwrap(),
            vec![
                (4, "four".to_string()),
                (3, "three".to_string()),
                (2, "two".to_string())
            ]
        );
        assert_eq!(
            get_history_page(&mut con, chat_id, 3, 1).unwrap(),
            vec![(3, "three".to_string())]
        );

        assert!(delete_history(&mut con, chat_id).is_ok());
    }

    #[test]
    #[ignore = "requires a running Redis server"]
    fn test_identical_entries_are_kept_apart() {
        let mut con = connect().unwrap();
        let chat_id = "test_history_duplicate_chat";
        delete_history(&mut con, chat_id).unwrap();

        add_history_entry(&mut con, chat_id, "same", 10).unwrap();
        add_history_entry(&mut con, chat_id, "same", 10).unwrap();

        assert_eq!(get_history_length(&mut con, chat_id).unwrap(), 2);
        assert_eq!(get_latest_history_seq(&mut con, "test_history_empty_chat").unwrap(), None);

        assert!(delete_history(&mut con, chat_id).is_ok());
    }
}
