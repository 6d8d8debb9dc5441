use redis::{Commands, Connection, RedisResult};

/* Balance CRUD Operations
 * Balance represents the credits a user holds in a group chat.
 * Has get, set, exists, and delete operations.
 */

const BALANCE_KEY: &str = "balance";

// Adds or overwrites a balance in Redis
pub fn set_balance(
    con: &mut Connection,
    chat_id: &str,
    user_id: &str,
    balance: i64,
) -> RedisResult<()> {
    con.set(format!("{BALANCE_KEY}:{chat_id}:{user_id}"), balance)
}

// Checks if balance exists
pub fn get_balance_exists(con: &mut Connection, chat_id: &str, user_id: &str) -> RedisResult<bool> {
    con.exists(format!("{BALANCE_KEY}:{chat_id}:{user_id}"))
}

// Gets a balance
pub fn get_balance(con: &mut Connection, chat_id: &str, user_id: &str) -> RedisResult<i64> {
    con.get(format!("{BALANCE_KEY}:{chat_id}:{user_id}"))
}

// Deletes a balance in Redis
// Mainly for testing purposes
#[allow(dead_code)]
pub fn delete_balance(con: &mut Connection, chat_id: &str, user_id: &str) -> RedisResult<()> {
    con.del(format!("{BALANCE_KEY}:{chat_id}:{user_id}"))
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::redis::connect::connect;

    #[test]
    #[ignore = "requires a running Redis server"]
    fn test_set_get_balance() {
        let mut con = connect().unwrap();
        let chat_id = "test_balance_chat";
        let user_id = "test_balance_user";

        assert!(set_balance(&mut con, chat_id, user_id, 120).is_ok());
        assert!(get_balance_exists(&mut con, chat_id, user_id).unwrap());
        assert_eq!(get_balance(&mut con, chat_id, user_id).unwrap(), 120);

        assert!(set_balance(&mut con, chat_id, user_id, -5).is_ok());
        assert_eq!(get_balance(&mut con, chat_id, user_id).unwrap(), -5);

        assert!(delete_balance(&mut con, chat_id, user_id).is_ok());
        assert!(!get_balance_exists(&mut con, chat_id, user_id).unwrap());
    }
}
