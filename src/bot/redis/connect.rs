use redis::{Client, Connection, RedisError};

const REDIS_URL_DEFAULT: &str = "redis://127.0.0.1/";

#[derive(thiserror::Error, Debug)]
pub enum DBError {
    #[error("Failed to connect to Redis at {0}: {1}")]
    ConnectionError(String, RedisError),
}

// Redis URL, from REDIS_URL if set.
pub fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| REDIS_URL_DEFAULT.to_string())
}

pub fn connect() -> Result<Connection, DBError> {
    let url = redis_url();
    Client::open(url.as_str())
        .and_then(|client| client.get_connection())
        .map_err(|err| DBError::ConnectionError(url, err))
}

#[cfg(test)]
mod tests {
    use redis::{Commands, RedisResult};

    use super::*;

    // Tests connection to Redis
    fn test_redis_connection() -> RedisResult<bool> {
        let mut con = connect().unwrap();
        let _: () = con.set("creditscribe_test_key", 42)?;
        let res: i32 = con.get("creditscribe_test_key")?;
        let _: () = con.del("creditscribe_test_key")?;

        Ok(res == 42)
    }

    #[test]
    #[ignore = "requires a running Redis server"]
    fn test_connection() {
        assert!(test_redis_connection().unwrap());
    }

    #[test]
    fn test_redis_url_default() {
        if std::env::var("REDIS_URL").is_err() {
            assert_eq!(redis_url(), REDIS_URL_DEFAULT);
        }
    }
}
