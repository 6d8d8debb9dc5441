use std::env;

use chrono_tz::Tz;
use teloxide::types::UserId;

use super::patterns::{
    PatternError, RecoveryPatterns, REWARD_PATTERN_DEFAULT, SLOT_PATTERN_DEFAULT,
    SNAPSHOT_PATTERN_DEFAULT,
};

/* Config gathers the bot settings read from the environment.
 * `.env` is loaded by main before this runs.
 * The bot token is read separately by teloxide, from TELOXIDE_TOKEN.
 */

pub const HISTORY_CAPACITY_DEFAULT: usize = 10000;
pub const TIME_ZONE_DEFAULT: &str = "UTC";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    #[error("{0}")]
    PatternError(PatternError),
}

impl From<PatternError> for ConfigError {
    fn from(pattern_error: PatternError) -> ConfigError {
        ConfigError::PatternError(pattern_error)
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    // Number of messages kept in each chat's history log
    pub history_capacity: usize,
    pub time_zone: Tz,
    pub accumulate: bool,
    pub patterns: RecoveryPatterns,
    // Users allowed to recover in any group, on top of chat administrators
    pub owner_ids: Vec<UserId>,
}

impl BotConfig {
    pub fn from_env() -> Result<BotConfig, ConfigError> {
        BotConfig::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<BotConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let history_capacity = match lookup("HISTORY_CAPACITY") {
            Some(value) => {
                let capacity = value.trim().parse::<usize>();
                match capacity {
                    Ok(capacity) if capacity > 0 => capacity,
                    _ => return Err(ConfigError::InvalidValue("HISTORY_CAPACITY", value)),
                }
            }
            None => HISTORY_CAPACITY_DEFAULT,
        };

        let time_zone_name =
            lookup("RECOVERY_TIME_ZONE").unwrap_or_else(|| TIME_ZONE_DEFAULT.to_string());
        let time_zone = time_zone_name
            .trim()
            .parse::<Tz>()
            .map_err(|err| ConfigError::InvalidValue("RECOVERY_TIME_ZONE", err.to_string()))?;

        let accumulate = match lookup("RECOVERY_ACCUMULATE") {
            Some(value) => parse_flag(&value)
                .ok_or(ConfigError::InvalidValue("RECOVERY_ACCUMULATE", value))?,
            None => true,
        };

        let reward = lookup("RECOVERY_REWARD_PATTERN");
        let slot = lookup("RECOVERY_SLOT_PATTERN");
        let snapshot = lookup("RECOVERY_SNAPSHOT_PATTERN");
        let patterns = RecoveryPatterns::new(
            reward.as_deref().unwrap_or(REWARD_PATTERN_DEFAULT),
            slot.as_deref().unwrap_or(SLOT_PATTERN_DEFAULT),
            snapshot.as_deref().unwrap_or(SNAPSHOT_PATTERN_DEFAULT),
        )?;

        let owner_ids = match lookup("OWNER_IDS") {
            Some(value) => parse_owner_ids(&value)
                .ok_or(ConfigError::InvalidValue("OWNER_IDS", value))?,
            None => Vec::new(),
        };

        Ok(BotConfig {
            history_capacity,
            time_zone,
            accumulate,
            patterns,
            owner_ids,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// Comma separated Telegram user ids
fn parse_owner_ids(value: &str) -> Option<Vec<UserId>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| id.parse::<u64>().ok().map(UserId))
        .collect()
}
