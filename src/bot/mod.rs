// bot/mod.rs

// Exported functions
pub use self::dispatcher::run_dispatcher;

// Exported structs and types
pub use self::config::{BotConfig, ConfigError};
pub use self::dispatcher::{BotError, Command, HandlerResult, RecoverArgs};
pub use self::history::{HistoricalMessage, UserKey};
pub use self::patterns::{PatternError, RecoveryPatterns};
pub use self::reconciler::{
    Ledger, LogEvents, Reconciler, RecoveryEvents, Resolution, ResolutionResult, ResolvedBalance,
};

// Declare submodules
mod config;
mod dispatcher;
mod handler;
mod history;
mod patterns;
mod processor;
mod reconciler;
mod redis;
