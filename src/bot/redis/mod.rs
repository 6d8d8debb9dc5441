// Exported functions
pub use self::manager::{fetch_history, record_history, retrieve_balance, CrudError, RedisLedger};

// Submodules
mod balance;
mod connect;
mod history;
mod manager;
