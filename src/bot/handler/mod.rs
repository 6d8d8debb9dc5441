// Exported functions
pub use self::balance::action_balance;
pub use self::general::{action_help, action_start, invalid_state};
pub use self::recover::{action_recover, action_recover_invalid, is_recover_command};
pub use self::utils::record_message_history;

// Submodules
mod balance;
mod constants;
mod general;
mod recover;
mod utils;
