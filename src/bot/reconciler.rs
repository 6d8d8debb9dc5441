use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use super::{
    history::{HistoricalMessage, UserKey},
    patterns::RecoveryPatterns,
};

/* Reconciler is the logic center of a recovery.
 * It replays a chat's history, newest message first, and rebuilds the balance
 * of every user the reporter has talked about.
 * Rewards only add to a running total. A slot result or a balance snapshot
 * finalizes the user, and the running total collected so far is added on top.
 * Users with rewards but no snapshot are flushed with their running total
 * once the scan ends, in the order they were first seen.
 * It knows nothing about Redis or Telegram; history and ledger are passed in.
 */

pub const NUM_ACCOUNTS_DEFAULT: usize = 100;
pub const NUM_MESSAGES_DEFAULT: usize = 1000;

/* Ledger receives the recovered balances, one call per user,
 * in the order the users are finalized.
 */
pub trait Ledger {
    type Error;

    fn set_balance(&mut self, user: &UserKey, balance: i64) -> Result<(), Self::Error>;
}

/* Events emitted over the course of a recovery.
 * The defaults write to the log, per-user events at debug and the summary at info.
 */
pub trait RecoveryEvents {
    fn reward_added(&mut self, subject: &UserKey, amount: i64, running_total: i64) {
        log::debug!(
            "Recovery - Added {} to {}'s cumulative balance (Now {})",
            amount,
            subject,
            running_total
        );
    }

    fn balance_set(&mut self, subject: &UserKey, balance: i64, resolution: Resolution) {
        match resolution {
            Resolution::Snapshot => {
                log::debug!("Recovery - Set {}'s balance to {}", subject, balance)
            }
            Resolution::Flushed => log::debug!(
                "Recovery - Set {}'s balance to {} from cumulative balance",
                subject,
                balance
            ),
        }
    }

    fn finished(&mut self, result: &ResolutionResult) {
        log::info!(
            "Recovery - Set the balance of {} members ({} from cumulative balances) after scanning {} messages, dating back to {}",
            result.recovered_count(),
            result.flushed_count(),
            result.messages_scanned,
            result
                .oldest_timestamp
                .map(|timestamp| timestamp.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "nothing".to_string())
        );
    }
}

// Event sink that only logs.
pub struct LogEvents;

impl RecoveryEvents for LogEvents {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    // Finalized by a slot result or balance snapshot
    Snapshot,
    // Finalized from the running total when the scan ended
    Flushed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBalance {
    pub user: UserKey,
    pub balance: i64,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolutionResult {
    pub balances: Vec<ResolvedBalance>,
    pub messages_scanned: usize,
    pub oldest_timestamp: Option<DateTime<Utc>>,
}

impl ResolutionResult {
    pub fn recovered_count(&self) -> usize {
        self.count(Resolution::Snapshot)
    }

    pub fn flushed_count(&self) -> usize {
        self.count(Resolution::Flushed)
    }

    pub fn balance_of(&self, user: &UserKey) -> Option<i64> {
        self.balances
            .iter()
            .find(|resolved| &resolved.user == user)
            .map(|resolved| resolved.balance)
    }

    fn count(&self, resolution: Resolution) -> usize {
        self.balances
            .iter()
            .filter(|resolved| resolved.resolution == resolution)
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    reporter: UserKey,
    patterns: RecoveryPatterns,
    max_accounts: usize,
    max_messages: usize,
    accumulate: bool,
}

impl Reconciler {
    pub fn new(reporter: UserKey, patterns: RecoveryPatterns) -> Reconciler {
        Reconciler {
            reporter,
            patterns,
            max_accounts: NUM_ACCOUNTS_DEFAULT,
            max_messages: NUM_MESSAGES_DEFAULT,
            accumulate: true,
        }
    }

    pub fn max_accounts(mut self, max_accounts: usize) -> Reconciler {
        self.max_accounts = max_accounts;
        self
    }

    pub fn max_messages(mut self, max_messages: usize) -> Reconciler {
        self.max_messages = max_messages;
        self
    }

    // When off, reward messages are ignored and nothing is flushed.
    pub fn accumulate(mut self, accumulate: bool) -> Reconciler {
        self.accumulate = accumulate;
        self
    }

    /* Main function of Reconciler.
     * History must be newest first. It is read lazily and dropped as soon as
     * the message or account bound is reached.
     * Ledger and history errors abort the scan; balances already set stay set.
     */
    pub fn run<H, L, V>(
        &self,
        history: H,
        ledger: &mut L,
        events: &mut V,
    ) -> Result<ResolutionResult, L::Error>
    where
        H: IntoIterator<Item = Result<HistoricalMessage, L::Error>>,
        L: Ledger,
        V: RecoveryEvents,
    {
        let mut result = ResolutionResult::default();
        if self.max_accounts == 0 {
            events.finished(&result);
            return Ok(result);
        }

        let mut running_totals: HashMap<UserKey, i64> = HashMap::new();
        // Users in the order their first reward was seen
        let mut rewarded: Vec<UserKey> = Vec::new();
        let mut recovered: HashSet<UserKey> = HashSet::new();

        for message in history.into_iter().take(self.max_messages) {
            let message = message?;
            result.messages_scanned += 1;

            if message.author != self.reporter {
                continue;
            }
            let subject = match message.mentions.first() {
                Some(subject) => subject,
                None => continue,
            };
            if recovered.contains(subject) {
                continue;
            }

            if self.accumulate {
                if let Some(amount) = self.patterns.match_reward(&message.content) {
                    if !running_totals.contains_key(subject) {
                        rewarded.push(subject.clone());
                    }
                    let running_total = running_totals.entry(subject.clone()).or_insert(0);
                    *running_total = running_total.saturating_add(amount);
                    events.reward_added(subject, amount, *running_total);
                    result.oldest_timestamp = Some(message.created_at);
                    continue;
                }
            }

            let amount = self
                .patterns
                .match_slot(&message.content)
                .or_else(|| self.patterns.match_snapshot(&message.content));

            if let Some(amount) = amount {
                let running_total = running_totals.remove(subject).unwrap_or(0);
                let balance = amount.saturating_add(running_total);
                finalize(&mut result, ledger, events, subject, balance, Resolution::Snapshot)?;
                recovered.insert(subject.clone());
                result.oldest_timestamp = Some(message.created_at);

                if recovered.len() >= self.max_accounts {
                    break;
                }
            }
        }

        for subject in rewarded {
            if let Some(balance) = running_totals.remove(&subject) {
                finalize(&mut result, ledger, events, &subject, balance, Resolution::Flushed)?;
            }
        }

        events.finished(&result);
        Ok(result)
    }
}

fn finalize<L: Ledger, V: RecoveryEvents>(
    result: &mut ResolutionResult,
    ledger: &mut L,
    events: &mut V,
    subject: &UserKey,
    balance: i64,
    resolution: Resolution,
) -> Result<(), L::Error> {
    ledger.set_balance(subject, balance)?;
    events.balance_set(subject, balance, resolution);
    result.balances.push(ResolvedBalance {
        user: subject.clone(),
        balance,
        resolution,
    });
    Ok(())
}
