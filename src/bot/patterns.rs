use regex::Regex;

/* Patterns are the three regular expressions that pick balance signals
 * out of the reporter's reply text. Each must have exactly one capture group,
 * which captures the integer amount.
 */

pub const REWARD_PATTERN_DEFAULT: &str =
    r"(?:<@!?\d+>|@\w+) Here, take some credits\. Enjoy! \(\+(\d+) credits!\)";
pub const SLOT_PATTERN_DEFAULT: &str = r"\d+ → (\d+)!";
pub const SNAPSHOT_PATTERN_DEFAULT: &str = r"(?:<@!?\d+>|@\w+) Your balance is: (\d+)";

#[derive(thiserror::Error, Debug)]
pub enum PatternError {
    #[error("Invalid {0} pattern: {1}")]
    InvalidRegex(&'static str, regex::Error),
    #[error("The {0} pattern must have exactly one capture group, found {1}")]
    CaptureGroups(&'static str, usize),
}

#[derive(Debug, Clone)]
pub struct RecoveryPatterns {
    reward: Regex,
    slot: Regex,
    snapshot: Regex,
}

impl RecoveryPatterns {
    pub fn new(reward: &str, slot: &str, snapshot: &str) -> Result<RecoveryPatterns, PatternError> {
        Ok(RecoveryPatterns {
            reward: compile("reward", reward)?,
            slot: compile("slot", slot)?,
            snapshot: compile("snapshot", snapshot)?,
        })
    }

    // Amount granted by an incremental reward, searched in the full text.
    pub fn match_reward(&self, content: &str) -> Option<i64> {
        capture_amount(&self.reward, content)
    }

    // Result of a slot spin, searched in the last line only.
    pub fn match_slot(&self, content: &str) -> Option<i64> {
        let last_line = content.rsplit('\n').next().unwrap_or(content);
        capture_amount(&self.slot, last_line)
    }

    // Absolute balance stated by the reporter, searched in the full text.
    pub fn match_snapshot(&self, content: &str) -> Option<i64> {
        capture_amount(&self.snapshot, content)
    }
}

fn compile(name: &'static str, pattern: &str) -> Result<Regex, PatternError> {
    let regex = Regex::new(pattern).map_err(|err| PatternError::InvalidRegex(name, err))?;
    // captures_len counts the implicit whole-match group
    let groups = regex.captures_len() - 1;
    if groups != 1 {
        return Err(PatternError::CaptureGroups(name, groups));
    }
    Ok(regex)
}

// Amounts too large for i64 are treated as no match.
fn capture_amount(regex: &Regex, text: &str) -> Option<i64> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|amount| amount.as_str().parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_patterns() -> RecoveryPatterns {
        RecoveryPatterns::new(
            REWARD_PATTERN_DEFAULT,
            SLOT_PATTERN_DEFAULT,
            SNAPSHOT_PATTERN_DEFAULT,
        )
        .unwrap()
    }

    #[test]
    fn test_match_reward() {
        let patterns = default_patterns();
        assert_eq!(
            patterns.match_reward("@alice Here, take some credits. Enjoy! (+120 credits!)"),
            Some(120)
        );
        assert_eq!(
            patterns.match_reward("<@!1234> Here, take some credits. Enjoy! (+5 credits!)"),
            Some(5)
        );
        assert_eq!(
            patterns.match_reward("@alice here, take some credits. enjoy! (+120 credits!)"),
            None
        );
    }

    #[test]
    fn test_match_slot_uses_last_line() {
        let patterns = default_patterns();
        let spin = "🍒 🍒 🍒\n@alice Three cherries!\nBid: 10\n100 → 340!";
        assert_eq!(patterns.match_slot(spin), Some(340));

        let trailing = "100 → 340!\nBetter luck next time";
        assert_eq!(patterns.match_slot(trailing), None);
    }

    #[test]
    fn test_match_slot_garbled_arrow() {
        let patterns = default_patterns();
        assert_eq!(patterns.match_slot("100 â†’ 340!"), None);
        assert_eq!(patterns.match_slot("100 -> 340!"), None);
    }

    #[test]
    fn test_match_snapshot() {
        let patterns = default_patterns();
        assert_eq!(
            patterns.match_snapshot("Well...\n@bob Your balance is: 77\nKeep it up"),
            Some(77)
        );
        assert_eq!(patterns.match_snapshot("@bob your balance is: 77"), None);
    }

    #[test]
    fn test_oversized_amount_is_no_match() {
        let patterns = default_patterns();
        assert_eq!(
            patterns.match_snapshot("@bob Your balance is: 99999999999999999999999"),
            None
        );
    }

    #[test]
    fn test_new_rejects_bad_patterns() {
        assert!(matches!(
            RecoveryPatterns::new("(", SLOT_PATTERN_DEFAULT, SNAPSHOT_PATTERN_DEFAULT),
            Err(PatternError::InvalidRegex("reward", _))
        ));
        assert!(matches!(
            RecoveryPatterns::new(REWARD_PATTERN_DEFAULT, r"\d+", SNAPSHOT_PATTERN_DEFAULT),
            Err(PatternError::CaptureGroups("slot", 0))
        ));
        assert!(RecoveryPatterns::new(
            REWARD_PATTERN_DEFAULT,
            SLOT_PATTERN_DEFAULT,
            SNAPSHOT_PATTERN_DEFAULT
        )
        .is_ok());
    }
}
