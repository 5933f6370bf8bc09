/// Seconds per timeout unit
pub const SECONDS_PER_MINUTE: u64 = 60;
pub const SECONDS_PER_HOUR: u64 = 60 * 60;
pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
pub const SECONDS_PER_WEEK: u64 = 7 * 24 * 60 * 60;

/// Discord refuses timeouts longer than 28 days
pub const MAX_TIMEOUT_SECONDS: u64 = 28 * SECONDS_PER_DAY;

/// Slash option bound for the timeout amount (28 days in minutes)
pub const MAX_TIMEOUT_AMOUNT: u64 = MAX_TIMEOUT_SECONDS / SECONDS_PER_MINUTE;

/// Ban message deletion window bound, in days
pub const MAX_DELETE_MESSAGE_DAYS: u8 = 7;

/// Reason stored and shown when the moderator gives none
pub const DEFAULT_REASON: &str = "No reason provided";

/// Rows shown by `/mod history`
pub const HISTORY_PAGE_SIZE: i64 = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_cap() {
        assert_eq!(MAX_TIMEOUT_SECONDS, 2_419_200);
        assert_eq!(MAX_TIMEOUT_AMOUNT, 40_320);
    }
}
