use chrono::{DateTime, Utc};
use serenity::all::{RoleId, UserId};

use crate::constants::timeouts::DEFAULT_REASON;

/// Format a user mention
pub fn mention_user(user_id: UserId) -> String {
    format!("<@{}>", user_id)
}

/// Format a role mention
pub fn mention_role(role_id: RoleId) -> String {
    format!("<@&{}>", role_id)
}

/// Mention for an id read back from the database; falls back to the raw id
pub fn mention_stored_user(id: i64) -> String {
    snowflake(id)
        .map(|id| mention_user(UserId::new(id)))
        .unwrap_or_else(|| format!("`{}`", id))
}

pub fn mention_stored_role(id: i64) -> String {
    snowflake(id)
        .map(|id| mention_role(RoleId::new(id)))
        .unwrap_or_else(|| format!("`{}`", id))
}

fn snowflake(id: i64) -> Option<u64> {
    u64::try_from(id).ok().filter(|id| *id != 0)
}

/// Format a channel mention
pub fn mention_channel(channel_id: u64) -> String {
    format!("<#{}>", channel_id)
}

/// Discord timestamp markup, e.g. style `F` (full date) or `R` (relative)
pub fn discord_timestamp(at: DateTime<Utc>, style: char) -> String {
    format!("<t:{}:{}>", at.timestamp(), style)
}

/// Break `@` so user-provided text cannot ping anyone when rendered
pub fn neutralize_mentions(s: &str) -> String {
    s.replace('@', "@\u{200B}")
}

/// Trimmed user-supplied reason, or the placeholder when it is missing or blank
pub fn reason_or_default(reason: Option<&str>) -> &str {
    reason
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .unwrap_or(DEFAULT_REASON)
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentions() {
        assert_eq!(mention_user(UserId::new(42)), "<@42>");
        assert_eq!(mention_channel(7), "<#7>");
        assert_eq!(mention_role(RoleId::new(9)), "<@&9>");
        assert_eq!(mention_stored_user(42), "<@42>");
        assert_eq!(mention_stored_user(0), "`0`");
        assert_eq!(mention_stored_role(-5), "`-5`");
        assert_eq!(mention_stored_role(9), "<@&9>");
    }

    #[test]
    fn test_discord_timestamp() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(discord_timestamp(at, 'F'), "<t:1700000000:F>");
        assert_eq!(discord_timestamp(at, 'R'), "<t:1700000000:R>");
    }

    #[test]
    fn test_neutralize_mentions() {
        assert_eq!(neutralize_mentions("@everyone spam"), "@\u{200B}everyone spam");
        assert_eq!(neutralize_mentions("plain"), "plain");
    }

    #[test]
    fn test_reason_or_default() {
        assert_eq!(reason_or_default(Some("  spam ")), "spam");
        assert_eq!(reason_or_default(Some("   ")), DEFAULT_REASON);
        assert_eq!(reason_or_default(None), DEFAULT_REASON);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
        assert_eq!(truncate("abcdef", 2), "ab");
    }
}
