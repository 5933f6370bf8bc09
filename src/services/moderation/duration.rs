use chrono::TimeDelta;

use crate::constants::timeouts::{
    MAX_TIMEOUT_SECONDS, SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE, SECONDS_PER_WEEK,
};
use crate::services::moderation::error::ModerationError;

/// Unit choice for `/mod timeout` and `/role temp`
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum DurationUnit {
    #[name = "minutes"]
    Minutes,
    #[name = "hours"]
    Hours,
    #[name = "days"]
    Days,
    #[name = "weeks"]
    Weeks,
}

impl DurationUnit {
    pub fn seconds(&self) -> u64 {
        match self {
            DurationUnit::Minutes => SECONDS_PER_MINUTE,
            DurationUnit::Hours => SECONDS_PER_HOUR,
            DurationUnit::Days => SECONDS_PER_DAY,
            DurationUnit::Weeks => SECONDS_PER_WEEK,
        }
    }

    /// Unit name agreeing with `amount`, e.g. "hour" or "hours"
    pub fn label(&self, amount: u64) -> &'static str {
        match (self, amount == 1) {
            (DurationUnit::Minutes, true) => "minute",
            (DurationUnit::Minutes, false) => "minutes",
            (DurationUnit::Hours, true) => "hour",
            (DurationUnit::Hours, false) => "hours",
            (DurationUnit::Days, true) => "day",
            (DurationUnit::Days, false) => "days",
            (DurationUnit::Weeks, true) => "week",
            (DurationUnit::Weeks, false) => "weeks",
        }
    }
}

/// A validated timeout length: positive and at most 28 days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutDuration {
    amount: u64,
    unit: DurationUnit,
}

impl TimeoutDuration {
    pub fn new(amount: i64, unit: DurationUnit) -> Result<Self, ModerationError> {
        let amount = u64::try_from(amount)
            .ok()
            .filter(|amount| *amount > 0)
            .ok_or_else(|| {
                ModerationError::InvalidDuration("Timeout duration must be positive!".to_string())
            })?;

        match amount.checked_mul(unit.seconds()) {
            Some(seconds) if seconds <= MAX_TIMEOUT_SECONDS => Ok(Self { amount, unit }),
            _ => Err(ModerationError::InvalidDuration(
                "Timeout duration cannot exceed 28 days!".to_string(),
            )),
        }
    }

    pub fn as_secs(&self) -> u64 {
        self.amount * self.unit.seconds()
    }

    pub fn as_time_delta(&self) -> TimeDelta {
        // Bounded by MAX_TIMEOUT_SECONDS, so the cast cannot overflow
        TimeDelta::seconds(self.as_secs() as i64)
    }

    /// Text stored in the ledger and shown in embeds, e.g. "1 hour", "3 days"
    pub fn label(&self) -> String {
        format!("{} {}", self.amount, self.unit.label(self.amount))
    }
}
