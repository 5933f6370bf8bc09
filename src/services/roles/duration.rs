use chrono::TimeDelta;

use crate::constants::roles::MAX_TEMP_ROLE_AMOUNT;
use crate::services::moderation::DurationUnit;
use crate::services::roles::error::RoleError;

/// How long a temporary role is held: 1 to 365 of any unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempRoleDuration {
    amount: u64,
    unit: DurationUnit,
}

impl TempRoleDuration {
    pub fn new(amount: i64, unit: DurationUnit) -> Result<Self, RoleError> {
        if !(1..=MAX_TEMP_ROLE_AMOUNT).contains(&amount) {
            return Err(RoleError::InvalidDuration(format!(
                "Duration must be between 1 and {}!",
                MAX_TEMP_ROLE_AMOUNT
            )));
        }
        Ok(Self {
            amount: amount as u64,
            unit,
        })
    }

    pub fn as_time_delta(&self) -> TimeDelta {
        // At most 365 weeks, far inside i64 seconds
        TimeDelta::seconds((self.amount * self.unit.seconds()) as i64)
    }

    /// e.g. "1 week", "12 hours"
    pub fn label(&self) -> String {
        format!("{} {}", self.amount, self.unit.label(self.amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(TempRoleDuration::new(1, DurationUnit::Minutes).is_ok());
        assert!(TempRoleDuration::new(365, DurationUnit::Weeks).is_ok());
        assert!(matches!(
            TempRoleDuration::new(0, DurationUnit::Days),
            Err(RoleError::InvalidDuration(_))
        ));
        assert!(TempRoleDuration::new(366, DurationUnit::Minutes).is_err());
        assert!(TempRoleDuration::new(-3, DurationUnit::Hours).is_err());
    }

    #[test]
    fn test_length_and_label() {
        let duration = TempRoleDuration::new(2, DurationUnit::Days).unwrap();
        assert_eq!(duration.as_time_delta(), TimeDelta::days(2));
        assert_eq!(duration.label(), "2 days");
        assert_eq!(TempRoleDuration::new(1, DurationUnit::Weeks).unwrap().label(), "1 week");
    }
}
