/// Slash option bound for `/role temp` amounts, in any unit
pub const MAX_TEMP_ROLE_AMOUNT: i64 = 365;

/// How often expired temporary roles are swept
pub const TEMP_ROLE_SWEEP_SECONDS: u64 = 30;

/// Entries shown by `/role history` unless a limit is given
pub const DEFAULT_ROLE_HISTORY_LIMIT: i64 = 10;
pub const MAX_ROLE_HISTORY_LIMIT: i64 = 25;

/// Roles named in the "Could Not Remove" field before summarising the rest
pub const SKIPPED_ROLES_SHOWN: usize = 5;
