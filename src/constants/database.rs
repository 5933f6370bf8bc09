/// Connection defaults, overridable via `MYSQL_*` env vars
pub const DEFAULT_MYSQL_HOST: &str = "localhost";
pub const DEFAULT_MYSQL_PORT: u16 = 3306;
pub const DEFAULT_MYSQL_DATABASE: &str = "synergy_pro";
pub const DEFAULT_MYSQL_USER: &str = "root";
pub const DEFAULT_POOL_SIZE: u32 = 5;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECONDS: u64 = 10;

/// Table names
pub const GUILDS_TABLE: &str = "guilds";
pub const PUNISHMENT_TABLE: &str = "punishment_actions";
pub const ROLE_ASSIGNMENTS_TABLE: &str = "role_assignments";
pub const TEMP_ROLES_TABLE: &str = "temp_roles";
