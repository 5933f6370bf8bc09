use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::database::{
    DEFAULT_ACQUIRE_TIMEOUT_SECONDS, DEFAULT_MYSQL_DATABASE, DEFAULT_MYSQL_HOST,
    DEFAULT_MYSQL_PORT, DEFAULT_MYSQL_USER, DEFAULT_POOL_SIZE,
};

#[derive(Clone)]
pub struct Settings {
    pub discord_token: String,
    pub database: DatabaseSettings,
    /// Register commands in this guild only (development)
    pub guild_id: Option<u64>,
}

#[derive(Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub pool_size: u32,
    /// How long a query waits for a free pooled connection before failing
    pub acquire_timeout: Duration,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("database", &self.database)
            .field("guild_id", &self.guild_id)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("pool_size", &self.pool_size)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish_non_exhaustive()
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let discord_token =
            get("DISCORD_TOKEN").ok_or("DISCORD_TOKEN environment variable not set")?;

        let database = DatabaseSettings {
            host: get("MYSQL_HOST").unwrap_or_else(|| DEFAULT_MYSQL_HOST.to_string()),
            port: parse_or("MYSQL_PORT", get("MYSQL_PORT"), DEFAULT_MYSQL_PORT)?,
            database: get("MYSQL_DATABASE").unwrap_or_else(|| DEFAULT_MYSQL_DATABASE.to_string()),
            user: get("MYSQL_USER").unwrap_or_else(|| DEFAULT_MYSQL_USER.to_string()),
            password: get("MYSQL_PASSWORD").unwrap_or_default(),
            pool_size: parse_or("MYSQL_POOL_SIZE", get("MYSQL_POOL_SIZE"), DEFAULT_POOL_SIZE)?,
            acquire_timeout: Duration::from_secs(parse_or(
                "MYSQL_ACQUIRE_TIMEOUT_SECS",
                get("MYSQL_ACQUIRE_TIMEOUT_SECS"),
                DEFAULT_ACQUIRE_TIMEOUT_SECONDS,
            )?),
        };

        if database.pool_size == 0 {
            return Err("MYSQL_POOL_SIZE must be at least 1".to_string());
        }

        let guild_id = match get("GUILD_ID") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(id) if id > 0 => Some(id),
                _ => return Err(format!("GUILD_ID must be a Discord server ID, got: {}", raw)),
            },
            None => None,
        };

        Ok(Self {
            discord_token,
            database,
            guild_id,
        })
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T, String> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings, String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[("DISCORD_TOKEN", "token")]).unwrap();
        assert_eq!(settings.database.host, "localhost");
        assert_eq!(settings.database.port, 3306);
        assert_eq!(settings.database.database, "synergy_pro");
        assert_eq!(settings.database.user, "root");
        assert_eq!(settings.database.password, "");
        assert_eq!(settings.database.pool_size, 5);
        assert_eq!(settings.database.acquire_timeout, Duration::from_secs(10));
        assert_eq!(settings.guild_id, None);
    }

    #[test]
    fn test_missing_token() {
        assert!(settings_from(&[]).is_err());
        assert!(settings_from(&[("DISCORD_TOKEN", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let settings = settings_from(&[
            ("DISCORD_TOKEN", "token"),
            ("MYSQL_HOST", "db.internal"),
            ("MYSQL_PORT", "3307"),
            ("MYSQL_POOL_SIZE", "12"),
            ("MYSQL_ACQUIRE_TIMEOUT_SECS", "3"),
            ("GUILD_ID", "123456789012345678"),
        ])
        .unwrap();
        assert_eq!(settings.database.host, "db.internal");
        assert_eq!(settings.database.port, 3307);
        assert_eq!(settings.database.pool_size, 12);
        assert_eq!(settings.database.acquire_timeout, Duration::from_secs(3));
        assert_eq!(settings.guild_id, Some(123456789012345678));
    }

    #[test]
    fn test_invalid_numbers_name_the_variable() {
        let err = settings_from(&[("DISCORD_TOKEN", "token"), ("MYSQL_PORT", "abc")]).unwrap_err();
        assert!(err.contains("MYSQL_PORT"));

        let err =
            settings_from(&[("DISCORD_TOKEN", "token"), ("MYSQL_POOL_SIZE", "0")]).unwrap_err();
        assert!(err.contains("MYSQL_POOL_SIZE"));
    }

    #[test]
    fn test_invalid_guild_id_is_rejected() {
        let err = settings_from(&[("DISCORD_TOKEN", "token"), ("GUILD_ID", "my-server")]).unwrap_err();
        assert!(err.contains("GUILD_ID"));
        assert!(err.contains("my-server"));

        let err = settings_from(&[("DISCORD_TOKEN", "token"), ("GUILD_ID", "0")]).unwrap_err();
        assert!(err.contains("GUILD_ID"));

        // Left blank as in .env.example
        let settings = settings_from(&[("DISCORD_TOKEN", "token"), ("GUILD_ID", "")]).unwrap();
        assert_eq!(settings.guild_id, None);
    }

    #[test]
    fn test_password_hidden_from_debug() {
        let settings =
            settings_from(&[("DISCORD_TOKEN", "token"), ("MYSQL_PASSWORD", "hunter2")]).unwrap();
        assert!(!format!("{:?}", settings.database).contains("hunter2"));
    }

    #[test]
    fn test_secrets_hidden_from_settings_debug() {
        let settings = settings_from(&[
            ("DISCORD_TOKEN", "secret-bot-token"),
            ("MYSQL_PASSWORD", "hunter2"),
            ("GUILD_ID", "42"),
        ])
        .unwrap();
        let printed = format!("{:?}", settings);
        assert!(!printed.contains("secret-bot-token"));
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("42"));
    }
}
