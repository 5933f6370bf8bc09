use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlArguments, MySqlPool, MySqlQueryResult, MySqlRow};
use sqlx::{Arguments, FromRow};
use thiserror::Error;
use tracing::{debug, info};

/// A value bound to a `?` placeholder. SQL text never carries values.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Null,
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// Raised when a table or column name is not a plain identifier
#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid SQL identifier: {0:?}")]
pub struct InvalidIdentifier(pub String);

/// Shared database handle passed to query modules and the moderation pipeline
#[derive(Clone)]
pub struct Database {
    pool: MySqlPool,
}

impl Database {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Expose the underlying pool
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Fetch at most one row, mapped into a typed record
    pub async fn fetch_one<T>(&self, query: &str, params: &[SqlValue]) -> Result<Option<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        sqlx::query_as_with::<_, T, _>(query, arguments(params)?)
            .fetch_optional(&self.pool)
            .await
    }

    /// Fetch every matching row, mapped into typed records
    pub async fn fetch_all<T>(&self, query: &str, params: &[SqlValue]) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        sqlx::query_as_with::<_, T, _>(query, arguments(params)?)
            .fetch_all(&self.pool)
            .await
    }

    /// Insert one row and return its auto-increment id
    pub async fn insert(&self, table: &str, values: &[(&str, SqlValue)]) -> Result<u64, sqlx::Error> {
        let columns: Vec<&str> = values.iter().map(|(column, _)| *column).collect();
        let query = insert_sql(table, &columns).map_err(encode_error)?;
        let params: Vec<SqlValue> = values.iter().map(|(_, value)| value.clone()).collect();

        let result = self.execute(&query, &params).await?;
        debug!("Inserted row into {} with id {}", table, result.last_insert_id());

        Ok(result.last_insert_id())
    }

    /// Update rows matching `where_clause` and return how many changed.
    /// `where_clause` must be constant SQL using `?` placeholders for `where_params`.
    pub async fn update(
        &self,
        table: &str,
        values: &[(&str, SqlValue)],
        where_clause: &str,
        where_params: &[SqlValue],
    ) -> Result<u64, sqlx::Error> {
        let columns: Vec<&str> = values.iter().map(|(column, _)| *column).collect();
        let query = update_sql(table, &columns, where_clause).map_err(encode_error)?;
        let params: Vec<SqlValue> = values
            .iter()
            .map(|(_, value)| value.clone())
            .chain(where_params.iter().cloned())
            .collect();

        let result = self.execute(&query, &params).await?;
        debug!("Updated {} rows in {}", result.rows_affected(), table);

        Ok(result.rows_affected())
    }

    /// Delete rows matching `where_clause` and return how many went.
    /// `where_clause` must be constant SQL using `?` placeholders for `where_params`.
    pub async fn delete(
        &self,
        table: &str,
        where_clause: &str,
        where_params: &[SqlValue],
    ) -> Result<u64, sqlx::Error> {
        let query = delete_sql(table, where_clause).map_err(encode_error)?;

        let result = self.execute(&query, where_params).await?;
        debug!("Deleted {} rows from {}", result.rows_affected(), table);

        Ok(result.rows_affected())
    }

    /// Run a statement that returns no rows
    pub async fn execute(&self, query: &str, params: &[SqlValue]) -> Result<MySqlQueryResult, sqlx::Error> {
        sqlx::query_with(query, arguments(params)?)
            .execute(&self.pool)
            .await
    }

    /// Close every pooled connection; later queries fail with `PoolClosed`
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connections closed");
    }
}

fn arguments(params: &[SqlValue]) -> Result<MySqlArguments, sqlx::Error> {
    let mut args = MySqlArguments::default();
    for param in params {
        let added = match param {
            SqlValue::Int(value) => args.add(*value),
            SqlValue::Text(value) => args.add(value.clone()),
            SqlValue::Timestamp(value) => args.add(*value),
            SqlValue::Null => args.add(None::<i64>),
        };
        added.map_err(sqlx::Error::Encode)?;
    }
    Ok(args)
}

fn encode_error(error: InvalidIdentifier) -> sqlx::Error {
    sqlx::Error::Encode(Box::new(error))
}

fn check_identifier(name: &str) -> Result<&str, InvalidIdentifier> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(name)
    } else {
        Err(InvalidIdentifier(name.to_string()))
    }
}

fn insert_sql(table: &str, columns: &[&str]) -> Result<String, InvalidIdentifier> {
    check_identifier(table)?;
    if columns.is_empty() {
        return Err(InvalidIdentifier(String::new()));
    }
    let columns = columns
        .iter()
        .map(|column| check_identifier(column))
        .collect::<Result<Vec<_>, _>>()?;
    let placeholders = vec!["?"; columns.len()].join(", ");

    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders
    ))
}

fn update_sql(table: &str, columns: &[&str], where_clause: &str) -> Result<String, InvalidIdentifier> {
    check_identifier(table)?;
    if columns.is_empty() {
        return Err(InvalidIdentifier(String::new()));
    }
    let assignments = columns
        .iter()
        .map(|column| check_identifier(column).map(|c| format!("{} = ?", c)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(format!(
        "UPDATE {} SET {} WHERE {}",
        table,
        assignments.join(", "),
        where_clause
    ))
}

fn delete_sql(table: &str, where_clause: &str) -> Result<String, InvalidIdentifier> {
    check_identifier(table)?;
    // An unconditional delete is never intended
    if where_clause.trim().is_empty() {
        return Err(InvalidIdentifier(String::new()));
    }

    Ok(format!("DELETE FROM {} WHERE {}", table, where_clause))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_sql() {
        assert_eq!(
            insert_sql("guilds", &["guild_id", "mod_log_channel_id"]).unwrap(),
            "INSERT INTO guilds (guild_id, mod_log_channel_id) VALUES (?, ?)"
        );
    }

    #[test]
    fn test_update_sql() {
        assert_eq!(
            update_sql("guilds", &["mod_log_channel_id", "updated_at"], "guild_id = ?").unwrap(),
            "UPDATE guilds SET mod_log_channel_id = ?, updated_at = ? WHERE guild_id = ?"
        );
    }

    #[test]
    fn test_delete_sql() {
        assert_eq!(
            delete_sql("temp_roles", "id = ?").unwrap(),
            "DELETE FROM temp_roles WHERE id = ?"
        );
        assert!(delete_sql("temp_roles", "  ").is_err());
        assert!(delete_sql("temp_roles; --", "id = ?").is_err());
    }

    #[test]
    fn test_rejects_injected_identifiers() {
        assert!(insert_sql("guilds; DROP TABLE guilds", &["guild_id"]).is_err());
        assert!(insert_sql("guilds", &["guild_id) VALUES (1); --"]).is_err());
        assert!(update_sql("guilds", &["a = 1, b"], "guild_id = ?").is_err());
        assert!(insert_sql("1guilds", &["guild_id"]).is_err());
        assert!(insert_sql("guilds", &[]).is_err());
    }

    #[test]
    fn test_sql_value_conversions() {
        assert_eq!(SqlValue::from(5_i64), SqlValue::Int(5));
        assert_eq!(SqlValue::from("spam"), SqlValue::Text("spam".to_string()));
        assert_eq!(SqlValue::from(None::<String>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(7_i64)), SqlValue::Int(7));
        assert_eq!(SqlValue::from(true), SqlValue::Int(1));
        assert_eq!(SqlValue::from(false), SqlValue::Int(0));
    }

    #[test]
    fn test_arguments_bind_every_value() {
        let params = [
            SqlValue::Int(1),
            SqlValue::Text("x".to_string()),
            SqlValue::Timestamp(Utc::now()),
            SqlValue::Null,
        ];
        let args = arguments(&params).unwrap();
        assert_eq!(args.len(), 4);
    }
}
