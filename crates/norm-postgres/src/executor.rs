//! Query execution with retry, cancellation, and observability.
//!
//! Every statement the library issues goes through the executor: parameters
//! are bound, the driver future is raced against the caller's cancellation
//! token, transient failures (deadlock, serialization failure, admin
//! shutdown) are retried with exponential backoff, and slow queries are
//! logged.

use std::time::{Duration, Instant};

use sqlx::postgres::PgArguments;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::connection::Pool;
use crate::row::Row;
use crate::value::Value;
use crate::{NormError, Result};

/// Configuration for query execution with retry support.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of retries for transient errors
    pub max_retries: u32,
    /// Initial delay between retries in milliseconds
    pub initial_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_delay_ms: u64,
    /// Backoff multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Threshold for slow query logging in milliseconds
    pub slow_query_threshold_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 50,
            max_delay_ms: 2000,
            backoff_multiplier: 2.0,
            slow_query_threshold_ms: 1000,
        }
    }
}

impl ExecutorConfig {
    /// A config with retries disabled.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_millis(self.initial_delay_ms);
        }

        let delay_ms =
            (self.initial_delay_ms as f64) * self.backoff_multiplier.powi(attempt as i32);

        Duration::from_millis((delay_ms as u64).min(self.max_delay_ms))
    }
}

/// Executes statements against one pool.
pub struct Executor<'a> {
    pool: &'a Pool,
    config: ExecutorConfig,
}

impl<'a> Executor<'a> {
    /// Creates an executor with the default configuration.
    pub fn new(pool: &'a Pool) -> Self {
        Self {
            pool,
            config: ExecutorConfig::default(),
        }
    }

    /// Creates an executor with a custom configuration.
    pub fn with_config(pool: &'a Pool, config: ExecutorConfig) -> Self {
        Self { pool, config }
    }

    /// Fetches every row of a statement.
    pub async fn fetch_all(
        &self,
        sql: &str,
        params: &[Value],
        ctx: &CancellationToken,
    ) -> Result<Vec<Row>> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            let args = bind_params(params)?;
            let start = Instant::now();

            let result = tokio::select! {
                biased;
                _ = ctx.cancelled() => Err(NormError::Cancelled),
                res = async {
                    let rows = sqlx::query_with(sql, args).fetch_all(self.pool.pg()).await?;
                    rows.iter().map(Row::from_pg).collect::<Result<Vec<_>>>()
                } => res,
            };

            match result {
                Ok(rows) => {
                    self.log_query_completion(sql, start.elapsed(), attempt);
                    return Ok(rows);
                }
                Err(e) => {
                    if self.note_failure(sql, &e, start.elapsed(), attempt) {
                        tokio::time::sleep(self.config.delay_for_attempt(attempt)).await;
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(exhausted(last_error))
    }

    /// Fetches a single scalar, for COUNT-style statements.
    pub async fn fetch_scalar_i64(
        &self,
        sql: &str,
        params: &[Value],
        ctx: &CancellationToken,
    ) -> Result<i64> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            let args = bind_params(params)?;
            let start = Instant::now();

            let result = tokio::select! {
                biased;
                _ = ctx.cancelled() => Err(NormError::Cancelled),
                res = async {
                    let value: (i64,) = sqlx::query_as_with(sql, args)
                        .fetch_one(self.pool.pg())
                        .await?;
                    Ok(value.0)
                } => res,
            };

            match result {
                Ok(value) => {
                    self.log_query_completion(sql, start.elapsed(), attempt);
                    return Ok(value);
                }
                Err(e) => {
                    if self.note_failure(sql, &e, start.elapsed(), attempt) {
                        tokio::time::sleep(self.config.delay_for_attempt(attempt)).await;
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(exhausted(last_error))
    }

    /// Executes a statement and returns the affected row count.
    pub async fn execute(
        &self,
        sql: &str,
        params: &[Value],
        ctx: &CancellationToken,
    ) -> Result<u64> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            let args = bind_params(params)?;
            let start = Instant::now();

            let result = tokio::select! {
                biased;
                _ = ctx.cancelled() => Err(NormError::Cancelled),
                res = async {
                    let result = sqlx::query_with(sql, args).execute(self.pool.pg()).await?;
                    Ok(result.rows_affected())
                } => res,
            };

            match result {
                Ok(rows_affected) => {
                    self.log_query_completion(sql, start.elapsed(), attempt);
                    debug!(rows_affected = rows_affected, "statement executed");
                    return Ok(rows_affected);
                }
                Err(e) => {
                    if self.note_failure(sql, &e, start.elapsed(), attempt) {
                        tokio::time::sleep(self.config.delay_for_attempt(attempt)).await;
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(exhausted(last_error))
    }

    /// Logs a failed attempt; returns whether the caller should retry.
    fn note_failure(&self, sql: &str, error: &NormError, elapsed: Duration, attempt: u32) -> bool {
        let retryable = error.is_retryable();

        warn!(
            pool = %self.pool.label(),
            sql = %sql.chars().take(100).collect::<String>(),
            attempt = attempt,
            elapsed_ms = elapsed.as_millis() as u64,
            retryable = retryable,
            error = %error,
            "query failed"
        );

        retryable && attempt < self.config.max_retries
    }

    fn log_query_completion(&self, sql: &str, elapsed: Duration, attempt: u32) {
        let elapsed_ms = elapsed.as_millis() as u64;
        let sql_preview: String = sql.chars().take(100).collect();

        if elapsed_ms >= self.config.slow_query_threshold_ms {
            warn!(
                pool = %self.pool.label(),
                sql = %sql_preview,
                elapsed_ms = elapsed_ms,
                threshold_ms = self.config.slow_query_threshold_ms,
                attempt = attempt,
                "slow query detected"
            );
        } else {
            debug!(
                pool = %self.pool.label(),
                sql = %sql_preview,
                elapsed_ms = elapsed_ms,
                attempt = attempt,
                "query completed"
            );
        }
    }
}

fn exhausted(last_error: Option<NormError>) -> NormError {
    last_error.unwrap_or_else(|| NormError::Query("query failed after all retries".to_string()))
}

/// Binds a parameter slice into fresh driver arguments.
pub(crate) fn bind_params(params: &[Value]) -> Result<PgArguments> {
    let mut args = PgArguments::default();
    for param in params {
        param.bind(&mut args)?;
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_config_default() {
        let config = ExecutorConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_delay_ms, 50);
        assert_eq!(config.max_delay_ms, 2000);
        assert_eq!(config.backoff_multiplier, 2.0);
        assert_eq!(config.slow_query_threshold_ms, 1000);
    }

    #[test]
    fn test_executor_config_no_retry() {
        let config = ExecutorConfig::no_retry();
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_delay_calculation() {
        let config = ExecutorConfig {
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            ..Default::default()
        };

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
        // 100 * 2^6 = 6400, capped at 5000
        assert_eq!(config.delay_for_attempt(6), Duration::from_millis(5000));
    }

    #[test]
    fn test_bind_params_accepts_mixed_values() {
        let params = vec![Value::Int(1), Value::String("x".to_string()), Value::Null];
        assert!(bind_params(&params).is_ok());
    }
}
