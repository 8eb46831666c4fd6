//! Single-pool transactions.
//!
//! Transactions never span pools; the only write shape that opens one is the
//! transactional bulk insert, which begins, executes its batches, and commits
//! on one routed pool. Dropping an uncommitted transaction rolls it back.

use sqlx::Postgres;

use crate::connection::Pool;
use crate::executor::bind_params;
use crate::value::Value;
use crate::Result;

/// An open transaction on one pool.
pub struct Transaction {
    inner: sqlx::Transaction<'static, Postgres>,
}

impl Transaction {
    /// Begins a transaction on the pool.
    pub async fn begin(pool: &Pool) -> Result<Self> {
        let inner = pool.pg().begin().await?;
        Ok(Self { inner })
    }

    /// Executes a statement inside the transaction.
    pub async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        let args = bind_params(params)?;
        let result = sqlx::query_with(sql, args)
            .execute(&mut *self.inner)
            .await?;
        Ok(result.rows_affected())
    }

    /// Commits the transaction.
    pub async fn commit(self) -> Result<()> {
        self.inner.commit().await?;
        Ok(())
    }

    /// Rolls the transaction back explicitly.
    pub async fn rollback(self) -> Result<()> {
        self.inner.rollback().await?;
        Ok(())
    }
}
