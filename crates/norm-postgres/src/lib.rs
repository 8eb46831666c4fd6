//! Topology-aware PostgreSQL data-access core.
//!
//! norm-postgres sits between application code and one or more PostgreSQL
//! servers arranged in one of three topologies: a single primary with read
//! replicas, a read/write split pool, or named shards each owning a subset
//! of tables. Application code talks to a fluent statement surface; the
//! routing core maps every logical operation onto a concrete connection pool.
//!
//! # Architecture
//!
//! ```text
//! Statement (fluent surface)
//!     |          \
//!  Router      Join planner ---- app-side fetch & merge
//!     |          /
//! Topology + model registries (Engine)
//!     |
//!  Pool (sqlx PgPool)
//! ```
//!
//! # Key features
//!
//! - **Topology registry**: process-wide pools grouped by role (primary,
//!   replicas, read pools, one write pool) or by named shard (a primary or
//!   per-table standalone pools), with strict mode and role exclusivity.
//! - **Model registry**: declarative table descriptors with a compact field
//!   tag grammar (`pk;auto`, `fkey:users.id`, `skey:users.id`, ...), derived
//!   table names, and shard role assignments.
//! - **Query router**: deterministic pool selection with fallback chains
//!   (primary then replicas; read pools then write; shard standalone then
//!   shard primary).
//! - **Join planner**: native single-pool joins where legal, otherwise an
//!   app-side join (left fetch, keyed right fetch, in-memory inner join with
//!   SQL semantics).
//! - **Auto-migration**: dependency-aware CREATE/ALTER fan-out across all
//!   relevant pools in parallel, with aggregated error reporting.
//! - **Query cache**: content-fingerprinted read-through cache with glob
//!   pattern invalidation, in-process or Redis-backed.
//!
//! # Example
//!
//! ```rust,ignore
//! use norm_postgres::{PoolBuilder, Statement, Operator, Value};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> norm_postgres::Result<()> {
//! PoolBuilder::new("postgresql://localhost/app").register_write().await?;
//! PoolBuilder::new("postgresql://replica1/app").register_read().await?;
//!
//! let ctx = CancellationToken::new();
//! let rows = Statement::table("users")?
//!     .select(&["id", "name"])?
//!     .filter("active", Operator::Eq, Value::Bool(true))?
//!     .all(&ctx)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Debugging
//!
//! Setting `NORM_DEBUG=true|1|on` prints one trace line per routing, join
//! planning, and cache decision to standard output. Error logs go through
//! `tracing` regardless.
//!
//! # Thread safety
//!
//! The registries are guarded by reader-writer locks; registration is meant
//! to be a one-shot startup phase, after which any number of concurrent
//! operations may route and execute. Pools are cheap to clone and share.

/// Connection pools with identity, retry and ping-on-create.
pub mod connection;

/// The engine: topology + models + cacher behind one value, with a global
/// facade.
pub mod engine;

/// Topology registry: global role slots or named shards.
pub mod topology;

/// Table/model registry: descriptors, tag grammar, role assignments.
pub mod model;

/// Pure routing rules from (table, operation kind) to a pool.
pub mod router;

/// Join planning and app-side join execution.
pub mod planner;

/// Parameterized SQL building.
pub mod query;

/// SQL value representation and driver binding.
pub mod value;

/// Result rows and struct scanning.
pub mod row;

/// The fluent statement surface.
pub mod statement;

/// Query execution with retry, cancellation and slow-query logging.
pub mod executor;

/// Single-pool transactions.
pub mod transaction;

/// Batched bulk insert.
pub mod bulk;

/// Dependency-aware parallel schema migration.
pub mod migrate;

/// Content-addressed query cache with pattern invalidation.
pub mod cache;

/// NORM_DEBUG trace gate.
pub mod debug;

pub use connection::{Pool, PoolConfig, RetryConfig};
pub use engine::Engine;
pub use topology::{GlobalPools, Mode, PoolBuilder, ShardPoolBuilder, ShardPools, Topology};
pub use model::{
    derived_table_name, FieldDescriptor, Model, ModelRegistry, Relation, RelationKind, Role,
    SqlType, TableDescriptor,
};
pub use router::{route, OpKind};
pub use planner::{JoinSpec, JoinStrategy};
pub use query::{Operator, OrderDirection, QueryBuilder};
pub use value::Value;
pub use row::Row;
pub use statement::Statement;
pub use executor::{Executor, ExecutorConfig};
pub use transaction::Transaction;
pub use bulk::{BulkConfig, BulkResult};
pub use migrate::{MigrateConfig, MigrationPlan, MigrationReport, Migrator};
pub use cache::{Cacher, MemoryCache};
#[cfg(feature = "redis")]
pub use cache::RedisCache;

pub use norm_common::{NormError, Result};
