//! Error types for norm

use thiserror::Error;

/// Result type alias for norm operations
pub type Result<T> = std::result::Result<T, NormError>;

/// Unified error type for all norm operations
#[derive(Error, Debug, Clone)]
pub enum NormError {
    // Registration errors, returned by topology and model registry builders.
    /// A registration tried to switch between global and shard topology.
    #[error("Mode conflict: {0}")]
    ModeConflict(String),

    /// A registration mixed mutually exclusive roles (primary vs read/write,
    /// shard primary vs shard standalone).
    #[error("Role conflict: {0}")]
    RoleConflict(String),

    /// The same pool slot or assignment already exists.
    #[error("Duplicate registration: {0}")]
    Duplicate(String),

    /// A table assignment references a shard the topology does not know.
    #[error("Invalid shard: {0}")]
    InvalidShard(String),

    // Routing errors. A query carrying one of these never executes.
    #[error("Unregistered table: {0}")]
    UnregisteredTable(String),

    #[error("No pool available: {0}")]
    NoPool(String),

    #[error("Unknown topology mode: {0}")]
    UnknownMode(String),

    // Planning errors, surfaced before any fetch is issued.
    /// ORDER BY names a column that was not projected into the merged set.
    #[error("Order by unprojected column: {0}")]
    UnprojectedOrder(String),

    /// The two sides of a join cannot be reconciled.
    #[error("Incompatible join: {0}")]
    IncompatibleJoin(String),

    #[error("Query error: {0}")]
    Query(String),

    /// Row-to-structure binding failure (no row, type mismatch, bad destination).
    #[error("Scan error: {0}")]
    Scan(String),

    /// Aggregated per-pool, per-table migration failures. Partial success is
    /// possible and is not rolled back.
    #[error("Migration failed: {}", .0.join("; "))]
    Migration(Vec<String>),

    /// Normal cache miss. Not a user-visible failure.
    #[error("Cache miss")]
    CacheMiss,

    /// Transport failure of a network-backed cache.
    #[error("Cache transport error: {0}")]
    Cache(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Unique constraint violation (SQLSTATE 23505)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Foreign key constraint violation (SQLSTATE 23503, 23502)
    #[error("Foreign key constraint violation: {0}")]
    ForeignKey(String),

    /// Deadlock detected (SQLSTATE 40P01) - retryable
    #[error("Deadlock detected: {0}")]
    Deadlock(String),

    /// Connection timeout - retryable
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Transient error that may succeed on retry
    #[error("Transient error: {0}")]
    Transient(String),

    /// The caller's cancellation token fired mid-operation.
    #[error("Operation cancelled")]
    Cancelled,
}

impl NormError {
    /// Returns true if this error is potentially retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NormError::Deadlock(_) | NormError::Timeout(_) | NormError::Transient(_)
        )
    }

    /// Returns true if this is a constraint violation error
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, NormError::Conflict(_) | NormError::ForeignKey(_))
    }

    /// Returns true if this error came out of a registry builder
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            NormError::ModeConflict(_)
                | NormError::RoleConflict(_)
                | NormError::Duplicate(_)
                | NormError::InvalidShard(_)
        )
    }

    /// Returns true if this error came out of the router
    pub fn is_routing_error(&self) -> bool {
        matches!(
            self,
            NormError::UnregisteredTable(_) | NormError::NoPool(_) | NormError::UnknownMode(_)
        )
    }

    /// Returns true if this error came out of the join planner
    pub fn is_planning_error(&self) -> bool {
        matches!(
            self,
            NormError::UnprojectedOrder(_) | NormError::IncompatibleJoin(_)
        )
    }
}

impl From<serde_json::Error> for NormError {
    fn from(err: serde_json::Error) -> Self {
        NormError::Serialization(err.to_string())
    }
}

// PostgreSQL-specific error conversions (when postgres-errors feature is enabled)
#[cfg(feature = "postgres-errors")]
impl From<sqlx::Error> for NormError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::Error;
        match &err {
            Error::Configuration(_) => NormError::Connection(err.to_string()),
            Error::Database(db_err) => {
                // Classify based on PostgreSQL SQLSTATE codes
                // See: https://www.postgresql.org/docs/current/errcodes-appendix.html
                if let Some(code) = db_err.code() {
                    let code_str: &str = &code;
                    match code_str {
                        // Unique constraint violation
                        "23505" => return NormError::Conflict(err.to_string()),
                        // Foreign key violation
                        "23503" => return NormError::ForeignKey(err.to_string()),
                        // Not null violation
                        "23502" => return NormError::Validation(err.to_string()),
                        // Check constraint violation
                        "23514" => return NormError::Validation(err.to_string()),
                        // Exclusion constraint violation
                        "23P01" => return NormError::Conflict(err.to_string()),
                        // Deadlock detected
                        "40P01" => return NormError::Deadlock(err.to_string()),
                        // Serialization failure (can retry)
                        "40001" => return NormError::Transient(err.to_string()),
                        // Transaction rollback - deadlock or serialization
                        code if code.starts_with("40") => {
                            return NormError::Transient(err.to_string())
                        }
                        // Connection errors (class 08)
                        code if code.starts_with("08") => {
                            return NormError::Connection(err.to_string())
                        }
                        // Operator intervention / admin shutdown (class 57)
                        "57P01" | "57P02" | "57P03" => {
                            return NormError::Transient(err.to_string())
                        }
                        _ => {}
                    }
                }
                NormError::Database(err.to_string())
            }
            Error::Io(_) => NormError::Connection(err.to_string()),
            Error::Tls(_) => NormError::Connection(err.to_string()),
            Error::Protocol(_) => NormError::Connection(err.to_string()),
            Error::RowNotFound => NormError::Scan("no row available".to_string()),
            Error::TypeNotFound { .. } => NormError::Serialization(err.to_string()),
            Error::ColumnIndexOutOfBounds { .. } => NormError::Query(err.to_string()),
            Error::ColumnNotFound(_) => NormError::Query(err.to_string()),
            Error::ColumnDecode { .. } => NormError::Scan(err.to_string()),
            Error::Decode(_) => NormError::Scan(err.to_string()),
            Error::PoolTimedOut => NormError::Timeout("connection pool timed out".to_string()),
            Error::PoolClosed => NormError::Connection("connection pool closed".to_string()),
            Error::WorkerCrashed => NormError::Internal("worker thread crashed".to_string()),
            _ => NormError::Database(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_mode_conflict() {
        let err = NormError::ModeConflict("shard pools exist".to_string());
        assert_eq!(err.to_string(), "Mode conflict: shard pools exist");
    }

    #[test]
    fn test_error_display_role_conflict() {
        let err = NormError::RoleConflict("primary vs read".to_string());
        assert_eq!(err.to_string(), "Role conflict: primary vs read");
    }

    #[test]
    fn test_error_display_duplicate() {
        let err = NormError::Duplicate("primary".to_string());
        assert_eq!(err.to_string(), "Duplicate registration: primary");
    }

    #[test]
    fn test_error_display_routing() {
        let err = NormError::UnregisteredTable("users".to_string());
        assert_eq!(err.to_string(), "Unregistered table: users");

        let err = NormError::NoPool("shard s1".to_string());
        assert_eq!(err.to_string(), "No pool available: shard s1");
    }

    #[test]
    fn test_error_display_migration_joins_failures() {
        let err = NormError::Migration(vec![
            "primary: users: boom".to_string(),
            "replica0: orders: boom".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Migration failed: primary: users: boom; replica0: orders: boom"
        );
    }

    #[test]
    fn test_error_display_cache_miss() {
        assert_eq!(NormError::CacheMiss.to_string(), "Cache miss");
    }

    #[test]
    fn test_is_retryable() {
        assert!(NormError::Deadlock("test".to_string()).is_retryable());
        assert!(NormError::Timeout("test".to_string()).is_retryable());
        assert!(NormError::Transient("test".to_string()).is_retryable());
        assert!(!NormError::Conflict("test".to_string()).is_retryable());
        assert!(!NormError::Query("test".to_string()).is_retryable());
        assert!(!NormError::CacheMiss.is_retryable());
    }

    #[test]
    fn test_is_constraint_violation() {
        assert!(NormError::Conflict("test".to_string()).is_constraint_violation());
        assert!(NormError::ForeignKey("test".to_string()).is_constraint_violation());
        assert!(!NormError::Deadlock("test".to_string()).is_constraint_violation());
    }

    #[test]
    fn test_error_families() {
        assert!(NormError::ModeConflict("m".into()).is_registration_error());
        assert!(NormError::InvalidShard("s".into()).is_registration_error());
        assert!(!NormError::Query("q".into()).is_registration_error());

        assert!(NormError::NoPool("p".into()).is_routing_error());
        assert!(NormError::UnknownMode("u".into()).is_routing_error());
        assert!(!NormError::NoPool("p".into()).is_planning_error());

        assert!(NormError::UnprojectedOrder("c".into()).is_planning_error());
        assert!(NormError::IncompatibleJoin("j".into()).is_planning_error());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: NormError = json_err.into();
        assert!(matches!(err, NormError::Serialization(_)));
    }
}
