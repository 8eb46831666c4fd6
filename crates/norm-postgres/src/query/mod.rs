//! SQL building.
//!
//! `QueryBuilder` renders parameterized PostgreSQL statements with numbered
//! placeholders. It is purely textual: routing, caching and execution live a
//! level up in [`crate::statement`]. Every identifier that reaches SQL text
//! goes through validation and quoting first.
//!
//! # Examples
//!
//! ```ignore
//! use norm_postgres::query::{QueryBuilder, Operator, OrderDirection};
//! use norm_postgres::Value;
//!
//! let qb = QueryBuilder::new("users")?
//!     .select(&["id", "name"])?
//!     .filter("age", Operator::Gte, Value::Int(18))?
//!     .order_by("name", OrderDirection::Asc)?
//!     .limit(10);
//!
//! let (sql, params) = qb.build_select();
//! // SELECT "id", "name" FROM "users" WHERE "age" >= $1 ORDER BY "name" ASC LIMIT $2
//! ```

pub mod helpers;

mod builder;
mod modify;
mod select;
mod types;


pub use builder::QueryBuilder;
pub use types::{Operator, OrderDirection};
