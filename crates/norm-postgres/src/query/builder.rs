//! QueryBuilder struct and core implementation.

use crate::value::Value;
use crate::Result;

use super::helpers::{quote_identifier, validate_identifier, validate_identifier_part};
use super::types::{Operator, OrderDirection};

/// One WHERE condition. Unary operators carry no value.
#[derive(Debug, Clone)]
pub(crate) struct WhereCondition {
    pub(crate) field: String,
    pub(crate) operator: Operator,
    pub(crate) value: Option<Value>,
}

/// An INNER JOIN target for native joins.
#[derive(Debug, Clone)]
pub(crate) struct JoinOn {
    pub(crate) left_column: String,
    pub(crate) right_table: String,
    pub(crate) right_column: String,
}

/// Parameterized SQL builder for one table.
///
/// Builders are assembled by [`crate::statement::Statement`] and render to
/// `(sql, params)` pairs; placeholders are numbered in parameter order, with
/// every condition carrying its own index, so composed clauses never need
/// textual renumbering.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    pub(crate) table: String,
    /// SELECT columns (empty means SELECT *)
    pub(crate) select_columns: Vec<String>,
    pub(crate) join: Option<JoinOn>,
    pub(crate) where_conditions: Vec<WhereCondition>,
    pub(crate) order_by_clauses: Vec<(String, OrderDirection)>,
    pub(crate) limit_value: Option<i64>,
    pub(crate) offset_value: Option<i64>,
}

impl QueryBuilder {
    /// Creates a builder for a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table name fails identifier validation.
    pub fn new(table: &str) -> Result<Self> {
        validate_identifier_part(table)?;
        Ok(Self {
            table: table.to_string(),
            select_columns: Vec::new(),
            join: None,
            where_conditions: Vec::new(),
            order_by_clauses: Vec::new(),
            limit_value: None,
            offset_value: None,
        })
    }

    /// Quotes a SQL identifier, keeping qualified names qualified.
    pub fn quote_identifier(name: &str) -> String {
        quote_identifier(name)
    }

    /// Validates a simple or qualified identifier.
    pub fn validate_identifier(name: &str) -> Result<()> {
        validate_identifier(name)
    }

    /// The target table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Renders the WHERE clause into `sql`, appending bound values to
    /// `params`. Placeholder numbers continue from `params.len()`.
    pub(crate) fn render_where(&self, sql: &mut String, params: &mut Vec<Value>) {
        if self.where_conditions.is_empty() {
            return;
        }

        sql.push_str(" WHERE ");
        let mut parts: Vec<String> = Vec::with_capacity(self.where_conditions.len());

        for cond in &self.where_conditions {
            let field = quote_identifier(&cond.field);
            let part = if cond.operator.is_unary() {
                format!("{} {}", field, cond.operator.to_sql())
            } else {
                let value = cond.value.clone().unwrap_or(Value::Null);
                params.push(value);
                match cond.operator {
                    Operator::Any => format!("{} = ANY(${})", field, params.len()),
                    op => format!("{} {} ${}", field, op.to_sql(), params.len()),
                }
            };
            parts.push(part);
        }

        sql.push_str(&parts.join(" AND "));
    }
}
