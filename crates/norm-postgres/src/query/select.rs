//! SELECT building methods for QueryBuilder.

use crate::value::Value;
use crate::Result;

use super::builder::{JoinOn, QueryBuilder, WhereCondition};
use super::helpers::{quote_identifier, validate_identifier, validate_identifier_part};
use super::types::{Operator, OrderDirection};

impl QueryBuilder {
    /// Specifies which columns to SELECT. Qualified names are allowed.
    pub fn select(mut self, columns: &[&str]) -> Result<Self> {
        for col in columns {
            validate_identifier(col)?;
            self.select_columns.push(col.to_string());
        }
        Ok(self)
    }

    /// Adds a WHERE condition.
    ///
    /// For unary operators (`IsNull`, `IsNotNull`) the value is ignored.
    pub fn filter(mut self, field: &str, operator: Operator, value: Value) -> Result<Self> {
        validate_identifier(field)?;

        let value = if operator.is_unary() { None } else { Some(value) };
        self.where_conditions.push(WhereCondition {
            field: field.to_string(),
            operator,
            value,
        });
        Ok(self)
    }

    /// Adds an ORDER BY clause.
    pub fn order_by(mut self, field: &str, direction: OrderDirection) -> Result<Self> {
        validate_identifier(field)?;
        self.order_by_clauses.push((field.to_string(), direction));
        Ok(self)
    }

    /// Sets the LIMIT.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit_value = Some(limit);
        self
    }

    /// Sets the OFFSET.
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset_value = Some(offset);
        self
    }

    /// Adds an INNER JOIN on `table.left_column = right_table.right_column`.
    pub fn join_on(
        mut self,
        left_column: &str,
        right_table: &str,
        right_column: &str,
    ) -> Result<Self> {
        validate_identifier_part(left_column)?;
        validate_identifier_part(right_table)?;
        validate_identifier_part(right_column)?;
        self.join = Some(JoinOn {
            left_column: left_column.to_string(),
            right_table: right_table.to_string(),
            right_column: right_column.to_string(),
        });
        Ok(self)
    }

    /// Builds the SELECT statement, returning `(sql, params)`.
    pub fn build_select(&self) -> (String, Vec<Value>) {
        let mut params: Vec<Value> = Vec::new();

        let columns = if self.select_columns.is_empty() {
            "*".to_string()
        } else {
            self.select_columns
                .iter()
                .map(|c| quote_identifier(c))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", columns, quote_identifier(&self.table));

        if let Some(join) = &self.join {
            sql.push_str(&format!(
                " INNER JOIN {} ON {}.{} = {}.{}",
                quote_identifier(&join.right_table),
                quote_identifier(&self.table),
                quote_identifier(&join.left_column),
                quote_identifier(&join.right_table),
                quote_identifier(&join.right_column),
            ));
        }

        self.render_where(&mut sql, &mut params);
        self.render_order_limit(&mut sql, &mut params);

        (sql, params)
    }

    /// Builds `SELECT COUNT(*)` over the same FROM/WHERE shape.
    pub fn build_count(&self) -> (String, Vec<Value>) {
        let mut params: Vec<Value> = Vec::new();
        let mut sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(&self.table));

        if let Some(join) = &self.join {
            sql.push_str(&format!(
                " INNER JOIN {} ON {}.{} = {}.{}",
                quote_identifier(&join.right_table),
                quote_identifier(&self.table),
                quote_identifier(&join.left_column),
                quote_identifier(&join.right_table),
                quote_identifier(&join.right_column),
            ));
        }

        self.render_where(&mut sql, &mut params);
        (sql, params)
    }

    pub(crate) fn render_order_limit(&self, sql: &mut String, params: &mut Vec<Value>) {
        if !self.order_by_clauses.is_empty() {
            sql.push_str(" ORDER BY ");
            let parts: Vec<String> = self
                .order_by_clauses
                .iter()
                .map(|(field, dir)| format!("{} {}", quote_identifier(field), dir.to_sql()))
                .collect();
            sql.push_str(&parts.join(", "));
        }

        if let Some(limit) = self.limit_value {
            params.push(Value::BigInt(limit));
            sql.push_str(&format!(" LIMIT ${}", params.len()));
        }

        if let Some(offset) = self.offset_value {
            params.push(Value::BigInt(offset));
            sql.push_str(&format!(" OFFSET ${}", params.len()));
        }
    }
}
