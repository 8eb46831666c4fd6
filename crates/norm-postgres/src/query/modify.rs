//! INSERT, UPDATE, DELETE building methods for QueryBuilder.

use crate::value::Value;
use crate::{NormError, Result};

use super::builder::QueryBuilder;
use super::helpers::{quote_identifier, validate_identifier_part};

impl QueryBuilder {
    /// Builds a single-row INSERT with `RETURNING *`.
    pub fn build_insert(&self, values: &[(String, Value)]) -> Result<(String, Vec<Value>)> {
        if values.is_empty() {
            return Err(NormError::Query(
                "cannot insert with no values".to_string(),
            ));
        }

        for (col, _) in values {
            validate_identifier_part(col)?;
        }

        let mut sql = format!("INSERT INTO {} (", quote_identifier(&self.table));
        let columns: Vec<String> = values.iter().map(|(col, _)| quote_identifier(col)).collect();
        sql.push_str(&columns.join(", "));
        sql.push_str(") VALUES (");

        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("${}", i)).collect();
        sql.push_str(&placeholders.join(", "));
        sql.push_str(") RETURNING *");

        let params: Vec<Value> = values.iter().map(|(_, v)| v.clone()).collect();
        Ok((sql, params))
    }

    /// Builds a multi-row INSERT over a fixed column list.
    ///
    /// Every row must carry exactly one value per column; rows are rendered
    /// as consecutive `(...)` tuples sharing one placeholder sequence.
    pub fn build_insert_many(
        &self,
        columns: &[String],
        rows: &[Vec<Value>],
    ) -> Result<(String, Vec<Value>)> {
        if columns.is_empty() {
            return Err(NormError::Query(
                "cannot insert with no columns".to_string(),
            ));
        }
        if rows.is_empty() {
            return Err(NormError::Query("cannot insert zero rows".to_string()));
        }

        for col in columns {
            validate_identifier_part(col)?;
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(NormError::Query(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    columns.len()
                )));
            }
        }

        let quoted: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ",
            quote_identifier(&self.table),
            quoted.join(", ")
        );

        let mut params: Vec<Value> = Vec::with_capacity(rows.len() * columns.len());
        let mut tuples: Vec<String> = Vec::with_capacity(rows.len());

        for row in rows {
            let mut placeholders = Vec::with_capacity(columns.len());
            for value in row {
                params.push(value.clone());
                placeholders.push(format!("${}", params.len()));
            }
            tuples.push(format!("({})", placeholders.join(", ")));
        }

        sql.push_str(&tuples.join(", "));
        Ok((sql, params))
    }

    /// Builds an UPDATE.
    ///
    /// SET bindings take the low placeholder indices; the WHERE clause is
    /// rendered after them, so its conditions pick up shifted indices
    /// structurally rather than by rewriting SQL text.
    pub fn build_update(&self, values: &[(String, Value)]) -> Result<(String, Vec<Value>)> {
        if values.is_empty() {
            return Err(NormError::Query(
                "cannot update with no values".to_string(),
            ));
        }

        for (col, _) in values {
            validate_identifier_part(col)?;
        }

        let mut sql = format!("UPDATE {} SET ", quote_identifier(&self.table));
        let mut params: Vec<Value> = Vec::new();

        let set_parts: Vec<String> = values
            .iter()
            .map(|(col, value)| {
                params.push(value.clone());
                format!("{} = ${}", quote_identifier(col), params.len())
            })
            .collect();
        sql.push_str(&set_parts.join(", "));

        self.render_where(&mut sql, &mut params);
        Ok((sql, params))
    }

    /// Builds a DELETE.
    pub fn build_delete(&self) -> (String, Vec<Value>) {
        let mut sql = format!("DELETE FROM {}", quote_identifier(&self.table));
        let mut params: Vec<Value> = Vec::new();
        self.render_where(&mut sql, &mut params);
        (sql, params)
    }
}
