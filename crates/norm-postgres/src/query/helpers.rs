//! Identifier validation, quoting, and placeholder arithmetic.

use unicode_normalization::UnicodeNormalization;

use crate::{NormError, Result};

// Reserved words that may never appear as table or column names.
const SQL_KEYWORDS: &[&str] = &[
    "select", "insert", "update", "delete", "drop", "create", "alter", "truncate", "grant",
    "revoke", "exec", "execute", "union", "declare", "table", "index", "view", "schema",
    "database", "user", "role", "from", "where", "join", "inner", "outer", "left", "right",
    "on", "using", "and", "or", "not", "in", "exists", "between", "like", "ilike", "is",
    "null", "true", "false", "case", "when", "then", "else", "end", "as", "order", "by",
    "group", "having", "limit", "offset", "distinct", "all", "any", "some",
];

/// Quotes an identifier, quoting each dot-separated part on its own so
/// qualified names (`users.name`) stay qualified.
pub fn quote_identifier(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{}\"", part))
        .collect::<Vec<_>>()
        .join(".")
}

/// Validates a simple or qualified (`a.b`) identifier.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(NormError::Query("identifier cannot be empty".to_string()));
    }

    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return Err(NormError::Query(format!(
            "invalid qualified identifier '{}': at most one dot",
            name
        )));
    }

    for part in parts {
        validate_identifier_part(part)?;
    }
    Ok(())
}

/// Validates one identifier part (no dots).
pub fn validate_identifier_part(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(NormError::Query(
            "identifier part cannot be empty".to_string(),
        ));
    }

    // NFKC normalization defuses Unicode confusables before the checks below.
    let name: String = name.nfkc().collect();

    // PostgreSQL truncates identifiers beyond 63 bytes; reject instead.
    if name.len() > 63 {
        return Err(NormError::Query(format!(
            "identifier '{}' exceeds maximum length of 63",
            name
        )));
    }

    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => {
            return Err(NormError::Query(format!(
                "identifier '{}' must start with a letter or underscore",
                name
            )))
        }
    }
    if let Some(c) = name
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '_')
    {
        return Err(NormError::Query(format!(
            "identifier '{}' contains invalid character '{}'",
            name, c
        )));
    }

    let lower = name.to_lowercase();
    if lower.starts_with("pg_") || lower == "information_schema" {
        return Err(NormError::Query(format!(
            "identifier '{}' references a system catalog",
            name
        )));
    }
    if SQL_KEYWORDS.contains(&lower.as_str()) {
        return Err(NormError::Query(format!(
            "identifier '{}' is a reserved SQL keyword",
            name
        )));
    }

    Ok(())
}

/// Shifts every `$N` placeholder in a pre-rendered SQL fragment by `offset`.
///
/// Used when a fragment authored with `$1`-based placeholders is spliced
/// behind parameters that already occupy the low indices.
pub fn adjust_param_indices(sql: &str, offset: usize) -> String {
    if offset == 0 {
        return sql.to_string();
    }

    let mut result = String::with_capacity(sql.len() + 8);
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut digits = String::new();
        while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()).copied() {
            digits.push(d);
            chars.next();
        }

        match digits.parse::<usize>() {
            Ok(n) => {
                result.push('$');
                result.push_str(&(n + offset).to_string());
            }
            Err(_) => {
                result.push('$');
                result.push_str(&digits);
            }
        }
    }

    result
}
