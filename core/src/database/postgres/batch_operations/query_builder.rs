//! SQL clause builders for the bulk RIB upsert statements.
//!
//! A statement is assembled as
//! `INSERT INTO <table> (<cols>) SELECT DISTINCT ON (<distinct>) * FROM ( VALUES <rows> ) t(<cols>)
//! ORDER BY <distinct>[, <sequence> DESC] ON CONFLICT (<keys>) DO UPDATE SET ...`.
//! Everything before `<rows>` is the prefix, everything after it the suffix.

use crate::database::batch_operations::{
    BatchOperationAction, ColumnDefinition, RESERVED_KEYWORDS,
};

/// Quotes an identifier if it's a reserved keyword.
#[inline]
pub fn quote_identifier(name: &str) -> String {
    if RESERVED_KEYWORDS.contains(&name) {
        format!("\"{}\"", name)
    } else {
        name.to_string()
    }
}

/// Formats a table name, handling an optional schema.
pub fn format_table_name(schema: Option<&str>, table_name: &str) -> String {
    match schema {
        Some(schema) if !schema.is_empty() => {
            format!("\"{}\".\"{}\"", schema.trim_matches('"'), table_name.trim_matches('"'))
        }
        _ => table_name.to_string(),
    }
}

fn join_identifiers(columns: &[&str]) -> String {
    columns.iter().map(|col| quote_identifier(col)).collect::<Vec<_>>().join(", ")
}

/// Builds `INSERT INTO table (col1, col2, ...) `
pub fn build_insert_header(formatted_table_name: &str, column_names: &[&str]) -> String {
    format!("INSERT INTO {} ({}) ", formatted_table_name, join_identifiers(column_names))
}

/// Builds the opening of the deduplicating select over the inline value list.
pub fn build_distinct_select(distinct_cols: &[&str]) -> String {
    if distinct_cols.is_empty() {
        "SELECT * FROM ( VALUES ".to_string()
    } else {
        format!("SELECT DISTINCT ON ({}) * FROM ( VALUES ", join_identifiers(distinct_cols))
    }
}

/// Closes the value list and names its columns: `) t(col1, col2, ...)`
pub fn build_values_alias(column_names: &[&str]) -> String {
    format!(") t({})", join_identifiers(column_names))
}

/// Builds the ordering that decides which duplicate survives `DISTINCT ON`.
pub fn build_order_by(distinct_cols: &[&str], sequence_col: Option<&str>) -> String {
    if distinct_cols.is_empty() {
        return String::new();
    }

    match sequence_col {
        Some(seq_col) => format!(
            " ORDER BY {}, {} DESC",
            join_identifiers(distinct_cols),
            quote_identifier(seq_col)
        ),
        None => format!(" ORDER BY {}", join_identifiers(distinct_cols)),
    }
}

/// Type of upsert SET clause to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertClauseType {
    Set,
    KeepOnWithdraw,
}

impl UpsertClauseType {
    pub fn from_action(action: BatchOperationAction) -> Option<Self> {
        match action {
            BatchOperationAction::Nothing => None,
            BatchOperationAction::Set => Some(UpsertClauseType::Set),
            BatchOperationAction::KeepOnWithdraw => Some(UpsertClauseType::KeepOnWithdraw),
        }
    }
}

/// Builds an upsert SET clause.
///
/// `table_ref` is the unqualified target table name, which is how Postgres exposes the
/// existing row inside `DO UPDATE`.
pub fn build_upsert_set_clause(
    col: &str,
    table_ref: &str,
    withdrawn_col: &str,
    clause_type: UpsertClauseType,
) -> String {
    let column_name = quote_identifier(col);

    match clause_type {
        UpsertClauseType::Set => format!("{}=excluded.{}", column_name, column_name),
        UpsertClauseType::KeepOnWithdraw => format!(
            "{col}=CASE excluded.{withdrawn} WHEN true THEN {table}.{col} ELSE excluded.{col} END",
            col = column_name,
            withdrawn = quote_identifier(withdrawn_col),
            table = table_ref,
        ),
    }
}

/// Builds every SET clause for the given columns, in column order.
pub fn build_upsert_set_clauses(
    columns: &[ColumnDefinition],
    table_ref: &str,
    withdrawn_col: &str,
) -> Vec<String> {
    columns
        .iter()
        .filter_map(|col| {
            UpsertClauseType::from_action(col.action)
                .map(|clause| build_upsert_set_clause(col.name, table_ref, withdrawn_col, clause))
        })
        .collect()
}

/// Builds `ON CONFLICT (...) DO UPDATE SET ...`, or `DO NOTHING` without update clauses.
pub fn build_conflict_clause(conflict_columns: &[&str], update_clauses: &[String]) -> String {
    if conflict_columns.is_empty() {
        return " ON CONFLICT DO NOTHING".to_string();
    }

    let mut clause = format!(" ON CONFLICT ({})", join_identifiers(conflict_columns));
    if update_clauses.is_empty() {
        clause.push_str(" DO NOTHING");
    } else {
        clause.push_str(" DO UPDATE SET ");
        clause.push_str(&update_clauses.join(", "));
    }

    clause
}
