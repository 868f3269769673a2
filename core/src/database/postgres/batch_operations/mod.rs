//! PostgreSQL batch upsert building blocks.
//!
//! This module provides the clause builders used to turn a RIB column table
//! into the fixed prefix and suffix of a deduplicating, withdrawal-aware
//! `INSERT ... ON CONFLICT` statement.

mod query_builder;

pub use query_builder::{
    build_conflict_clause, build_distinct_select, build_insert_header, build_order_by,
    build_upsert_set_clause, build_upsert_set_clauses, build_values_alias, format_table_name,
    quote_identifier, UpsertClauseType,
};
