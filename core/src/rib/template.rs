use crate::{
    database::{
        batch_operations::{column_names, distinct_columns, sequence_column, ColumnDefinition},
        postgres::batch_operations::{
            build_conflict_clause, build_distinct_select, build_insert_header, build_order_by,
            build_upsert_set_clauses, build_values_alias, format_table_name,
        },
    },
    rib::family::AddressFamily,
};

/// Static description of one RIB table: its columns in canonical order, the conflict
/// target and the column that flags a withdrawal.
#[derive(Debug, PartialEq, Eq)]
pub struct RibTableSchema {
    pub family: AddressFamily,
    pub table: &'static str,
    pub columns: &'static [ColumnDefinition],
    pub conflict_columns: &'static [&'static str],
    pub withdrawn_column: &'static str,
}

impl RibTableSchema {
    pub fn column_names(&self) -> Vec<&'static str> {
        column_names(self.columns)
    }
}

/// The fixed text around the VALUES list of a family's upsert statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementTemplate {
    family: AddressFamily,
    table: String,
    prefix: String,
    suffix: String,
    column_count: usize,
}

impl StatementTemplate {
    /// Builds the template for the schema's default table.
    pub fn new(schema: &RibTableSchema) -> Self {
        Self::for_target(schema, None, None)
    }

    /// Builds the template writing into `db_schema.table`, where `table` defaults to the
    /// schema's own table name.
    pub fn for_target(
        schema: &RibTableSchema,
        db_schema: Option<&str>,
        table: Option<&str>,
    ) -> Self {
        let table = table.filter(|t| !t.is_empty()).unwrap_or(schema.table);
        let formatted_table_name = format_table_name(db_schema, table);

        let names = schema.column_names();
        let distinct = distinct_columns(schema.columns);
        let sequence = sequence_column(schema.columns);

        let mut prefix = build_insert_header(&formatted_table_name, &names);
        prefix.push_str(&build_distinct_select(&distinct));

        let update_clauses =
            build_upsert_set_clauses(schema.columns, table, schema.withdrawn_column);

        let mut suffix = build_values_alias(&names);
        suffix.push_str(&build_order_by(&distinct, sequence));
        suffix.push_str(&build_conflict_clause(schema.conflict_columns, &update_clauses));

        StatementTemplate {
            family: schema.family,
            table: formatted_table_name,
            prefix,
            suffix,
            column_count: names.len(),
        }
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    /// The possibly schema-qualified target table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Statement text through the opening of the value list.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Statement text closing the value list, with the dedup and merge clauses.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }
}
