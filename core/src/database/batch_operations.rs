/// Column behavior determines how columns are used in deduplication and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperationColumnBehavior {
    /// Normal column with no special behavior
    Normal,
    /// Column used for deduplication (DISTINCT ON)
    Distinct,
    /// Column used for ordering (the newest value wins when deduplicating)
    Sequence,
}

/// SQL type of a column as declared in the target RIB table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperationSqlType {
    Uuid,
    Inet,
    Macaddr,
    Bool,
    Bigint,
    Integer,
    Smallint,
    Varchar,
    Timestamp,
}

impl BatchOperationSqlType {
    /// Returns the PostgreSQL type string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchOperationSqlType::Uuid => "uuid",
            BatchOperationSqlType::Inet => "inet",
            BatchOperationSqlType::Macaddr => "macaddr",
            BatchOperationSqlType::Bool => "boolean",
            BatchOperationSqlType::Bigint => "bigint",
            BatchOperationSqlType::Integer => "integer",
            BatchOperationSqlType::Smallint => "smallint",
            BatchOperationSqlType::Varchar => "varchar",
            BatchOperationSqlType::Timestamp => "timestamp",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            BatchOperationSqlType::Bigint |
                BatchOperationSqlType::Integer |
                BatchOperationSqlType::Smallint
        )
    }
}

/// Action to perform on a column when the row already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperationAction {
    /// Column is inserted but never updated on conflict
    Nothing,
    /// Overwrite with the incoming value
    Set,
    /// Overwrite with the incoming value unless the incoming row is a withdrawal,
    /// in which case the stored value is kept
    KeepOnWithdraw,
}

/// Definition of a column in a RIB table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: &'static str,
    pub sql_type: BatchOperationSqlType,
    pub behavior: BatchOperationColumnBehavior,
    pub action: BatchOperationAction,
}

/// Creates a column definition for batch operations.
pub const fn column(
    name: &'static str,
    sql_type: BatchOperationSqlType,
    behavior: BatchOperationColumnBehavior,
    action: BatchOperationAction,
) -> ColumnDefinition {
    ColumnDefinition { name, sql_type, behavior, action }
}

/// Shorthand for a normal column with the given conflict action.
pub const fn plain(
    name: &'static str,
    sql_type: BatchOperationSqlType,
    action: BatchOperationAction,
) -> ColumnDefinition {
    column(name, sql_type, BatchOperationColumnBehavior::Normal, action)
}

/// Reserved SQL keywords that need quoting.
pub const RESERVED_KEYWORDS: &[&str] =
    &["group", "user", "order", "table", "index", "primary", "key"];

/// Column names in declaration order.
pub fn column_names(columns: &[ColumnDefinition]) -> Vec<&'static str> {
    columns.iter().map(|col| col.name).collect()
}

pub fn distinct_columns(columns: &[ColumnDefinition]) -> Vec<&'static str> {
    columns
        .iter()
        .filter_map(|col| match col.behavior {
            BatchOperationColumnBehavior::Distinct => Some(col.name),
            _ => None,
        })
        .collect()
}

pub fn sequence_column(columns: &[ColumnDefinition]) -> Option<&'static str> {
    columns.iter().find_map(|col| match col.behavior {
        BatchOperationColumnBehavior::Sequence => Some(col.name),
        _ => None,
    })
}
