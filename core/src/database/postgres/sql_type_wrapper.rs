use std::fmt;

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::database::batch_operations::BatchOperationSqlType;

/// Timestamp layout written into `::timestamp` literals.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// A single value of a VALUES tuple, rendered as an inline SQL literal.
///
/// Optional variants render as a typed `null` so the untyped VALUES list still
/// resolves to the column's type.
#[derive(Debug, Clone, PartialEq)]
pub enum RibSqlTypeWrapper {
    Uuid(Option<Uuid>),
    Inet(Option<String>),
    MacAddr(Option<String>),
    Bool(bool),
    U32(u32),
    U8(u8),
    String(String),
    /// Variable-length text that may be replaced by a typed null.
    NullableString(Option<String>),
    DateTime(NaiveDateTime),
}

impl RibSqlTypeWrapper {
    pub fn raw_name(&self) -> &'static str {
        match self {
            RibSqlTypeWrapper::Uuid(_) => "Uuid",
            RibSqlTypeWrapper::Inet(_) => "Inet",
            RibSqlTypeWrapper::MacAddr(_) => "MacAddr",
            RibSqlTypeWrapper::Bool(_) => "Bool",
            RibSqlTypeWrapper::U32(_) => "U32",
            RibSqlTypeWrapper::U8(_) => "U8",
            RibSqlTypeWrapper::String(_) => "String",
            RibSqlTypeWrapper::NullableString(_) => "NullableString",
            RibSqlTypeWrapper::DateTime(_) => "DateTime",
        }
    }

    /// Whether this value may be written into a column of the given type.
    pub fn fits(&self, sql_type: BatchOperationSqlType) -> bool {
        match self {
            RibSqlTypeWrapper::Uuid(_) => sql_type == BatchOperationSqlType::Uuid,
            RibSqlTypeWrapper::Inet(_) => sql_type == BatchOperationSqlType::Inet,
            RibSqlTypeWrapper::MacAddr(_) => sql_type == BatchOperationSqlType::Macaddr,
            RibSqlTypeWrapper::Bool(_) => sql_type == BatchOperationSqlType::Bool,
            RibSqlTypeWrapper::U32(_) | RibSqlTypeWrapper::U8(_) => sql_type.is_numeric(),
            RibSqlTypeWrapper::String(_) | RibSqlTypeWrapper::NullableString(_) => {
                sql_type == BatchOperationSqlType::Varchar
            }
            RibSqlTypeWrapper::DateTime(_) => sql_type == BatchOperationSqlType::Timestamp,
        }
    }

    /// Appends the literal form of this value to `out`.
    pub fn write_literal(&self, out: &mut String) {
        match self {
            RibSqlTypeWrapper::Uuid(Some(value)) => {
                out.push('\'');
                out.push_str(&value.as_hyphenated().to_string());
                out.push_str("'::uuid");
            }
            RibSqlTypeWrapper::Uuid(None) => out.push_str("null::uuid"),
            RibSqlTypeWrapper::Inet(Some(value)) => {
                push_quoted(out, value);
                out.push_str("::inet");
            }
            RibSqlTypeWrapper::Inet(None) => out.push_str("null::inet"),
            RibSqlTypeWrapper::MacAddr(Some(value)) => {
                push_quoted(out, value);
                out.push_str("::macaddr");
            }
            RibSqlTypeWrapper::MacAddr(None) => out.push_str("null::macaddr"),
            RibSqlTypeWrapper::Bool(value) => {
                out.push_str(if *value { "true" } else { "false" });
                out.push_str("::boolean");
            }
            RibSqlTypeWrapper::U32(value) => out.push_str(&value.to_string()),
            RibSqlTypeWrapper::U8(value) => out.push_str(&value.to_string()),
            RibSqlTypeWrapper::String(value) | RibSqlTypeWrapper::NullableString(Some(value)) => {
                push_quoted(out, value)
            }
            RibSqlTypeWrapper::NullableString(None) => out.push_str("null::varchar"),
            RibSqlTypeWrapper::DateTime(value) => {
                out.push('\'');
                out.push_str(&value.format(TIMESTAMP_FORMAT).to_string());
                out.push_str("'::timestamp");
            }
        }
    }

    pub fn to_literal(&self) -> String {
        let mut out = String::new();
        self.write_literal(&mut out);
        out
    }
}

impl fmt::Display for RibSqlTypeWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

/// Writes `value` as a single-quoted SQL string, doubling embedded quotes.
fn push_quoted(out: &mut String, value: &str) {
    out.push('\'');
    for c in value.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_uuid_literals() {
        let id = Uuid::parse_str("0123456789abcdef0123456789abcdef").unwrap();
        assert_eq!(
            RibSqlTypeWrapper::Uuid(Some(id)).to_literal(),
            "'01234567-89ab-cdef-0123-456789abcdef'::uuid"
        );
        assert_eq!(RibSqlTypeWrapper::Uuid(None).to_literal(), "null::uuid");
    }

    #[test]
    fn test_null_is_never_an_empty_string() {
        for value in [
            RibSqlTypeWrapper::Uuid(None),
            RibSqlTypeWrapper::Inet(None),
            RibSqlTypeWrapper::MacAddr(None),
            RibSqlTypeWrapper::NullableString(None),
        ] {
            assert!(value.to_literal().starts_with("null::"));
        }
    }

    #[test]
    fn test_bool_and_numbers() {
        assert_eq!(RibSqlTypeWrapper::Bool(true).to_literal(), "true::boolean");
        assert_eq!(RibSqlTypeWrapper::Bool(false).to_literal(), "false::boolean");
        assert_eq!(RibSqlTypeWrapper::U32(65001).to_literal(), "65001");
        assert_eq!(RibSqlTypeWrapper::U8(24).to_literal(), "24");
    }

    #[test]
    fn test_strings_are_escaped() {
        assert_eq!(RibSqlTypeWrapper::String("100:1".into()).to_literal(), "'100:1'");
        assert_eq!(RibSqlTypeWrapper::String("it's".into()).to_literal(), "'it''s'");
        assert_eq!(RibSqlTypeWrapper::String(String::new()).to_literal(), "''");
    }

    #[test]
    fn test_timestamp_literal() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_micro_opt(12, 30, 5, 250)
            .unwrap();
        assert_eq!(
            RibSqlTypeWrapper::DateTime(ts).to_literal(),
            "'2024-03-01 12:30:05.000250'::timestamp"
        );
    }

    #[test]
    fn test_fits() {
        assert!(RibSqlTypeWrapper::U32(1).fits(BatchOperationSqlType::Bigint));
        assert!(RibSqlTypeWrapper::Inet(None).fits(BatchOperationSqlType::Inet));
        assert!(!RibSqlTypeWrapper::String("x".into()).fits(BatchOperationSqlType::Uuid));
    }
}
