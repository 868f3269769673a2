//! Turns parsed prefix records into the literal tuple list of a VALUES clause.
//!
//! Each family supplies the ordered values of one row through
//! [`PrefixRecord::encode_row`]; this module validates the field text, checks
//! every tuple against the family's column table and renders it.

use std::{fmt, net::IpAddr};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    database::postgres::sql_type_wrapper::RibSqlTypeWrapper,
    rib::{
        bits::{address_width, truncated_bits},
        family::PrefixRecord,
        template::RibTableSchema,
    },
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("record {index}: column {column} has malformed value '{value}': {reason}")]
    MalformedField { index: usize, column: &'static str, value: String, reason: String },

    #[error("record {index}: encoded {actual} values but {table} declares {expected} columns")]
    ColumnCountMismatch { index: usize, table: &'static str, expected: usize, actual: usize },

    #[error("record {index}: a {kind} value can not be written to {column} ({sql_type})")]
    ColumnTypeMismatch {
        index: usize,
        column: &'static str,
        kind: &'static str,
        sql_type: &'static str,
    },
}

/// Literal written when a prefix bit string can not be derived.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncatedBits {
    /// `''`, what existing consumers of the RIB tables expect
    #[default]
    EmptyString,
    /// `null::varchar`
    Null,
}

impl TruncatedBits {
    fn placeholder(self) -> RibSqlTypeWrapper {
        match self {
            TruncatedBits::EmptyString => RibSqlTypeWrapper::NullableString(Some(String::new())),
            TruncatedBits::Null => RibSqlTypeWrapper::NullableString(None),
        }
    }
}

/// A field that was degraded to a placeholder while its record was still written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeDiagnostic {
    pub record_index: usize,
    pub column: &'static str,
    pub prefix: String,
    pub prefix_len: u8,
}

impl fmt::Display for EncodeDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "record {}: {} could not be derived from prefix '{}' len {}",
            self.record_index, self.column, self.prefix, self.prefix_len
        )
    }
}

/// Encoding state for a single record.
pub struct RowContext<'a> {
    index: usize,
    truncated_bits: TruncatedBits,
    diagnostics: &'a mut Vec<EncodeDiagnostic>,
}

impl<'a> RowContext<'a> {
    pub fn new(
        index: usize,
        truncated_bits: TruncatedBits,
        diagnostics: &'a mut Vec<EncodeDiagnostic>,
    ) -> Self {
        RowContext { index, truncated_bits, diagnostics }
    }

    fn malformed(&self, column: &'static str, value: &str, reason: impl Into<String>) -> EncodeError {
        EncodeError::MalformedField {
            index: self.index,
            column,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// A required content hash, written as a uuid.
    pub fn hash(&self, column: &'static str, value: &str) -> Result<RibSqlTypeWrapper, EncodeError> {
        Uuid::try_parse(value.trim())
            .map(|id| RibSqlTypeWrapper::Uuid(Some(id)))
            .map_err(|e| self.malformed(column, value, e.to_string()))
    }

    /// An optional content hash; absent or empty becomes `null::uuid`.
    pub fn optional_hash(
        &self,
        column: &'static str,
        value: Option<&str>,
    ) -> Result<RibSqlTypeWrapper, EncodeError> {
        match value.map(str::trim) {
            None | Some("") => Ok(RibSqlTypeWrapper::Uuid(None)),
            Some(value) => self.hash(column, value),
        }
    }

    /// Parses an address field; empty text is no address.
    pub fn address(&self, column: &'static str, value: &str) -> Result<Option<IpAddr>, EncodeError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed.parse::<IpAddr>().map(Some).map_err(|e| self.malformed(column, value, e.to_string()))
    }

    /// A host address column.
    pub fn host(&self, column: &'static str, value: &str) -> Result<RibSqlTypeWrapper, EncodeError> {
        let addr = self.address(column, value)?;
        Ok(RibSqlTypeWrapper::Inet(addr.map(|addr| addr.to_string())))
    }

    fn degrade(&mut self, column: &'static str, prefix: &str, prefix_len: u8) {
        self.diagnostics.push(EncodeDiagnostic {
            record_index: self.index,
            column,
            prefix: prefix.to_string(),
            prefix_len,
        });
    }

    /// A network column written as `<address>/<length>`.
    ///
    /// An IPv4 network carried with an IPv4-mapped IPv6 length (96..=128) is written in
    /// its mapped form so the literal stays a valid inet. Any other length beyond the
    /// address width is written as `null::inet` and recorded as a diagnostic.
    pub fn network(
        &mut self,
        column: &'static str,
        addr: Option<&IpAddr>,
        prefix_len: u8,
    ) -> Result<RibSqlTypeWrapper, EncodeError> {
        let Some(addr) = addr else {
            return Ok(RibSqlTypeWrapper::Inet(None));
        };

        if prefix_len <= address_width(addr) {
            return Ok(RibSqlTypeWrapper::Inet(Some(format!("{}/{}", addr, prefix_len))));
        }

        match addr {
            IpAddr::V4(v4) if (96..=128).contains(&prefix_len) => Ok(RibSqlTypeWrapper::Inet(
                Some(format!("{}/{}", v4.to_ipv6_mapped(), prefix_len)),
            )),
            _ => {
                warn!("IP prefix length exceeds the address width: {} len: {}", addr, prefix_len);
                self.degrade(column, &addr.to_string(), prefix_len);
                Ok(RibSqlTypeWrapper::Inet(None))
            }
        }
    }

    /// A MAC address in `aa:bb:cc:dd:ee:ff` (or `-` separated) form; empty becomes null.
    pub fn mac(&self, column: &'static str, value: &str) -> Result<RibSqlTypeWrapper, EncodeError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(RibSqlTypeWrapper::MacAddr(None));
        }

        let octets: Vec<&str> = trimmed.split([':', '-']).collect();
        let valid = octets.len() == 6 &&
            octets.iter().all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()));
        if !valid {
            return Err(self.malformed(column, value, "expected six hex octets"));
        }

        Ok(RibSqlTypeWrapper::MacAddr(Some(trimmed.to_lowercase())))
    }

    /// A hex text column such as an Ethernet tag, with or without a `0x` prefix.
    pub fn hex_text(
        &self,
        column: &'static str,
        value: &str,
    ) -> Result<RibSqlTypeWrapper, EncodeError> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(self.malformed(column, value, "expected hex digits"));
        }
        Ok(RibSqlTypeWrapper::String(trimmed.to_string()))
    }

    /// An MPLS label stack as a single comma separated text value.
    pub fn label_stack(
        &self,
        column: &'static str,
        value: &str,
    ) -> Result<RibSqlTypeWrapper, EncodeError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(RibSqlTypeWrapper::String(String::new()));
        }

        let mut labels = Vec::new();
        for label in trimmed.split(',') {
            let label = label.trim();
            let parsed = label.parse::<u32>().map_err(|_| {
                self.malformed(column, value, format!("label '{}' is not numeric", label))
            })?;
            labels.push(parsed.to_string());
        }

        Ok(RibSqlTypeWrapper::String(labels.join(",")))
    }

    /// The first `prefix_len` bits of the prefix address. When the address does not have
    /// that many bits the configured placeholder is written and a diagnostic recorded.
    pub fn prefix_bits(
        &mut self,
        column: &'static str,
        addr: Option<&IpAddr>,
        prefix: &str,
        prefix_len: u8,
    ) -> RibSqlTypeWrapper {
        match truncated_bits(addr, prefix_len) {
            Some(bits) => RibSqlTypeWrapper::NullableString(Some(bits)),
            None => {
                warn!("IP prefix failed to convert to bits: {} len: {}", prefix, prefix_len);
                self.degrade(column, prefix, prefix_len);
                self.truncated_bits.placeholder()
            }
        }
    }
}

/// The VALUES list for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedValues {
    pub text: String,
    pub tuples: usize,
    pub diagnostics: Vec<EncodeDiagnostic>,
}

/// Checks `values` against the column table and appends `(v1,v2,...)` to `out`.
pub fn write_tuple(
    out: &mut String,
    index: usize,
    schema: &RibTableSchema,
    values: &[RibSqlTypeWrapper],
) -> Result<(), EncodeError> {
    if values.len() != schema.columns.len() {
        return Err(EncodeError::ColumnCountMismatch {
            index,
            table: schema.table,
            expected: schema.columns.len(),
            actual: values.len(),
        });
    }

    for (column, value) in schema.columns.iter().zip(values) {
        if !value.fits(column.sql_type) {
            return Err(EncodeError::ColumnTypeMismatch {
                index,
                column: column.name,
                kind: value.raw_name(),
                sql_type: column.sql_type.as_str(),
            });
        }
    }

    out.push('(');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        value.write_literal(out);
    }
    out.push(')');

    Ok(())
}

/// Encodes one record and appends its tuple, preceded by a separator when `out` already
/// holds tuples. Nothing is written when the record fails to encode.
pub fn encode_record_into<R: PrefixRecord>(
    out: &mut String,
    index: usize,
    record: &R,
    truncated_bits: TruncatedBits,
    diagnostics: &mut Vec<EncodeDiagnostic>,
) -> Result<(), EncodeError> {
    let values = {
        let mut ctx = RowContext::new(index, truncated_bits, diagnostics);
        record.encode_row(&mut ctx)?
    };

    let mut tuple = String::new();
    write_tuple(&mut tuple, index, R::SCHEMA, &values)?;

    if !out.is_empty() {
        out.push(',');
    }
    out.push_str(&tuple);
    Ok(())
}

/// Encodes every record, in order, into one VALUES list.
pub fn encode_records<R: PrefixRecord>(
    records: &[R],
    truncated_bits: TruncatedBits,
) -> Result<EncodedValues, EncodeError> {
    let mut encoded = EncodedValues::default();

    for (index, record) in records.iter().enumerate() {
        encode_record_into(
            &mut encoded.text,
            index,
            record,
            truncated_bits,
            &mut encoded.diagnostics,
        )?;
        encoded.tuples += 1;
    }

    debug!(
        "Encoded {} {} tuples ({} bytes, {} degraded fields)",
        encoded.tuples,
        R::FAMILY,
        encoded.text.len(),
        encoded.diagnostics.len()
    );

    Ok(encoded)
}
