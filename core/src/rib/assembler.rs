use std::{fmt, marker::PhantomData};

use tracing::debug;

use crate::rib::{
    encode::{encode_record_into, EncodeDiagnostic, EncodeError, TruncatedBits},
    family::{AddressFamily, PrefixRecord},
    template::StatementTemplate,
};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AssembleError {
    #[error("{declared} records were declared but the value list is empty")]
    EmptyValues { declared: usize },

    #[error("Template for {template} can not be used for {records} records")]
    FamilyMismatch { template: AddressFamily, records: AddressFamily },

    #[error("Template for {table} has {template} columns but its records encode {records}")]
    ColumnCountMismatch { table: String, template: usize, records: usize },

    #[error("{0}")]
    Encode(#[from] EncodeError),
}

/// An executable upsert: prefix, VALUES list and suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub prefix: String,
    pub values: String,
    pub suffix: String,
}

impl Statement {
    pub fn to_sql(&self) -> String {
        let mut sql =
            String::with_capacity(self.prefix.len() + self.values.len() + self.suffix.len());
        sql.push_str(&self.prefix);
        sql.push_str(&self.values);
        sql.push_str(&self.suffix);
        sql
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix)?;
        f.write_str(&self.values)?;
        f.write_str(&self.suffix)
    }
}

/// Joins a template with an encoded VALUES list.
pub fn assemble(
    template: &StatementTemplate,
    values: &str,
    declared_records: usize,
) -> Result<Statement, AssembleError> {
    if values.trim().is_empty() {
        return Err(AssembleError::EmptyValues { declared: declared_records });
    }

    Ok(Statement {
        prefix: template.prefix().to_string(),
        values: values.to_string(),
        suffix: template.suffix().to_string(),
    })
}

/// A finished statement together with what happened while encoding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltStatement {
    pub statement: Statement,
    pub rows: usize,
    pub diagnostics: Vec<EncodeDiagnostic>,
}

/// Accumulates the VALUES list of a single batch.
///
/// Records are encoded as they are pushed. Once a record fails to encode the builder
/// keeps returning that error and `finish` fails with it, so a statement never silently
/// drops a record.
pub struct StatementBuilder<'a, R: PrefixRecord> {
    template: &'a StatementTemplate,
    truncated_bits: TruncatedBits,
    values: String,
    rows: usize,
    diagnostics: Vec<EncodeDiagnostic>,
    failed: Option<EncodeError>,
    _records: PhantomData<fn(&R)>,
}

impl<'a, R: PrefixRecord> StatementBuilder<'a, R> {
    pub fn new(
        template: &'a StatementTemplate,
        truncated_bits: TruncatedBits,
    ) -> Result<Self, AssembleError> {
        if template.family() != R::FAMILY {
            return Err(AssembleError::FamilyMismatch {
                template: template.family(),
                records: R::FAMILY,
            });
        }
        if template.column_count() != R::SCHEMA.columns.len() {
            return Err(AssembleError::ColumnCountMismatch {
                table: template.table().to_string(),
                template: template.column_count(),
                records: R::SCHEMA.columns.len(),
            });
        }

        Ok(StatementBuilder {
            template,
            truncated_bits,
            values: String::new(),
            rows: 0,
            diagnostics: Vec::new(),
            failed: None,
            _records: PhantomData,
        })
    }

    /// Pushes the next record, numbered by push order.
    pub fn push(&mut self, record: &R) -> Result<(), EncodeError> {
        self.push_at(self.rows, record)
    }

    /// Pushes a record whose position in its batch is `index`. Errors and diagnostics
    /// name that position.
    pub fn push_at(&mut self, index: usize, record: &R) -> Result<(), EncodeError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }

        let mut diagnostics = Vec::new();
        if let Err(err) =
            encode_record_into(&mut self.values, index, record, self.truncated_bits, &mut diagnostics)
        {
            self.failed = Some(err.clone());
            return Err(err);
        }
        self.rows += 1;
        self.diagnostics.append(&mut diagnostics);
        Ok(())
    }

    pub fn extend<'r, I>(&mut self, records: I) -> Result<(), EncodeError>
    where
        I: IntoIterator<Item = &'r R>,
        R: 'r,
    {
        for record in records {
            self.push(record)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn diagnostics(&self) -> &[EncodeDiagnostic] {
        &self.diagnostics
    }

    pub fn finish(self) -> Result<BuiltStatement, AssembleError> {
        if let Some(err) = self.failed {
            return Err(err.into());
        }

        let statement = assemble(self.template, &self.values, self.rows)?;
        debug!(
            "Built {} statement for {} with {} rows",
            R::FAMILY,
            self.template.table(),
            self.rows
        );

        Ok(BuiltStatement { statement, rows: self.rows, diagnostics: self.diagnostics })
    }
}
