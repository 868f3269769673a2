use std::{collections::HashMap, fmt, mem, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    database::postgres::sql_type_wrapper::RibSqlTypeWrapper,
    manifest::config::TableTargets,
    rib::{
        assembler::{assemble, AssembleError, BuiltStatement, StatementBuilder},
        encode::{encode_records, EncodeError, RowContext, TruncatedBits},
        evpn::EvpnPrefixRecord,
        l3vpn::L3VpnPrefixRecord,
        template::{RibTableSchema, StatementTemplate},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    Evpn,
    L3Vpn,
}

impl AddressFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressFamily::Evpn => "evpn",
            AddressFamily::L3Vpn => "l3vpn",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "evpn" => Ok(AddressFamily::Evpn),
            "l3vpn" => Ok(AddressFamily::L3Vpn),
            other => Err(format!("Unknown address family '{}', expected evpn or l3vpn", other)),
        }
    }
}

/// A parsed route of one address family that can be written into its RIB table.
pub trait PrefixRecord {
    const FAMILY: AddressFamily;
    const SCHEMA: &'static RibTableSchema;

    /// The key the statement deduplicates on with `DISTINCT ON`.
    fn hash_id(&self) -> &str;

    /// The row's values in the order of `SCHEMA.columns`.
    fn encode_row(&self, ctx: &mut RowContext<'_>) -> Result<Vec<RibSqlTypeWrapper>, EncodeError>;
}

/// Options applied when turning a batch into statements.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Soft limit of tuples per statement. Unset writes the whole batch as one statement.
    pub max_rows: Option<usize>,
    pub truncated_bits: TruncatedBits,
}

/// One ingestion batch of a single address family, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixBatch {
    Evpn(Vec<EvpnPrefixRecord>),
    L3Vpn(Vec<L3VpnPrefixRecord>),
}

impl PrefixBatch {
    /// Parses a JSON array of records of the given family.
    pub fn from_json(family: AddressFamily, json: &str) -> Result<Self, serde_json::Error> {
        Ok(match family {
            AddressFamily::Evpn => PrefixBatch::Evpn(serde_json::from_str(json)?),
            AddressFamily::L3Vpn => PrefixBatch::L3Vpn(serde_json::from_str(json)?),
        })
    }

    pub fn family(&self) -> AddressFamily {
        match self {
            PrefixBatch::Evpn(_) => AddressFamily::Evpn,
            PrefixBatch::L3Vpn(_) => AddressFamily::L3Vpn,
        }
    }

    pub fn schema(&self) -> &'static RibTableSchema {
        match self {
            PrefixBatch::Evpn(_) => EvpnPrefixRecord::SCHEMA,
            PrefixBatch::L3Vpn(_) => L3VpnPrefixRecord::SCHEMA,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PrefixBatch::Evpn(records) => records.len(),
            PrefixBatch::L3Vpn(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn template(&self, targets: &TableTargets) -> StatementTemplate {
        StatementTemplate::for_target(
            self.schema(),
            targets.schema.as_deref(),
            targets.table_for(self.family()),
        )
    }

    /// Builds the batch's statements. An empty batch yields none, otherwise one statement
    /// unless `options.max_rows` asks for smaller ones.
    ///
    /// Split batches keep every record of a `hash_id` in the same statement, so the newest
    /// row of a key still wins no matter how the batch is divided.
    pub fn statements(
        &self,
        targets: &TableTargets,
        options: &BatchOptions,
    ) -> Result<Vec<BuiltStatement>, AssembleError> {
        let template = self.template(targets);
        match self {
            PrefixBatch::Evpn(records) => build_statements(&template, records, options),
            PrefixBatch::L3Vpn(records) => build_statements(&template, records, options),
        }
    }
}

fn build_statements<R: PrefixRecord>(
    template: &StatementTemplate,
    records: &[R],
    options: &BatchOptions,
) -> Result<Vec<BuiltStatement>, AssembleError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    match options.max_rows {
        Some(max_rows) if max_rows > 0 && records.len() > max_rows => chunk_by_key(records, max_rows)
            .iter()
            .map(|chunk| {
                let mut builder = StatementBuilder::<R>::new(template, options.truncated_bits)?;
                for &index in chunk {
                    builder.push_at(index, &records[index])?;
                }
                builder.finish()
            })
            .collect(),
        _ => {
            let encoded = encode_records(records, options.truncated_bits)?;
            let statement = assemble(template, &encoded.text, records.len())?;
            Ok(vec![BuiltStatement {
                statement,
                rows: encoded.tuples,
                diagnostics: encoded.diagnostics,
            }])
        }
    }
}

/// Splits record positions into chunks of about `max_rows`, keeping all records of a
/// `hash_id` together. A key with more than `max_rows` records gets a chunk of its own.
/// Positions stay in arrival order inside each chunk.
fn chunk_by_key<R: PrefixRecord>(records: &[R], max_rows: usize) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for (index, record) in records.iter().enumerate() {
        let key = record.hash_id().trim().replace('-', "").to_ascii_lowercase();
        match by_key.get(&key) {
            Some(&group) => groups[group].push(index),
            None => {
                by_key.insert(key, groups.len());
                groups.push(vec![index]);
            }
        }
    }

    let mut chunks = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    for group in groups {
        if !current.is_empty() && current.len() + group.len() > max_rows {
            chunks.push(mem::take(&mut current));
        }
        current.extend(group);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    for chunk in &mut chunks {
        chunk.sort_unstable();
    }
    chunks
}
