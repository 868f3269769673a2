use serde::{Deserialize, Serialize};

use crate::rib::{
    encode::TruncatedBits,
    family::{AddressFamily, BatchOptions},
};

/// Where each address family is written.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TableTargets {
    /// Postgres schema holding the RIB tables. Unset uses the connection's search path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Overrides the `evpn_rib` table name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evpn: Option<String>,

    /// Overrides the `l3vpn_rib` table name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l3vpn: Option<String>,
}

impl TableTargets {
    pub fn table_for(&self, family: AddressFamily) -> Option<&str> {
        match family {
            AddressFamily::Evpn => self.evpn.as_deref(),
            AddressFamily::L3Vpn => self.l3vpn.as_deref(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Splits batches larger than this into several statements. Records sharing a
    /// `hash_id` always stay in one statement. Unset writes each batch as one statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,

    /// What to write into the prefix bit-string columns when the prefix can not be
    /// truncated to its length: `empty_string` (default) or `null`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated_bits: Option<TruncatedBits>,
}

/// Settings read from `ribsink.yaml`.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub tables: TableTargets,

    #[serde(default)]
    pub batch: BatchConfig,

    /// `error`, `warn`, `info`, `debug` or `trace`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            max_rows: self.batch.max_rows.filter(|rows| *rows > 0),
            truncated_bits: self.batch.truncated_bits.unwrap_or_default(),
        }
    }
}
