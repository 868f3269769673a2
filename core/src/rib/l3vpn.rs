use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    database::{
        batch_operations::{
            column, plain, BatchOperationAction as Action, BatchOperationColumnBehavior,
            BatchOperationSqlType as SqlType, ColumnDefinition,
        },
        postgres::sql_type_wrapper::RibSqlTypeWrapper,
    },
    rib::{
        encode::{EncodeError, RowContext},
        family::{AddressFamily, PrefixRecord},
        template::RibTableSchema,
    },
};

/// An L3VPN (VPNv4/VPNv6) route as parsed from a BMP route monitoring message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L3VpnPrefixRecord {
    pub hash_id: String,
    pub peer_hash_id: String,
    /// Absent on withdrawals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_attr_hash_id: Option<String>,
    #[serde(rename = "isIPv4")]
    pub is_ipv4: bool,
    pub origin_asn: u32,
    #[serde(default)]
    pub prefix: String,
    pub prefix_length: u8,
    pub timestamp: NaiveDateTime,
    pub is_withdrawn: bool,
    #[serde(default)]
    pub path_id: u32,
    /// Comma separated MPLS label stack, e.g. `16001,24005`.
    #[serde(default)]
    pub labels: String,
    #[serde(default)]
    pub is_pre_policy: bool,
    #[serde(default)]
    pub is_adj_rib_in: bool,
    /// Route distinguisher in its textual `admin:assigned` form.
    #[serde(default)]
    pub rd: String,
}

const L3VPN_COLUMNS: &[ColumnDefinition] = &[
    column("hash_id", SqlType::Uuid, BatchOperationColumnBehavior::Distinct, Action::Nothing),
    plain("peer_hash_id", SqlType::Uuid, Action::Nothing),
    plain("path_attr_hash_id", SqlType::Uuid, Action::KeepOnWithdraw),
    plain("isipv4", SqlType::Bool, Action::Nothing),
    plain("origin_as", SqlType::Bigint, Action::KeepOnWithdraw),
    plain("prefix", SqlType::Inet, Action::Nothing),
    plain("prefix_len", SqlType::Smallint, Action::Nothing),
    plain("prefix_bin", SqlType::Varchar, Action::Nothing),
    plain("prefix_bcast_bin", SqlType::Varchar, Action::Nothing),
    plain("prefix_bits", SqlType::Varchar, Action::Nothing),
    column("timestamp", SqlType::Timestamp, BatchOperationColumnBehavior::Sequence, Action::Set),
    plain("iswithdrawn", SqlType::Bool, Action::Set),
    plain("path_id", SqlType::Bigint, Action::Set),
    plain("labels", SqlType::Varchar, Action::KeepOnWithdraw),
    plain("isprepolicy", SqlType::Bool, Action::Set),
    plain("isadjribin", SqlType::Bool, Action::Set),
    plain("rd", SqlType::Varchar, Action::Nothing),
];

pub const L3VPN_SCHEMA: RibTableSchema = RibTableSchema {
    family: AddressFamily::L3Vpn,
    table: "l3vpn_rib",
    columns: L3VPN_COLUMNS,
    conflict_columns: &["peer_hash_id", "hash_id"],
    withdrawn_column: "iswithdrawn",
};

impl PrefixRecord for L3VpnPrefixRecord {
    const FAMILY: AddressFamily = AddressFamily::L3Vpn;
    const SCHEMA: &'static RibTableSchema = &L3VPN_SCHEMA;

    fn hash_id(&self) -> &str {
        &self.hash_id
    }

    fn encode_row(&self, ctx: &mut RowContext<'_>) -> Result<Vec<RibSqlTypeWrapper>, EncodeError> {
        let prefix = ctx.address("prefix", &self.prefix)?;
        let addr = prefix.as_ref();

        Ok(vec![
            ctx.hash("hash_id", &self.hash_id)?,
            ctx.hash("peer_hash_id", &self.peer_hash_id)?,
            ctx.optional_hash("path_attr_hash_id", self.path_attr_hash_id.as_deref())?,
            RibSqlTypeWrapper::Bool(self.is_ipv4),
            RibSqlTypeWrapper::U32(self.origin_asn),
            ctx.network("prefix", addr, self.prefix_length)?,
            RibSqlTypeWrapper::U8(self.prefix_length),
            ctx.prefix_bits("prefix_bin", addr, &self.prefix, self.prefix_length),
            ctx.prefix_bits("prefix_bcast_bin", addr, &self.prefix, self.prefix_length),
            ctx.prefix_bits("prefix_bits", addr, &self.prefix, self.prefix_length),
            RibSqlTypeWrapper::DateTime(self.timestamp),
            RibSqlTypeWrapper::Bool(self.is_withdrawn),
            RibSqlTypeWrapper::U32(self.path_id),
            ctx.label_stack("labels", &self.labels)?,
            RibSqlTypeWrapper::Bool(self.is_pre_policy),
            RibSqlTypeWrapper::Bool(self.is_adj_rib_in),
            RibSqlTypeWrapper::String(self.rd.clone()),
        ])
    }
}
