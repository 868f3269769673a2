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

/// An EVPN route (RFC 7432) as parsed from a BMP route monitoring message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvpnPrefixRecord {
    pub hash_id: String,
    pub peer_hash_id: String,
    /// Absent on withdrawals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_attr_hash_id: Option<String>,
    pub origin_asn: u32,
    pub route_type: u8,
    #[serde(default)]
    pub gateway: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub prefix_length: u8,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub mac_length: u8,
    pub timestamp: NaiveDateTime,
    pub is_withdrawn: bool,
    #[serde(default)]
    pub path_id: u32,
    #[serde(default)]
    pub mpls_label_1: u32,
    #[serde(default)]
    pub mpls_label_2: u32,
    #[serde(default)]
    pub is_pre_policy: bool,
    #[serde(default)]
    pub is_adj_rib_in: bool,
    #[serde(default)]
    pub rd_administrator_subfield: String,
    #[serde(default)]
    pub rd_type: u8,
    #[serde(default)]
    pub originating_router_ip_length: u8,
    #[serde(default)]
    pub originating_router_ip: String,
    #[serde(default)]
    pub ethernet_tag_id_hex: String,
    #[serde(default)]
    pub ethernet_segment_identifier: String,
}

const EVPN_COLUMNS: &[ColumnDefinition] = &[
    column("hash_id", SqlType::Uuid, BatchOperationColumnBehavior::Distinct, Action::Nothing),
    plain("peer_hash_id", SqlType::Uuid, Action::Nothing),
    plain("path_attr_hash_id", SqlType::Uuid, Action::KeepOnWithdraw),
    plain("origin_as", SqlType::Bigint, Action::KeepOnWithdraw),
    plain("route_type", SqlType::Smallint, Action::Nothing),
    plain("gateway", SqlType::Inet, Action::Nothing),
    plain("prefix", SqlType::Inet, Action::Nothing),
    plain("prefix_len", SqlType::Smallint, Action::Nothing),
    plain("mac", SqlType::Macaddr, Action::Nothing),
    plain("mac_len", SqlType::Smallint, Action::Nothing),
    plain("timestamp", SqlType::Timestamp, Action::Nothing),
    plain("iswithdrawn", SqlType::Bool, Action::Set),
    plain("path_id", SqlType::Bigint, Action::Set),
    plain("mpls_label_1", SqlType::Bigint, Action::KeepOnWithdraw),
    plain("mpls_label_2", SqlType::Bigint, Action::KeepOnWithdraw),
    plain("isprepolicy", SqlType::Bool, Action::Set),
    plain("isadjribin", SqlType::Bool, Action::Set),
    plain("rd_administrator_subfield", SqlType::Varchar, Action::KeepOnWithdraw),
    plain("rd_type", SqlType::Smallint, Action::Nothing),
    plain("originating_router_ip_len", SqlType::Smallint, Action::Nothing),
    plain("originating_router_ip", SqlType::Inet, Action::KeepOnWithdraw),
    plain("ethernet_tag_id_hex", SqlType::Varchar, Action::Nothing),
    plain("ethernet_segment_identifier", SqlType::Varchar, Action::Nothing),
];

pub const EVPN_SCHEMA: RibTableSchema = RibTableSchema {
    family: AddressFamily::Evpn,
    table: "evpn_rib",
    columns: EVPN_COLUMNS,
    conflict_columns: &["peer_hash_id", "hash_id", "path_attr_hash_id"],
    withdrawn_column: "iswithdrawn",
};

impl PrefixRecord for EvpnPrefixRecord {
    const FAMILY: AddressFamily = AddressFamily::Evpn;
    const SCHEMA: &'static RibTableSchema = &EVPN_SCHEMA;

    fn hash_id(&self) -> &str {
        &self.hash_id
    }

    fn encode_row(&self, ctx: &mut RowContext<'_>) -> Result<Vec<RibSqlTypeWrapper>, EncodeError> {
        let prefix = ctx.address("prefix", &self.prefix)?;

        Ok(vec![
            ctx.hash("hash_id", &self.hash_id)?,
            ctx.hash("peer_hash_id", &self.peer_hash_id)?,
            ctx.optional_hash("path_attr_hash_id", self.path_attr_hash_id.as_deref())?,
            RibSqlTypeWrapper::U32(self.origin_asn),
            RibSqlTypeWrapper::U8(self.route_type),
            ctx.host("gateway", &self.gateway)?,
            ctx.network("prefix", prefix.as_ref(), self.prefix_length)?,
            RibSqlTypeWrapper::U8(self.prefix_length),
            ctx.mac("mac", &self.mac)?,
            RibSqlTypeWrapper::U8(self.mac_length),
            RibSqlTypeWrapper::DateTime(self.timestamp),
            RibSqlTypeWrapper::Bool(self.is_withdrawn),
            RibSqlTypeWrapper::U32(self.path_id),
            RibSqlTypeWrapper::U32(self.mpls_label_1),
            RibSqlTypeWrapper::U32(self.mpls_label_2),
            RibSqlTypeWrapper::Bool(self.is_pre_policy),
            RibSqlTypeWrapper::Bool(self.is_adj_rib_in),
            RibSqlTypeWrapper::String(self.rd_administrator_subfield.clone()),
            RibSqlTypeWrapper::U8(self.rd_type),
            RibSqlTypeWrapper::U8(self.originating_router_ip_length),
            ctx.host("originating_router_ip", &self.originating_router_ip)?,
            ctx.hex_text("ethernet_tag_id_hex", &self.ethernet_tag_id_hex)?,
            RibSqlTypeWrapper::String(self.ethernet_segment_identifier.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::rib::{
        encode::{encode_records, TruncatedBits},
        test_support::{parse_values, ParsedLiteral},
    };

    fn record() -> EvpnPrefixRecord {
        EvpnPrefixRecord {
            hash_id: "a1b2c3d4e5f60718293a4b5c6d7e8f90".to_string(),
            peer_hash_id: "0f1e2d3c4b5a69788796a5b4c3d2e1f0".to_string(),
            path_attr_hash_id: Some("11112222333344445555666677778888".to_string()),
            origin_asn: 65001,
            route_type: 2,
            gateway: "192.0.2.1".to_string(),
            prefix: "10.0.0.0".to_string(),
            prefix_length: 24,
            mac: "00:11:22:33:44:55".to_string(),
            mac_length: 48,
            timestamp: NaiveDate::from_ymd_opt(2024, 5, 17)
                .unwrap()
                .and_hms_micro_opt(8, 15, 0, 123456)
                .unwrap(),
            is_withdrawn: false,
            path_id: 7,
            mpls_label_1: 100,
            mpls_label_2: 200,
            is_pre_policy: true,
            is_adj_rib_in: true,
            rd_administrator_subfield: "65000".to_string(),
            rd_type: 0,
            originating_router_ip_length: 32,
            originating_router_ip: "198.51.100.7".to_string(),
            ethernet_tag_id_hex: "0x00000064".to_string(),
            ethernet_segment_identifier: "00:11:22:33:44:55:66:77:88:99".to_string(),
        }
    }

    fn encode_one(record: &EvpnPrefixRecord) -> Vec<ParsedLiteral> {
        let encoded = encode_records(std::slice::from_ref(record), TruncatedBits::default())
            .unwrap();
        let mut rows = parse_values(&encoded.text);
        assert_eq!(rows.len(), 1);
        rows.remove(0)
    }

    #[test]
    fn test_announcement_tuple() {
        let encoded = encode_records(&[record()], TruncatedBits::default()).unwrap();

        assert_eq!(encoded.tuples, 1);
        assert!(encoded.text.contains(",65001,2,'192.0.2.1'::inet,'10.0.0.0/24'::inet,24,"));
        assert!(encoded.text.contains("'00:11:22:33:44:55'::macaddr"));
        assert!(encoded.diagnostics.is_empty());

        let row = encode_one(&record());
        let names = EVPN_SCHEMA.column_names();
        let origin_as = names.iter().position(|c| *c == "origin_as").unwrap();
        assert_eq!(row[origin_as], ParsedLiteral::Bare("65001".to_string()));
    }

    #[test]
    fn test_round_trip_all_fields() {
        let original = record();
        let row = encode_one(&original);
        assert_eq!(row.len(), EVPN_COLUMNS.len());

        assert_eq!(row[0].uuid(), original.hash_id);
        assert_eq!(row[1].uuid(), original.peer_hash_id);
        assert_eq!(Some(row[2].uuid()), original.path_attr_hash_id);
        assert_eq!(row[3].number::<u32>(), original.origin_asn);
        assert_eq!(row[4].number::<u8>(), original.route_type);
        assert_eq!(row[5].text_with_cast("inet"), original.gateway);
        assert_eq!(
            row[6].text_with_cast("inet"),
            format!("{}/{}", original.prefix, original.prefix_length)
        );
        assert_eq!(row[7].number::<u8>(), original.prefix_length);
        assert_eq!(row[8].text_with_cast("macaddr"), original.mac);
        assert_eq!(row[9].number::<u8>(), original.mac_length);
        assert_eq!(row[10].timestamp(), original.timestamp);
        assert_eq!(row[11].boolean(), original.is_withdrawn);
        assert_eq!(row[12].number::<u32>(), original.path_id);
        assert_eq!(row[13].number::<u32>(), original.mpls_label_1);
        assert_eq!(row[14].number::<u32>(), original.mpls_label_2);
        assert_eq!(row[15].boolean(), original.is_pre_policy);
        assert_eq!(row[16].boolean(), original.is_adj_rib_in);
        assert_eq!(row[17].text(), original.rd_administrator_subfield);
        assert_eq!(row[18].number::<u8>(), original.rd_type);
        assert_eq!(row[19].number::<u8>(), original.originating_router_ip_length);
        assert_eq!(row[20].text_with_cast("inet"), original.originating_router_ip);
        assert_eq!(row[21].text(), original.ethernet_tag_id_hex);
        assert_eq!(row[22].text(), original.ethernet_segment_identifier);
    }

    #[test]
    fn test_withdrawal_encodes_typed_nulls() {
        let mut withdrawn = record();
        withdrawn.is_withdrawn = true;
        withdrawn.path_attr_hash_id = Some(String::new());
        withdrawn.gateway = String::new();
        withdrawn.prefix = String::new();
        withdrawn.mac = String::new();
        withdrawn.originating_router_ip = String::new();

        let row = encode_one(&withdrawn);

        assert_eq!(row[2], ParsedLiteral::Null("uuid".to_string()));
        assert_eq!(row[5], ParsedLiteral::Null("inet".to_string()));
        assert_eq!(row[6], ParsedLiteral::Null("inet".to_string()));
        assert_eq!(row[8], ParsedLiteral::Null("macaddr".to_string()));
        assert_eq!(row[20], ParsedLiteral::Null("inet".to_string()));
        assert!(row[11].boolean());

        let mut absent = withdrawn.clone();
        absent.path_attr_hash_id = None;
        assert_eq!(encode_one(&absent)[2], ParsedLiteral::Null("uuid".to_string()));
    }

    #[test]
    fn test_malformed_fields_fail_the_batch() {
        let mut bad_hash = record();
        bad_hash.peer_hash_id = "not-a-hash".to_string();
        let err = encode_records(&[record(), bad_hash], TruncatedBits::default()).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::MalformedField { index: 1, column: "peer_hash_id", .. }
        ));

        let mut bad_mac = record();
        bad_mac.mac = "00:11:22:33:44".to_string();
        assert!(matches!(
            encode_records(&[bad_mac], TruncatedBits::default()).unwrap_err(),
            EncodeError::MalformedField { column: "mac", .. }
        ));

        let mut bad_gateway = record();
        bad_gateway.gateway = "300.1.1.1".to_string();
        assert!(matches!(
            encode_records(&[bad_gateway], TruncatedBits::default()).unwrap_err(),
            EncodeError::MalformedField { column: "gateway", .. }
        ));

        let mut bad_tag = record();
        bad_tag.ethernet_tag_id_hex = "0xZZ".to_string();
        assert!(matches!(
            encode_records(&[bad_tag], TruncatedBits::default()).unwrap_err(),
            EncodeError::MalformedField { column: "ethernet_tag_id_hex", .. }
        ));
    }

    #[test]
    fn test_deserialize_record() {
        let json = r#"{
            "hashId": "a1b2c3d4e5f60718293a4b5c6d7e8f90",
            "peerHashId": "0f1e2d3c4b5a69788796a5b4c3d2e1f0",
            "originAsn": 65001,
            "routeType": 2,
            "prefix": "10.0.0.0",
            "prefixLength": 24,
            "mac": "00:11:22:33:44:55",
            "timestamp": "2024-05-17T08:15:00",
            "isWithdrawn": false,
            "mplsLabel1": 100
        }"#;

        let parsed: EvpnPrefixRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.path_attr_hash_id, None);
        assert_eq!(parsed.mpls_label_1, 100);
        assert_eq!(parsed.gateway, "");
    }
}
