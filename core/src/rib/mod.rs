//! RIB prefix records and the bulk upsert statements written for them.
//!
//! Each address family pairs a record type with a static column table
//! ([`template::RibTableSchema`]). The table drives both the fixed statement
//! text ([`template::StatementTemplate`]) and the tuple check done by the
//! encoder, so the two can not drift apart.

pub mod assembler;
pub mod bits;
pub mod encode;
pub mod evpn;
pub mod family;
pub mod l3vpn;
pub mod template;

#[cfg(test)]
pub(crate) mod test_support;
