use std::net::IpAddr;

/// Number of binary digits an address of this family renders to.
pub fn address_width(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

/// Renders the address as a string of `0`/`1` digits, most significant bit first.
pub fn ip_bits(addr: &IpAddr) -> String {
    match addr {
        IpAddr::V4(v4) => format!("{:032b}", u32::from(*v4)),
        IpAddr::V6(v6) => format!("{:0128b}", u128::from(*v6)),
    }
}

/// Returns the first `prefix_len` digits of the address, or `None` when the address does
/// not have that many bits (including a missing address with a non-zero length).
pub fn truncated_bits(addr: Option<&IpAddr>, prefix_len: u8) -> Option<String> {
    let mut bits = addr.map(ip_bits).unwrap_or_default();
    let len = usize::from(prefix_len);
    if len > bits.len() {
        return None;
    }
    bits.truncate(len);
    Some(bits)
}
