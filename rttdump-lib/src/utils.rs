use std::num::ParseIntError;

pub struct Utils;
impl Utils {
    /// Parse an address given in decimal or with a `0x`, `0b` or `0o` prefix.
    pub fn str_to_u32(s: &str) -> Result<u32, ParseIntError> {
        let s = s.trim();
        let s = s.replace('_', "");

        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u32::from_str_radix(hex, 16)
        } else if let Some(bin) = s.strip_prefix("0b") {
            u32::from_str_radix(bin, 2)
        } else if let Some(oct) = s.strip_prefix("0o") {
            u32::from_str_radix(oct, 8)
        } else {
            s.parse()
        }
    }
}
