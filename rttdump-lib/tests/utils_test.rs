use rttdump_lib::utils::Utils;

#[test]
fn test_str_to_u32_decimal() {
    assert_eq!(Utils::str_to_u32("0").unwrap(), 0);
    assert_eq!(Utils::str_to_u32("536870912").unwrap(), 0x2000_0000);
    assert_eq!(Utils::str_to_u32("  4096 ").unwrap(), 4096);
}

#[test]
fn test_str_to_u32_hex() {
    assert_eq!(Utils::str_to_u32("0x20000000").unwrap(), 0x2000_0000);
    assert_eq!(Utils::str_to_u32("0X2000_0400").unwrap(), 0x2000_0400);
    assert_eq!(Utils::str_to_u32("0xffffffff").unwrap(), u32::MAX);
}

#[test]
fn test_str_to_u32_binary_and_octal() {
    assert_eq!(Utils::str_to_u32("0b1010").unwrap(), 10);
    assert_eq!(Utils::str_to_u32("0o17").unwrap(), 15);
}

#[test]
fn test_str_to_u32_invalid() {
    assert!(Utils::str_to_u32("").is_err());
    assert!(Utils::str_to_u32("0x").is_err());
    assert!(Utils::str_to_u32("0x1_0000_0000").is_err());
    assert!(Utils::str_to_u32("20000000h").is_err());
    assert!(Utils::str_to_u32("-1").is_err());
}
