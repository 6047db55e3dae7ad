use crate::{FORMAT_VERSION, HEADER_SIZE, Header};

#[test]
fn header_layout() {
    let header = Header::for_payload(14, b"payload");
    let bytes = header.to_bytes();

    assert_eq!(&bytes[0..4], b"TSLG");
    assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), FORMAT_VERSION);
    assert_eq!(u16::from_le_bytes([bytes[6], bytes[7]]), 14);
    assert_eq!(u32::from_le_bytes(bytes[8..12].try_into().unwrap()), 7);
    assert_eq!(
        u32::from_le_bytes(bytes[12..16].try_into().unwrap()),
        crc32fast::hash(b"payload")
    );
    assert!(bytes[16..].iter().all(|&b| b == 0));
    assert_eq!(Header::from_bytes(&bytes), Some(header));
}

#[test]
fn short_input_has_no_header() {
    assert_eq!(Header::from_bytes(&[0u8; HEADER_SIZE - 1]), None);
}

#[test]
fn version_window() {
    let mut header = Header::for_payload(0, &[]);
    assert!(header.validate_version());
    header.format_version = 0;
    assert!(!header.validate_version());
    header.format_version = FORMAT_VERSION + 1;
    assert!(!header.validate_version());
}
