use std::io::Write;

use crate::table_tests::tiny_table;
use crate::{FORMAT_VERSION, GrammarLoadError, GrammarTable, HEADER_SIZE};

#[test]
fn artifact_roundtrip() {
    let table = tiny_table();
    let bytes = table.to_artifact().unwrap();

    assert_eq!(&bytes[..4], b"TSLG");
    assert_eq!(GrammarTable::from_artifact(&bytes).unwrap(), table);
}

#[test]
fn load_from_path() {
    let bytes = tiny_table().to_artifact().unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();

    let table = GrammarTable::load(file.path()).unwrap();
    assert_eq!(table.name, "tiny");
}

#[test]
fn format_version_out_of_range() {
    let mut bytes = tiny_table().to_artifact().unwrap();
    bytes[4..6].copy_from_slice(&(FORMAT_VERSION + 1).to_le_bytes());

    let err = GrammarTable::from_artifact(&bytes).unwrap_err();
    assert!(matches!(
        err,
        GrammarLoadError::VersionMismatch { found, .. } if found == FORMAT_VERSION + 1
    ));
    insta::assert_snapshot!(err.to_string(), @"unsupported format version 3 (supported 2..=2)");
}

#[test]
fn bad_magic() {
    let mut bytes = tiny_table().to_artifact().unwrap();
    bytes[0] = b'X';
    assert!(matches!(
        GrammarTable::from_artifact(&bytes),
        Err(GrammarLoadError::BadMagic)
    ));
}

#[test]
fn too_small() {
    let err = GrammarTable::from_artifact(&[0u8; 5]).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"artifact too small: 5 bytes (minimum 32)");
}

#[test]
fn corrupted_payload() {
    let mut bytes = tiny_table().to_artifact().unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    assert!(matches!(
        GrammarTable::from_artifact(&bytes),
        Err(GrammarLoadError::Checksum { .. })
    ));
}

#[test]
fn truncated_payload() {
    let bytes = tiny_table().to_artifact().unwrap();
    assert!(matches!(
        GrammarTable::from_artifact(&bytes[..HEADER_SIZE + 2]),
        Err(GrammarLoadError::LengthMismatch { .. })
    ));
}

#[test]
fn dangling_reference_is_malformed() {
    let mut table = tiny_table();
    table.states[0].gotos[0].1 = 42;
    let bytes = table.to_artifact().unwrap();

    let err = GrammarTable::from_artifact(&bytes).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"malformed table: state 0 has a dangling goto");
}

#[test]
fn token_on_nonterminal_is_rejected() {
    let mut table = tiny_table();
    table.tokens[0].symbol = 3;
    let err = table.validate().unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"invalid token `s`: lexical definition on a non-terminal");
}
