//! Artifact header (32 bytes).
//!
//! Layout, little-endian:
//! - 0-3: magic `b"TSLG"`
//! - 4-5: format version
//! - 6-7: language version
//! - 8-11: payload length
//! - 12-15: CRC32 of the payload
//! - 16-31: reserved, zero

use super::{FORMAT_VERSION, HEADER_SIZE, MAGIC, MIN_FORMAT_VERSION};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub magic: [u8; 4],
    pub format_version: u16,
    pub language_version: u16,
    pub payload_len: u32,
    pub checksum: u32,
}

impl Header {
    pub fn for_payload(language_version: u16, payload: &[u8]) -> Self {
        Self {
            magic: MAGIC,
            format_version: FORMAT_VERSION,
            language_version,
            payload_len: payload.len() as u32,
            checksum: crc32fast::hash(payload),
        }
    }

    /// Decodes the first [`HEADER_SIZE`] bytes. Returns `None` if `bytes` is shorter.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; HEADER_SIZE] = bytes.get(..HEADER_SIZE)?.try_into().ok()?;
        let u16_at = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);
        let u32_at = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        Some(Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            format_version: u16_at(4),
            language_version: u16_at(6),
            payload_len: u32_at(8),
            checksum: u32_at(12),
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..6].copy_from_slice(&self.format_version.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.language_version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.payload_len.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.checksum.to_le_bytes());
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn validate_version(&self) -> bool {
        (MIN_FORMAT_VERSION..=FORMAT_VERSION).contains(&self.format_version)
    }
}
