#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Grammar Table: the compiled, versioned parse and lex tables of one language.
//!
//! Tables are produced by `tessel-generate` and consumed by `tessel-runtime`.
//! On disk a table is an artifact: a fixed-size [`Header`] followed by a
//! postcard payload, protected by a CRC32 checksum.

mod artifact;
mod header;
mod table;
mod terminal_set;

#[cfg(test)]
mod artifact_tests;
#[cfg(test)]
mod header_tests;
#[cfg(test)]
mod table_tests;

pub use artifact::GrammarLoadError;
pub use header::Header;
pub use table::{
    Action, ConflictPolicy, FieldId, GrammarTable, LexMode, ParseState, Production,
    ProductionId, StateId, Step, SymbolId, SymbolInfo, SymbolKind, TokenDef, TokenKind,
};
pub use terminal_set::TerminalSet;

/// Magic bytes at the start of every artifact.
pub const MAGIC: [u8; 4] = *b"TSLG";

/// Artifact format version written by this crate.
pub const FORMAT_VERSION: u16 = 2;

/// Oldest artifact format version this crate can read.
pub const MIN_FORMAT_VERSION: u16 = 2;

/// Size of the artifact header in bytes.
pub const HEADER_SIZE: usize = 32;
