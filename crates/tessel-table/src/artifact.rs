//! Reading and writing Grammar Table artifacts.

use std::io;
use std::path::Path;

use crate::{
    Action, FORMAT_VERSION, GrammarTable, HEADER_SIZE, Header, MIN_FORMAT_VERSION, SymbolKind,
};

#[derive(Debug, thiserror::Error)]
pub enum GrammarLoadError {
    #[error("artifact too small: {0} bytes (minimum {HEADER_SIZE})")]
    TooSmall(usize),
    #[error("invalid magic: expected TSLG")]
    BadMagic,
    #[error("unsupported format version {found} (supported {min}..={max})")]
    VersionMismatch { found: u16, min: u16, max: u16 },
    #[error("payload length mismatch: header says {header} bytes, got {actual}")]
    LengthMismatch { header: u32, actual: usize },
    #[error("checksum mismatch: expected {expected:#010x}, computed {actual:#010x}")]
    Checksum { expected: u32, actual: u32 },
    #[error("cannot decode table: {0}")]
    Decode(#[from] postcard::Error),
    #[error("malformed table: {0}")]
    Malformed(String),
    #[error("invalid token `{name}`: {message}")]
    InvalidToken { name: String, message: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl GrammarTable {
    /// Encodes the table as an artifact.
    pub fn to_artifact(&self) -> Result<Vec<u8>, GrammarLoadError> {
        let payload = postcard::to_allocvec(self)?;
        let header = Header::for_payload(self.language_version, &payload);
        let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    /// Decodes and validates an artifact from an embedded buffer.
    pub fn from_artifact(bytes: &[u8]) -> Result<Self, GrammarLoadError> {
        let header = Header::from_bytes(bytes).ok_or(GrammarLoadError::TooSmall(bytes.len()))?;
        if !header.validate_magic() {
            return Err(GrammarLoadError::BadMagic);
        }
        if !header.validate_version() {
            return Err(GrammarLoadError::VersionMismatch {
                found: header.format_version,
                min: MIN_FORMAT_VERSION,
                max: FORMAT_VERSION,
            });
        }

        let payload = &bytes[HEADER_SIZE..];
        if header.payload_len as usize != payload.len() {
            return Err(GrammarLoadError::LengthMismatch {
                header: header.payload_len,
                actual: payload.len(),
            });
        }
        let actual = crc32fast::hash(payload);
        if actual != header.checksum {
            return Err(GrammarLoadError::Checksum {
                expected: header.checksum,
                actual,
            });
        }

        let table: GrammarTable = postcard::from_bytes(payload)?;
        if table.language_version != header.language_version {
            return Err(GrammarLoadError::Malformed(format!(
                "language version {} disagrees with header {}",
                table.language_version, header.language_version
            )));
        }
        table.validate()?;
        Ok(table)
    }

    /// Reads an artifact from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GrammarLoadError> {
        let bytes = std::fs::read(path)?;
        Self::from_artifact(&bytes)
    }

    /// Checks that every cross-reference in the table is in range.
    pub fn validate(&self) -> Result<(), GrammarLoadError> {
        let malformed = |msg: String| Err(GrammarLoadError::Malformed(msg));
        let symbol_count = self.symbols.len();

        if symbol_count <= GrammarTable::ERROR as usize {
            return malformed("missing builtin symbols".into());
        }
        if self.states.get(self.start_state as usize).is_none() {
            return malformed(format!("start state {} out of range", self.start_state));
        }
        if self.productions.is_empty() {
            return malformed("no productions".into());
        }
        if self.symbols.len() > u16::MAX as usize || self.states.len() > u16::MAX as usize {
            return malformed("table exceeds 16-bit ids".into());
        }

        for (i, production) in self.productions.iter().enumerate() {
            if production.lhs as usize >= symbol_count {
                return malformed(format!("production {i} has unknown lhs"));
            }
            for step in &production.steps {
                let bad_symbol = step.symbol as usize >= symbol_count;
                let bad_field = step.field.is_some_and(|f| f as usize >= self.fields.len());
                let bad_alias = step.alias.is_some_and(|a| a as usize >= symbol_count);
                if bad_symbol || bad_field || bad_alias {
                    return malformed(format!("production {i} has a dangling step"));
                }
            }
        }

        for (i, state) in self.states.iter().enumerate() {
            if state.lex_mode as usize >= self.lex_modes.len() {
                return malformed(format!("state {i} has no lex mode"));
            }
            for (terminal, actions) in &state.actions {
                if !self.symbols.get(*terminal as usize).is_some_and(|s| s.is_terminal())
                    && *terminal != GrammarTable::END
                {
                    return malformed(format!("state {i} has actions on a non-terminal"));
                }
                for action in actions {
                    let ok = match *action {
                        Action::Shift { state } => (state as usize) < self.states.len(),
                        Action::Reduce { production } => {
                            (production as usize) < self.productions.len()
                        }
                        Action::ShiftExtra | Action::Accept => true,
                    };
                    if !ok {
                        return malformed(format!("state {i} has a dangling action"));
                    }
                }
            }
            for (_, target) in &state.gotos {
                if *target as usize >= self.states.len() {
                    return malformed(format!("state {i} has a dangling goto"));
                }
            }
        }

        for token in &self.tokens {
            let Some(symbol) = self.symbols.get(token.symbol as usize) else {
                return malformed(format!("token /{}/ has no symbol", token.pattern));
            };
            if symbol.kind != SymbolKind::Terminal {
                return Err(GrammarLoadError::InvalidToken {
                    name: symbol.name.clone(),
                    message: "lexical definition on a non-terminal".into(),
                });
            }
        }
        for &external in &self.externals {
            if external as usize >= symbol_count {
                return malformed(format!("external symbol {external} out of range"));
            }
        }
        Ok(())
    }
}
