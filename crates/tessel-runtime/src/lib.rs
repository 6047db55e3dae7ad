//! Incremental, error-tolerant parsing driven by a Grammar Table.
//!
//! # Example
//!
//! ```
//! use tessel_runtime::{Language, Parser};
//!
//! let grammar = r#"{
//!     "name": "list",
//!     "rules": {
//!         "list": { "type": "REPEAT", "content": { "type": "SYMBOL", "name": "word" } },
//!         "word": { "type": "PATTERN", "value": "[a-z]+" }
//!     }
//! }"#;
//! let table = tessel_generate::generate_from_json(grammar, &Default::default()).unwrap();
//! let language = Language::new(table).unwrap();
//!
//! let mut parser = Parser::new();
//! parser.set_language(&language);
//! let tree = parser.parse("foo bar", None).unwrap();
//! assert_eq!(tree.root_node().to_sexp(), "(list (word) (word))");
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod language;
mod lexer;
pub mod parser;
mod registry;
mod scanner;
mod subtree;
pub mod tree;

#[cfg(test)]
mod test_grammars;

pub use language::{Language, LanguageError};
pub use parser::{ParseError, ParseOptions, Parser};
pub use registry::LanguageRegistry;
pub use scanner::{ExternalScanner, ScanCursor, ScannerState};
pub use tree::{Node, Range, Tree, TreeCursor};

pub use tessel_core::{InputEdit, Length, Point};
