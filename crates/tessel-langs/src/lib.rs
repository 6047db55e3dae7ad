//! Grammars bundled with tessel.
//!
//! Each language is generated from its JSON grammar on first use and shared
//! afterwards. Enable or disable them with the `lang-*` features.
//!
//! ```
//! let renpy = tessel_langs::renpy().unwrap();
//! assert_eq!(renpy.name(), "renpy");
//! assert!(tessel_langs::from_ext("rpy").is_some());
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod builtin;
mod renpy_scanner;


pub use builtin::*;
pub use renpy_scanner::RenpyScanner;

/// A bundled grammar that failed to turn into a [`tessel_runtime::Language`].
///
/// Cloneable so the cached outcome can be handed to every caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("bundled language `{name}` failed to build: {message}")]
pub struct LangError {
    pub name: &'static str,
    pub message: String,
}
