//! Explicit name and extension lookup for languages.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::Language;

/// Languages by name, plus file extensions mapped to names.
///
/// The registry is an ordinary value owned by the caller.
#[derive(Clone, Debug, Default)]
pub struct LanguageRegistry {
    languages: BTreeMap<String, Language>,
    extensions: HashMap<String, String>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `language` under `name`, returning the language it replaces.
    pub fn register(&mut self, name: impl Into<String>, language: Language) -> Option<Language> {
        self.languages.insert(name.into(), language)
    }

    /// Maps a file extension (with or without the leading dot) to a
    /// registered name. The name does not have to be registered yet.
    pub fn register_extension(&mut self, extension: &str, name: impl Into<String>) {
        self.extensions
            .insert(normalize_extension(extension), name.into());
    }

    pub fn get(&self, name: &str) -> Option<&Language> {
        self.languages.get(name)
    }

    pub fn for_extension(&self, extension: &str) -> Option<&Language> {
        let name = self.extensions.get(&normalize_extension(extension))?;
        self.get(name)
    }

    pub fn for_path(&self, path: &Path) -> Option<&Language> {
        self.for_extension(path.extension()?.to_str()?)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}
