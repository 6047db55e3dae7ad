use std::sync::LazyLock;

use tessel_generate::{TableOptions, generate_from_json};
use tessel_runtime::{Language, LanguageError, LanguageRegistry};
use tessel_table::GrammarTable;

use crate::LangError;
use crate::renpy_scanner::RenpyScanner;

/// Generates the table for a bundled grammar and wraps it.
fn build(
    name: &'static str,
    grammar: &str,
    wrap: fn(GrammarTable) -> Result<Language, LanguageError>,
) -> Result<Language, LangError> {
    let error = |message: String| LangError { name, message };
    let table = generate_from_json(grammar, &TableOptions::default())
        .map_err(|e| error(e.to_string()))?;
    let language = wrap(table).map_err(|e| error(e.to_string()))?;
    tracing::debug!(language = name, "built bundled language");
    Ok(language)
}

fn with_renpy_scanner(table: GrammarTable) -> Result<Language, LanguageError> {
    Language::with_scanner(table, RenpyScanner)
}

macro_rules! define_langs {
    (
        $(
            $fn_name:ident => {
                feature: $feature:literal,
                name: $name:literal,
                grammar: $grammar:literal,
                wrap: $wrap:expr,
                names: [$($alias:literal),* $(,)?],
                extensions: [$($ext:literal),* $(,)?] $(,)?
            }
        ),* $(,)?
    ) => {
        $(
            #[cfg(feature = $feature)]
            pub fn $fn_name() -> Result<Language, LangError> {
                static LANG: LazyLock<Result<Language, LangError>> = LazyLock::new(|| {
                    build($name, include_str!(concat!("../grammars/", $grammar)), $wrap)
                });
                LANG.clone()
            }
        )*

        /// Looks a language up by name or alias, ignoring case.
        pub fn from_name(s: &str) -> Option<Result<Language, LangError>> {
            match s.to_ascii_lowercase().as_str() {
                $(
                    #[cfg(feature = $feature)]
                    $($alias)|* => Some($fn_name()),
                )*
                _ => None,
            }
        }

        /// Looks a language up by file extension, with or without the dot.
        pub fn from_ext(ext: &str) -> Option<Result<Language, LangError>> {
            match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
                $(
                    #[cfg(feature = $feature)]
                    $($ext)|* => Some($fn_name()),
                )*
                _ => None,
            }
        }

        /// Every enabled language.
        pub fn all() -> Result<Vec<Language>, LangError> {
            let langs: Vec<fn() -> Result<Language, LangError>> = vec![
                $(
                    #[cfg(feature = $feature)]
                    $fn_name,
                )*
            ];
            langs.into_iter().map(|f| f()).collect()
        }

        /// A registry holding every enabled language with its extensions.
        pub fn registry() -> Result<LanguageRegistry, LangError> {
            #[allow(unused_mut)]
            let mut registry = LanguageRegistry::new();
            $(
                #[cfg(feature = $feature)]
                {
                    registry.register($name, $fn_name()?);
                    $( registry.register_extension($ext, $name); )*
                }
            )*
            Ok(registry)
        }
    };
}

define_langs! {
    expr => {
        feature: "lang-expr",
        name: "expr",
        grammar: "expr.json",
        wrap: Language::new,
        names: ["expr", "expression"],
        extensions: ["expr"],
    },
    renpy => {
        feature: "lang-renpy",
        name: "renpy",
        grammar: "renpy.json",
        wrap: with_renpy_scanner,
        names: ["renpy", "ren'py", "rpy"],
        extensions: ["rpy", "rpym"],
    },
}
