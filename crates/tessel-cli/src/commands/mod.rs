pub mod generate;
pub mod lang_resolver;
pub mod langs;
pub mod parse;
pub mod query;
pub mod source;

#[cfg(test)]
mod lang_resolver_tests;
