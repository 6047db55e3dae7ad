//! Reading `grammar.json`.
//!
//! Rule objects are internally tagged by their `type` field.

use indexmap::IndexMap;
use serde::Deserialize;

use super::types::{Grammar, Precedence, PrecedenceEntry, Rule};

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("invalid grammar JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("grammar `{0}` has no rules")]
    NoRules(String),
}

impl Grammar {
    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        let doc: GrammarDoc = serde_json::from_str(json)?;
        if doc.rules.is_empty() {
            return Err(GrammarError::NoRules(doc.name));
        }
        Ok(doc.into())
    }
}

#[derive(Debug, Deserialize)]
struct GrammarDoc {
    name: String,
    // Declaration order is significant: the first rule is the start rule.
    rules: IndexMap<String, RuleDoc>,
    #[serde(default)]
    extras: Vec<RuleDoc>,
    #[serde(default)]
    precedences: Vec<Vec<PrecedenceEntryDoc>>,
    #[serde(default)]
    conflicts: Vec<Vec<String>>,
    #[serde(default)]
    externals: Vec<RuleDoc>,
    #[serde(default)]
    inline: Vec<String>,
    #[serde(default)]
    supertypes: Vec<String>,
    #[serde(default)]
    word: Option<String>,
    #[serde(default)]
    reserved: IndexMap<String, Vec<RuleDoc>>,
    #[serde(default)]
    inherits: Option<String>,
}

fn rules(docs: Vec<RuleDoc>) -> Vec<Rule> {
    docs.into_iter().map(Rule::from).collect()
}

impl From<GrammarDoc> for Grammar {
    fn from(doc: GrammarDoc) -> Self {
        Grammar {
            name: doc.name,
            rules: doc
                .rules
                .into_iter()
                .map(|(name, rule)| (name, rule.into()))
                .collect(),
            extras: rules(doc.extras),
            precedences: doc
                .precedences
                .into_iter()
                .map(|level| level.into_iter().map(PrecedenceEntry::from).collect())
                .collect(),
            conflicts: doc.conflicts,
            externals: rules(doc.externals),
            inline: doc.inline,
            supertypes: doc.supertypes,
            word: doc.word,
            reserved: doc
                .reserved
                .into_iter()
                .map(|(context, words)| (context, rules(words)))
                .collect(),
            inherits: doc.inherits,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum RuleDoc {
    Blank,
    String {
        value: String,
    },
    Pattern {
        value: String,
        #[serde(default)]
        flags: Option<String>,
    },
    Symbol {
        name: String,
    },
    Seq {
        members: Vec<RuleDoc>,
    },
    Choice {
        members: Vec<RuleDoc>,
    },
    Repeat {
        content: Box<RuleDoc>,
    },
    Repeat1 {
        content: Box<RuleDoc>,
    },
    Field {
        name: String,
        content: Box<RuleDoc>,
    },
    Alias {
        content: Box<RuleDoc>,
        value: String,
        named: bool,
    },
    Token {
        content: Box<RuleDoc>,
    },
    ImmediateToken {
        content: Box<RuleDoc>,
    },
    Prec {
        value: PrecedenceDoc,
        content: Box<RuleDoc>,
    },
    PrecLeft {
        value: PrecedenceDoc,
        content: Box<RuleDoc>,
    },
    PrecRight {
        value: PrecedenceDoc,
        content: Box<RuleDoc>,
    },
    PrecDynamic {
        value: i32,
        content: Box<RuleDoc>,
    },
    Reserved {
        context_name: String,
        content: Box<RuleDoc>,
    },
}

impl From<RuleDoc> for Rule {
    fn from(doc: RuleDoc) -> Self {
        let boxed = |content: Box<RuleDoc>| Box::new(Rule::from(*content));
        match doc {
            RuleDoc::Blank => Rule::Blank,
            RuleDoc::String { value } => Rule::String(value),
            RuleDoc::Pattern { value, flags } => Rule::Pattern { value, flags },
            RuleDoc::Symbol { name } => Rule::Symbol(name),
            RuleDoc::Seq { members } => Rule::Seq(rules(members)),
            RuleDoc::Choice { members } => Rule::Choice(rules(members)),
            RuleDoc::Repeat { content } => Rule::Repeat(boxed(content)),
            RuleDoc::Repeat1 { content } => Rule::Repeat1(boxed(content)),
            RuleDoc::Field { name, content } => Rule::Field {
                name,
                content: boxed(content),
            },
            RuleDoc::Alias {
                content,
                value,
                named,
            } => Rule::Alias {
                content: boxed(content),
                value,
                named,
            },
            RuleDoc::Token { content } => Rule::Token(boxed(content)),
            RuleDoc::ImmediateToken { content } => Rule::ImmediateToken(boxed(content)),
            RuleDoc::Prec { value, content } => Rule::Prec {
                value: value.into(),
                content: boxed(content),
            },
            RuleDoc::PrecLeft { value, content } => Rule::PrecLeft {
                value: value.into(),
                content: boxed(content),
            },
            RuleDoc::PrecRight { value, content } => Rule::PrecRight {
                value: value.into(),
                content: boxed(content),
            },
            RuleDoc::PrecDynamic { value, content } => Rule::PrecDynamic {
                value,
                content: boxed(content),
            },
            RuleDoc::Reserved {
                context_name,
                content,
            } => Rule::Reserved {
                context_name,
                content: boxed(content),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PrecedenceDoc {
    Integer(i32),
    Name(String),
}

impl From<PrecedenceDoc> for Precedence {
    fn from(doc: PrecedenceDoc) -> Self {
        match doc {
            PrecedenceDoc::Integer(n) => Precedence::Integer(n),
            PrecedenceDoc::Name(name) => Precedence::Name(name),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum PrecedenceEntryDoc {
    String { value: String },
    Symbol { name: String },
}

impl From<PrecedenceEntryDoc> for PrecedenceEntry {
    fn from(doc: PrecedenceEntryDoc) -> Self {
        match doc {
            PrecedenceEntryDoc::String { value } => PrecedenceEntry::Name(value),
            PrecedenceEntryDoc::Symbol { name } => PrecedenceEntry::Symbol(name),
        }
    }
}
