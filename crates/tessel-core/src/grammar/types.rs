//! Grammar model.

use serde::{Deserialize, Serialize};

/// A language grammar: named rules plus lexical and conflict metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grammar {
    pub name: String,
    /// Rules in declaration order. The first rule is the start rule.
    pub rules: Vec<(String, Rule)>,
    /// Tokens allowed anywhere between grammar symbols.
    #[serde(default)]
    pub extras: Vec<Rule>,
    /// Named precedence orderings, highest first.
    #[serde(default)]
    pub precedences: Vec<Vec<PrecedenceEntry>>,
    /// Rule groups whose conflicts are expected and resolved at parse time.
    #[serde(default)]
    pub conflicts: Vec<Vec<String>>,
    /// Tokens produced by an external scanner, in scanner index order.
    #[serde(default)]
    pub externals: Vec<Rule>,
    #[serde(default)]
    pub inline: Vec<String>,
    #[serde(default)]
    pub supertypes: Vec<String>,
    /// Identifier-like token that keyword literals are checked against.
    #[serde(default)]
    pub word: Option<String>,
    #[serde(default)]
    pub reserved: Vec<(String, Vec<Rule>)>,
    #[serde(default)]
    pub inherits: Option<String>,
}

impl Grammar {
    /// The start rule, if the grammar has any rules.
    pub fn start_rule(&self) -> Option<&str> {
        self.rules.first().map(|(name, _)| name.as_str())
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find_map(|(n, rule)| (n == name).then_some(rule))
    }

    /// Whether nodes of this rule are left out of the visible tree.
    pub fn is_hidden(&self, name: &str) -> bool {
        name.starts_with('_') || self.inline.iter().any(|n| n == name)
    }

    /// Whether `a` and `b` appear together in a declared conflict group.
    pub fn declares_conflict(&self, a: &str, b: &str) -> bool {
        self.conflicts.iter().any(|group| {
            group.iter().any(|n| n == a) && group.iter().any(|n| n == b)
        })
    }
}

/// Grammar rule expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Rule {
    Blank,
    /// Literal token text.
    String(String),
    /// Regular expression token.
    Pattern {
        value: String,
        #[serde(default)]
        flags: Option<String>,
    },
    Symbol(String),
    Seq(Vec<Rule>),
    Choice(Vec<Rule>),
    Repeat(Box<Rule>),
    Repeat1(Box<Rule>),
    Field {
        name: String,
        content: Box<Rule>,
    },
    Alias {
        content: Box<Rule>,
        value: String,
        named: bool,
    },
    /// Lexes the content as a single token.
    Token(Box<Rule>),
    /// Like [`Rule::Token`], but no extras may precede it.
    ImmediateToken(Box<Rule>),
    Prec {
        value: Precedence,
        content: Box<Rule>,
    },
    PrecLeft {
        value: Precedence,
        content: Box<Rule>,
    },
    PrecRight {
        value: Precedence,
        content: Box<Rule>,
    },
    PrecDynamic {
        value: i32,
        content: Box<Rule>,
    },
    Reserved {
        context_name: String,
        content: Box<Rule>,
    },
}

impl Rule {
    /// Whether the rule describes a single token rather than a syntactic structure.
    pub fn is_lexical(&self) -> bool {
        match self {
            Rule::String(_) | Rule::Pattern { .. } | Rule::Token(_) | Rule::ImmediateToken(_) => {
                true
            }
            Rule::Prec { content, .. }
            | Rule::PrecLeft { content, .. }
            | Rule::PrecRight { content, .. }
            | Rule::PrecDynamic { content, .. } => content.is_lexical(),
            _ => false,
        }
    }
}

/// Precedence value, either numeric or a name from [`Grammar::precedences`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precedence {
    Integer(i32),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrecedenceEntry {
    Name(String),
    Symbol(String),
}
