//! Syntax kinds for the query language.
//!
//! `SyntaxKind` covers both token kinds (from the lexer) and node kinds
//! (from the parser). Logos derives token recognition; node kinds carry no
//! token attributes. `QueryLang` ties the kinds to Rowan's tree types.

use logos::Logos;
use rowan::Language;

/// All token and node kinds. Tokens first, then nodes, then the `__LAST`
/// sentinel.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("(")]
    ParenOpen = 0,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(":")]
    Colon,

    #[token("!")]
    Negation,

    #[token("_", priority = 3)]
    Underscore,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    #[token("?")]
    Question,

    #[token(".")]
    Dot,

    #[token("@")]
    At,

    #[regex(r#""(?:[^"\\\n]|\\.)*""#)]
    #[doc(hidden)]
    StringLiteral, // split by the lexer, never in the tree

    DoubleQuote,
    /// String content between quotes, escapes still in place.
    StrVal,

    #[token("ERROR")]
    KwError,

    #[token("MISSING")]
    KwMissing,

    /// Node kinds, field names and capture names. Dots and hyphens are
    /// allowed for capture names like `@function.name`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_.\-]*")]
    Id,

    /// `#eq?`, `#match?`, `#set!` and friends.
    #[regex(r"#[a-zA-Z_][a-zA-Z0-9_\-]*[?!]?")]
    PredicateName,

    #[regex(r"[ \t\r]+")]
    Whitespace,

    #[token("\n")]
    Newline,

    #[regex(r";[^\n]*", allow_greedy = true)]
    Comment,

    /// Coalesced unrecognized characters.
    Garbage,
    Error,

    // Node kinds
    Root,
    /// One top-level pattern.
    Pattern,
    /// `(kind ...)`, `(_ ...)`, `(ERROR)`, `(MISSING ...)`.
    Tree,
    /// `((a) (b))`: a sibling sequence.
    Group,
    Alt,
    Str,
    /// Bare `_`.
    Wildcard,
    Field,
    NegatedField,
    Anchor,
    Quantifier,
    Capture,
    /// `(#name? args...)`.
    Predicate,

    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Newline | Comment)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Error | Garbage)
    }

    const ALL: [SyntaxKind; __LAST as usize] = [
        ParenOpen,
        ParenClose,
        BracketOpen,
        BracketClose,
        Colon,
        Negation,
        Underscore,
        Star,
        Plus,
        Question,
        Dot,
        At,
        StringLiteral,
        DoubleQuote,
        StrVal,
        KwError,
        KwMissing,
        Id,
        PredicateName,
        Whitespace,
        Newline,
        Comment,
        Garbage,
        Error,
        Root,
        Pattern,
        Tree,
        Group,
        Alt,
        Str,
        Wildcard,
        Field,
        NegatedField,
        Anchor,
        Quantifier,
        Capture,
        Predicate,
    ];
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for Rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QueryLang {}

impl Language for QueryLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        SyntaxKind::ALL
            .get(usize::from(raw.0))
            .copied()
            .unwrap_or(SyntaxKind::Error)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<QueryLang>;
pub type SyntaxToken = rowan::SyntaxToken<QueryLang>;

/// Bitset of token kinds for O(1) membership tests.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    /// Panics at compile time if a kind's discriminant is 64 or more.
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        kind < 64 && self.0 & (1 << kind) != 0
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries(SyntaxKind::ALL.iter().filter(|k| self.contains(**k)))
            .finish()
    }
}

pub mod token_sets {
    use super::*;

    /// Tokens that can start a pattern. `At` is excluded: captures wrap a
    /// pattern, they never start one.
    pub const PATTERN_FIRST: TokenSet = TokenSet::new(&[
        ParenOpen,
        BracketOpen,
        Underscore,
        Id,
        DoubleQuote,
        Dot,
        Negation,
        KwError,
        KwMissing,
    ]);

    /// Top-level patterns: anchors and negated fields only make sense
    /// inside a node.
    pub const ROOT_FIRST: TokenSet = TokenSet::new(&[
        ParenOpen,
        BracketOpen,
        Underscore,
        Id,
        DoubleQuote,
        KwError,
        KwMissing,
    ]);

    pub const QUANTIFIERS: TokenSet = TokenSet::new(&[Star, Plus, Question]);

    pub const TREE_RECOVERY: TokenSet = TokenSet::new(&[BracketClose]);

    pub const ALT_RECOVERY: TokenSet = TokenSet::new(&[ParenClose]);
}
