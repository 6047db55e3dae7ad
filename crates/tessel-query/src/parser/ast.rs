//! Typed AST wrappers over CST nodes.
//!
//! Each struct wraps a `SyntaxNode` and provides typed accessors. Accessors
//! return `None` for parts the parser had to skip after an error.

use rowan::TextRange;

use super::cst::{SyntaxKind, SyntaxNode, SyntaxToken};
use super::grammar::unescape_char;

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }

            pub fn text_range(&self) -> TextRange {
                self.0.text_range()
            }
        }
    };
}

ast_node!(Root, Root);
ast_node!(Pattern, Pattern);
ast_node!(Tree, Tree);
ast_node!(Group, Group);
ast_node!(Alt, Alt);
ast_node!(Str, Str);
ast_node!(Wildcard, Wildcard);
ast_node!(Field, Field);
ast_node!(NegatedField, NegatedField);
ast_node!(Anchor, Anchor);
ast_node!(Quantifier, Quantifier);
ast_node!(Capture, Capture);
ast_node!(Predicate, Predicate);

/// Any pattern expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Tree(Tree),
    Group(Group),
    Alt(Alt),
    Str(Str),
    Wildcard(Wildcard),
    Field(Field),
    NegatedField(NegatedField),
    Anchor(Anchor),
    Quantifier(Quantifier),
    Capture(Capture),
    Predicate(Predicate),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::Tree => Tree::cast(node).map(Expr::Tree),
            SyntaxKind::Group => Group::cast(node).map(Expr::Group),
            SyntaxKind::Alt => Alt::cast(node).map(Expr::Alt),
            SyntaxKind::Str => Str::cast(node).map(Expr::Str),
            SyntaxKind::Wildcard => Wildcard::cast(node).map(Expr::Wildcard),
            SyntaxKind::Field => Field::cast(node).map(Expr::Field),
            SyntaxKind::NegatedField => NegatedField::cast(node).map(Expr::NegatedField),
            SyntaxKind::Anchor => Anchor::cast(node).map(Expr::Anchor),
            SyntaxKind::Quantifier => Quantifier::cast(node).map(Expr::Quantifier),
            SyntaxKind::Capture => Capture::cast(node).map(Expr::Capture),
            SyntaxKind::Predicate => Predicate::cast(node).map(Expr::Predicate),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Expr::Tree(n) => n.as_cst(),
            Expr::Group(n) => n.as_cst(),
            Expr::Alt(n) => n.as_cst(),
            Expr::Str(n) => n.as_cst(),
            Expr::Wildcard(n) => n.as_cst(),
            Expr::Field(n) => n.as_cst(),
            Expr::NegatedField(n) => n.as_cst(),
            Expr::Anchor(n) => n.as_cst(),
            Expr::Quantifier(n) => n.as_cst(),
            Expr::Capture(n) => n.as_cst(),
            Expr::Predicate(n) => n.as_cst(),
        }
    }

    pub fn text_range(&self) -> TextRange {
        self.as_cst().text_range()
    }
}

fn token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| t.kind() == kind)
}

fn exprs(node: &SyntaxNode) -> impl Iterator<Item = Expr> + '_ {
    node.children().filter_map(Expr::cast)
}

impl Root {
    pub fn patterns(&self) -> impl Iterator<Item = Pattern> + '_ {
        self.0.children().filter_map(Pattern::cast)
    }
}

impl Pattern {
    pub fn expr(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

/// What a `(...)` node pattern names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeKind {
    /// `(identifier ...)`
    Named(SyntaxToken),
    /// `(_ ...)`
    AnyNamed,
    /// `(ERROR ...)`
    Error,
    /// `(MISSING ...)`
    Missing,
}

impl Tree {
    pub fn kind(&self) -> Option<TreeKind> {
        let first = self
            .0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| !t.kind().is_trivia() && t.kind() != SyntaxKind::ParenOpen)?;
        match first.kind() {
            SyntaxKind::Id => Some(TreeKind::Named(first)),
            SyntaxKind::Underscore => Some(TreeKind::AnyNamed),
            SyntaxKind::KwError => Some(TreeKind::Error),
            SyntaxKind::KwMissing => Some(TreeKind::Missing),
            _ => None,
        }
    }

    pub fn children(&self) -> impl Iterator<Item = Expr> + '_ {
        exprs(&self.0)
    }
}

impl Group {
    pub fn children(&self) -> impl Iterator<Item = Expr> + '_ {
        exprs(&self.0)
    }
}

impl Alt {
    pub fn branches(&self) -> impl Iterator<Item = Expr> + '_ {
        exprs(&self.0)
    }
}

impl Str {
    /// The literal with escapes resolved.
    pub fn value(&self) -> String {
        token(&self.0, SyntaxKind::StrVal)
            .map(|t| unescape(t.text()))
            .unwrap_or_default()
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(escaped) => out.push(unescape_char(escaped).unwrap_or(escaped)),
            None => out.push('\\'),
        }
    }
    out
}

impl Field {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Id)
    }

    pub fn value(&self) -> Option<Expr> {
        exprs(&self.0).next()
    }
}

impl NegatedField {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Id)
    }
}

impl Quantifier {
    pub fn inner(&self) -> Option<Expr> {
        exprs(&self.0).next()
    }

    pub fn operator(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| matches!(t.kind(), SyntaxKind::Star | SyntaxKind::Plus | SyntaxKind::Question))
    }
}

impl Capture {
    pub fn inner(&self) -> Option<Expr> {
        exprs(&self.0).next()
    }

    /// The name after `@`. Captures nest, so this is the last direct `Id`.
    pub fn name(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::Id)
            .last()
    }
}

/// One argument of a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateArg {
    Capture { name: String, range: TextRange },
    String(String),
    Identifier(String),
}

impl Predicate {
    /// The name with the leading `#`, e.g. `#eq?`.
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::PredicateName)
    }

    pub fn args(&self) -> Vec<PredicateArg> {
        let mut args = Vec::new();
        let mut at: Option<TextRange> = None;
        for element in self.0.children_with_tokens() {
            match element {
                rowan::NodeOrToken::Node(node) => {
                    if let Some(s) = Str::cast(node) {
                        args.push(PredicateArg::String(s.value()));
                    }
                }
                rowan::NodeOrToken::Token(t) => match t.kind() {
                    SyntaxKind::At => at = Some(t.text_range()),
                    SyntaxKind::Id => match at.take() {
                        Some(start) => args.push(PredicateArg::Capture {
                            name: t.text().to_owned(),
                            range: start.cover(t.text_range()),
                        }),
                        None => args.push(PredicateArg::Identifier(t.text().to_owned())),
                    },
                    _ => {}
                },
            }
        }
        args
    }
}
