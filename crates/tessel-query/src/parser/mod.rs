//! Parser for the query language.
//!
//! Produces a lossless concrete syntax tree through Rowan's green tree
//! builder:
//!
//! - Tokens carry spans; text is sliced only when a tree node is built.
//! - Whitespace and comments are buffered, then attached as leading trivia.
//! - Quantifiers and captures wrap what came before them via checkpoints.
//! - Each production has a recovery set deciding when to bail out.
//!
//! The parser always produces a tree. Unknown tokens are wrapped in
//! `Error` nodes and consumed, missing tokens are reported without being
//! consumed, and past the recursion limit the remaining input goes into a
//! single `Error` node.

pub mod ast;
pub mod cst;
pub mod lexer;

mod core;
mod grammar;

#[cfg(test)]
mod grammar_tests;

use std::fmt::Write as _;

pub use ast::{Expr, PredicateArg, Root, TreeKind};
pub use cst::{SyntaxKind, SyntaxNode, SyntaxToken};

use crate::diagnostics::Diagnostics;
use core::Parser;
use lexer::lex;

/// A parsed query. The tree is always complete; problems are reported in
/// the diagnostics.
#[derive(Debug, Clone)]
pub struct Parse {
    cst: rowan::GreenNode,
    diagnostics: Diagnostics,
    recursion_exceeded: bool,
}

impl Parse {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.cst.clone())
    }

    pub fn root(&self) -> Option<Root> {
        Root::cast(self.syntax())
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn recursion_exceeded(&self) -> bool {
        self.recursion_exceeded
    }

    /// The tree without trivia, one node or token per line.
    pub fn dump_cst(&self) -> String {
        let mut out = String::new();
        dump_node(&self.syntax(), 0, &mut out);
        out
    }
}

pub fn parse(source: &str, recursion_limit: u32) -> Parse {
    let mut parser = Parser::new(source, lex(source)).with_recursion_limit(recursion_limit);
    parser.parse_root();
    let (cst, diagnostics, recursion_exceeded) = parser.finish();
    Parse {
        cst,
        diagnostics: diagnostics.filtered(),
        recursion_exceeded,
    }
}

fn dump_node(node: &SyntaxNode, depth: usize, out: &mut String) {
    let _ = writeln!(out, "{:indent$}{:?}", "", node.kind(), indent = depth * 2);
    for element in node.children_with_tokens() {
        match element {
            rowan::NodeOrToken::Node(child) => dump_node(&child, depth + 1, out),
            rowan::NodeOrToken::Token(token) if !token.kind().is_trivia() => {
                let _ = writeln!(
                    out,
                    "{:indent$}{:?} {:?}",
                    "",
                    token.kind(),
                    token.text(),
                    indent = (depth + 1) * 2
                );
            }
            rowan::NodeOrToken::Token(_) => {}
        }
    }
}
