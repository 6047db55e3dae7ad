//! Lexer for the query language.
//!
//! Tokens carry spans only; text is sliced from the source when a tree node
//! is built. Runs of unrecognized characters become one `Garbage` token.

use logos::Logos;
use rowan::TextRange;

use super::cst::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

impl Token {
    #[inline]
    pub fn new(kind: SyntaxKind, span: TextRange) -> Self {
        Self { kind, span }
    }
}

fn text_range(start: usize, end: usize) -> TextRange {
    TextRange::new((start as u32).into(), (end as u32).into())
}

/// Tokenizes `source`, coalescing lexer errors and splitting string
/// literals into quote, content and quote.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = SyntaxKind::lexer(source);
    let mut error_start: Option<usize> = None;

    loop {
        match lexer.next() {
            Some(Ok(kind)) => {
                let span = lexer.span();
                if let Some(start) = error_start.take() {
                    tokens.push(Token::new(SyntaxKind::Garbage, text_range(start, span.start)));
                }
                if kind == SyntaxKind::StringLiteral {
                    split_string(span.start, span.end, &mut tokens);
                } else {
                    tokens.push(Token::new(kind, text_range(span.start, span.end)));
                }
            }
            Some(Err(())) => {
                error_start.get_or_insert(lexer.span().start);
            }
            None => {
                if let Some(start) = error_start.take() {
                    tokens.push(Token::new(SyntaxKind::Garbage, text_range(start, source.len())));
                }
                break;
            }
        }
    }

    tokens
}

fn split_string(start: usize, end: usize, tokens: &mut Vec<Token>) {
    tokens.push(Token::new(SyntaxKind::DoubleQuote, text_range(start, start + 1)));
    if end - start > 2 {
        tokens.push(Token::new(SyntaxKind::StrVal, text_range(start + 1, end - 1)));
    }
    tokens.push(Token::new(SyntaxKind::DoubleQuote, text_range(end - 1, end)));
}

#[inline]
pub fn token_text<'q>(source: &'q str, token: &Token) -> &'q str {
    &source[std::ops::Range::<usize>::from(token.span)]
}
