use tessel_core::GrammarError;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error("grammar has no rules")]
    EmptyGrammar,
    #[error("start rule `{0}` must not be a token")]
    TokenStartRule(String),
    #[error("undefined symbol `{0}`")]
    UnknownSymbol(String),
    #[error("undefined precedence `{0}`")]
    UnknownPrecedence(String),
    #[error("extra `{0}` must be a token")]
    NonTerminalExtra(String),
    #[error("rule `{0}` cannot be used inside a token")]
    NonLexicalInToken(String),
    #[error("invalid token `{name}`: {message}")]
    InvalidToken { name: String, message: String },
    #[error("token `{0}` matches the empty string")]
    EmptyToken(String),
    #[error("unresolved conflict in state {state} on `{lookahead}`: {description}")]
    UnresolvedConflict {
        state: usize,
        lookahead: String,
        description: String,
    },
    #[error("cannot compile lexer: {0}")]
    Lexer(String),
    #[error("table too large: {0}")]
    TooLarge(String),
}
