use rowan::TextRange;

/// Diagnostic kinds ordered by priority, highest first.
///
/// When spans overlap, a higher-priority diagnostic suppresses a
/// lower-priority one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Cascade through the rest of the query
    UnclosedTree,
    UnclosedAlternation,

    // Something required is missing
    ExpectedExpression,
    ExpectedCaptureName,
    ExpectedFieldName,
    ExpectedPredicateName,

    // Something that does not belong
    EmptyTree,
    BareIdentifier,
    InvalidPredicateArgument,
    ErrorMissingOutsideParens,
    PredicateOutsidePattern,
    CaptureWithoutTarget,
    InvalidEscape,
    UnexpectedToken,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        Severity::Error
    }

    pub fn suppresses(&self, other: &DiagnosticKind) -> bool {
        self < other
    }

    /// Unclosed delimiters; a root-cause error at the same position wins
    /// over them.
    pub fn is_structural_error(&self) -> bool {
        matches!(self, Self::UnclosedTree | Self::UnclosedAlternation)
    }

    pub fn is_root_cause_error(&self) -> bool {
        matches!(
            self,
            Self::ExpectedExpression
                | Self::ExpectedCaptureName
                | Self::ExpectedFieldName
                | Self::ExpectedPredicateName
        )
    }

    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::EmptyTree => Some("use `(_)` to match any named node, or `_` for any node"),
            Self::BareIdentifier => Some("node patterns need parentheses: `(identifier)`"),
            Self::PredicateOutsidePattern => {
                Some("wrap the pattern and its predicate: `((node) @x (#eq? @x \"text\"))`")
            }
            _ => None,
        }
    }

    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UnclosedTree => "missing closing `)`",
            Self::UnclosedAlternation => "missing closing `]`",

            Self::ExpectedExpression => "expected a pattern",
            Self::ExpectedCaptureName => "expected capture name",
            Self::ExpectedFieldName => "expected field name",
            Self::ExpectedPredicateName => "expected predicate name",

            Self::EmptyTree => "empty `()` is not allowed",
            Self::BareIdentifier => "bare identifier is not a pattern",
            Self::InvalidPredicateArgument => "invalid predicate argument",
            Self::ErrorMissingOutsideParens => "special node requires parentheses",
            Self::PredicateOutsidePattern => "predicate is not attached to a pattern",
            Self::CaptureWithoutTarget => "capture has no target",
            Self::InvalidEscape => "invalid escape sequence",
            Self::UnexpectedToken => "unexpected token",
        }
    }

    /// Renders the message, with `detail` appended when given.
    pub fn message(&self, detail: Option<&str>) -> String {
        match detail {
            None => self.fallback_message().to_owned(),
            Some(detail) if self.is_structural_error() => {
                format!("{}; {detail}", self.fallback_message())
            }
            Some(detail) => format!("{}: {detail}", self.fallback_message()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    pub(crate) replacement: String,
    pub(crate) description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) range: TextRange,
    pub(crate) message: String,
}

/// One diagnostic: what went wrong, where, and optionally how to fix it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    pub(crate) range: TextRange,
    pub(crate) message: String,
    pub(crate) fix: Option<Fix>,
    pub(crate) related: Vec<RelatedInfo>,
    pub(crate) hints: Vec<String>,
}

impl DiagnosticMessage {
    pub(crate) fn with_default_message(kind: DiagnosticKind, range: TextRange) -> Self {
        Self {
            kind,
            range,
            message: kind.fallback_message().to_owned(),
            fix: None,
            related: Vec::new(),
            hints: kind.default_hint().map(str::to_owned).into_iter().collect(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    /// Byte offset where the problem starts.
    pub fn offset(&self) -> usize {
        self.range.start().into()
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.range.into()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}..{}: {}",
            self.severity(),
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )?;
        if let Some(fix) = &self.fix {
            write!(f, " (fix: {})", fix.description)?;
        }
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.range.start()),
                u32::from(related.range.end())
            )?;
        }
        for hint in &self.hints {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}
