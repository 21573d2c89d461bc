use thiserror::Error;

/// The result type for the `lexdfa` crate.
pub type Result<T> = std::result::Result<T, LexDfaError>;

/// The error type for the `lexdfa` crate.
#[derive(Error, Debug)]
pub struct LexDfaError {
    /// The source of the error.
    pub source: Box<LexDfaErrorKind>,
}

impl LexDfaError {
    /// Create a new `LexDfaError`.
    pub fn new(kind: LexDfaErrorKind) -> Self {
        LexDfaError {
            source: Box::new(kind),
        }
    }

    /// The messages of the error. A collected error yields one message per contained error.
    pub fn messages(&self) -> Vec<String> {
        match &*self.source {
            LexDfaErrorKind::Collected(errors) => errors.iter().flat_map(|e| e.messages()).collect(),
            kind => vec![kind.to_string()],
        }
    }
}

impl std::fmt::Display for LexDfaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// The error kind type.
#[derive(Error, Debug)]
pub enum LexDfaErrorKind {
    /// An error occurred during the parsing of the regex syntax.
    /// The string names the expression or macro the pattern belongs to.
    #[error(
        "{} at line {}, column {} in {}",
        .0.kind(),
        .0.span().start.line,
        .0.span().start.column,
        .1
    )]
    RegexSyntaxError(regex_syntax::ast::Error, String),

    /// A std::io error occurred.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// Used regex features that are not supported.
    #[error("Unsupported regex feature: {0}")]
    UnsupportedFeature(String),

    /// The declaration of the lexer is invalid.
    #[error(transparent)]
    BuildError(BuildError),

    /// All errors found during a build that does not fail fast.
    #[error("{}", join_messages(.0))]
    Collected(Vec<LexDfaError>),
}

fn join_messages(errors: &[LexDfaError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<std::io::Error> for LexDfaError {
    fn from(error: std::io::Error) -> Self {
        LexDfaError::new(LexDfaErrorKind::IoError(error))
    }
}

impl From<BuildError> for LexDfaError {
    fn from(error: BuildError) -> Self {
        LexDfaError::new(LexDfaErrorKind::BuildError(error))
    }
}

/// Errors in the declaration of contexts, expressions and macros.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// An expression name is used twice in one context.
    #[error("Duplicate expression '{name}' in context '{context}'")]
    DuplicateExpression {
        /// The expression name.
        name: String,
        /// The context name.
        context: String,
    },

    /// A context name is used twice.
    #[error("Duplicate context name : '{0}'")]
    DuplicateContext(String),

    /// An expression pushes a context that does not exist.
    #[error("Unknown context name : '{0}'")]
    UnknownContext(String),

    /// The default context has nothing to pop back to.
    #[error("Cannot set a pop action in main context on expression '{0}'")]
    PopInMainContext(String),

    /// A pattern refers to a macro that is not defined.
    #[error("Unknown macro identifier '{name}' in {origin}")]
    UnknownMacro {
        /// The macro name.
        name: String,
        /// The expression or macro with the reference.
        origin: String,
    },

    /// A pattern is empty.
    #[error("Invalid empty expression")]
    EmptyExpression,

    /// A name is empty.
    #[error("Invalid empty name")]
    EmptyName,

    /// A name is not an identifier.
    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// Two expressions share an explicit lexeme id.
    #[error("Duplicate lexeme id {id} on expression '{name}'")]
    DuplicateLexemeId {
        /// The lexeme id.
        id: usize,
        /// The expression that uses the id a second time.
        name: String,
    },
}
