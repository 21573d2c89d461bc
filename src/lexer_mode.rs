//! Module with the declaration types of a lexer: expressions and the modes they are grouped in.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What happens to the context stack when an expression matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MatchAction {
    /// The current context stays active.
    #[default]
    None,
    /// The named context is entered.
    Push(String),
    /// The current context is left and the calling context becomes active again.
    Pop,
}

/// An expression of a lexer mode.
/// The expression is a regular expression and becomes one lexeme of the lexer.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Expression {
    pattern: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "is_false"))]
    verbatim: bool,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    lexeme: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default))]
    action: MatchAction,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    on_match: Option<String>,
}

#[cfg(feature = "serde")]
fn is_false(value: &bool) -> bool {
    !*value
}

impl Expression {
    /// Create a new expression from a pattern.
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            ..Default::default()
        }
    }

    /// Create an expression that matches the text literally.
    pub fn verbatim(text: &str) -> Self {
        Self {
            pattern: text.to_string(),
            verbatim: true,
            ..Default::default()
        }
    }

    /// Set the name of the expression. Unnamed expressions are called `_lexeme_N` after their
    /// lexeme id.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Set an explicit lexeme id.
    pub fn with_lexeme(mut self, lexeme: usize) -> Self {
        self.lexeme = Some(lexeme);
        self
    }

    /// Enter the named context when the expression matches.
    pub fn push(mut self, context: &str) -> Self {
        self.action = MatchAction::Push(context.to_string());
        self
    }

    /// Return to the calling context when the expression matches.
    pub fn pop(mut self) -> Self {
        self.action = MatchAction::Pop;
        self
    }

    /// Attach a code snippet that a generator emits for a match of the expression.
    pub fn on_match(mut self, code: &str) -> Self {
        self.on_match = Some(code.to_string());
        self
    }

    /// Get the pattern.
    #[inline]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Get the name, if set.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Check if the pattern is matched literally.
    #[inline]
    pub fn is_verbatim(&self) -> bool {
        self.verbatim
    }

    /// Get the explicit lexeme id, if set.
    #[inline]
    pub fn lexeme(&self) -> Option<usize> {
        self.lexeme
    }

    /// Get the action on match.
    #[inline]
    pub fn action(&self) -> &MatchAction {
        &self.action
    }

    /// Get the on-match code snippet.
    #[inline]
    pub fn on_match_code(&self) -> Option<&str> {
        self.on_match.as_deref()
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.verbatim {
            write!(f, "\"{}\"", self.pattern.escape_default())?;
        } else {
            write!(f, "{}", self.pattern.escape_default())?;
        }
        match &self.action {
            MatchAction::None => Ok(()),
            MatchAction::Push(context) => write!(f, " -> push {}", context),
            MatchAction::Pop => write!(f, " -> pop"),
        }
    }
}

/// A lexer mode. Each mode becomes one lexer context with a DFA of its own.
/// The first mode of a lexer is its default context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LexerMode {
    /// The name of the mode.
    pub name: String,
    /// The expressions of the mode. If two expressions match the same longest input, the one
    /// with the lower lexeme id wins.
    pub expressions: Vec<Expression>,
}

impl LexerMode {
    /// Creates a new lexer mode with the given name and expressions.
    pub fn new(name: &str, expressions: &[Expression]) -> Self {
        Self {
            name: name.to_string(),
            expressions: expressions.to_vec(),
        }
    }

    /// Add an expression to the mode.
    pub fn add_expression(mut self, expression: Expression) -> Self {
        self.expressions.push(expression);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_builder() {
        let expression = Expression::new(r"/\*")
            .with_name("comment")
            .push("Comment")
            .on_match("depth += 1;");
        assert_eq!(expression.pattern(), r"/\*");
        assert_eq!(expression.name(), Some("comment"));
        assert_eq!(expression.action(), &MatchAction::Push("Comment".to_string()));
        assert_eq!(expression.on_match_code(), Some("depth += 1;"));
        assert_eq!(expression.to_string(), r"/\\* -> push Comment");
        assert!(Expression::verbatim("(,)").is_verbatim());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_mode_from_json() {
        let json = r#"{
            "name": "Comment",
            "expressions": [
                { "pattern": "[^\\*]+" },
                { "pattern": "\\*/", "action": "Pop", "lexeme": 9 }
            ]
        }"#;
        let mode: LexerMode = serde_json::from_str(json).unwrap();
        assert_eq!(
            mode,
            LexerMode::new(
                "Comment",
                &[
                    Expression::new(r"[^\*]+"),
                    Expression::new(r"\*/").pop().with_lexeme(9)
                ]
            )
        );
    }
}
