//! This module contains the parser for the pattern syntax.
//! Patterns are regular expressions in the syntax of the `regex_syntax` crate, of which only a
//! subset is supported, extended by two forms that are resolved in a pre-pass:
//! * `{name}` inserts the pattern of the macro `name` as a non-capturing group,
//! * `"text"` matches `text` verbatim, `\"` stands for a quote inside of it.

use std::{fmt, time::Instant};

use log::trace;
use regex_syntax::ast::{parse::Parser, Ast};
use rustc_hash::FxHashMap;

use crate::{BuildError, LexDfaError, LexDfaErrorKind, Result};

/// The declaration a pattern belongs to. It is used in error messages.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Origin<'a> {
    Expression(&'a str),
    Macro(&'a str),
}

impl fmt::Display for Origin<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Expression(name) => write!(f, "expression '{}'", name),
            Origin::Macro(name) => write!(f, "macro '{}'", name),
        }
    }
}

/// Parse the pattern into an abstract syntax tree (AST).
/// Macro references are replaced by the already expanded macro patterns.
/// # Errors
/// An error is returned if a macro is unknown or the regex syntax is invalid.
pub(crate) fn parse_regex_syntax(
    pattern: &str,
    macros: &FxHashMap<String, String>,
    origin: Origin<'_>,
) -> Result<Ast> {
    let expanded = expand(pattern, macros, origin)?;
    parse_expanded(&expanded, origin)
}

/// Parse plain regex syntax, i.e. a pattern without macro references and quoted text.
pub(crate) fn parse_expanded(pattern: &str, origin: Origin<'_>) -> Result<Ast> {
    let now = Instant::now();
    match Parser::new().parse(pattern) {
        Ok(ast) => {
            let elapsed_time = now.elapsed();
            trace!(
                "Parsing '{}' took {} microseconds.",
                pattern,
                elapsed_time.as_micros()
            );
            Ok(ast)
        }
        Err(e) => Err(LexDfaError::new(LexDfaErrorKind::RegexSyntaxError(
            e,
            origin.to_string(),
        ))),
    }
}

/// Resolve macro references and quoted text into plain regex syntax.
pub(crate) fn expand(
    pattern: &str,
    macros: &FxHashMap<String, String>,
    origin: Origin<'_>,
) -> Result<String> {
    let mut result = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut class_depth = 0usize;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                result.push(c);
                if let Some(escaped) = chars.next() {
                    result.push(escaped);
                }
            }
            '[' => {
                class_depth += 1;
                result.push(c);
                // A closing bracket right after the opening one is a literal.
                if chars.peek() == Some(&'^') {
                    result.push('^');
                    chars.next();
                }
                if chars.peek() == Some(&']') {
                    result.push(']');
                    chars.next();
                }
            }
            ']' if class_depth > 0 => {
                class_depth -= 1;
                result.push(c);
            }
            '"' if class_depth == 0 => {
                let mut text = String::new();
                while let Some(c) = chars.next() {
                    match c {
                        '"' => break,
                        '\\' if chars.peek() == Some(&'"') => {
                            text.push('"');
                            chars.next();
                        }
                        _ => text.push(c),
                    }
                }
                result.push_str(&regex_syntax::escape(&text));
            }
            '{' if class_depth == 0 && starts_identifier(chars.peek()) => {
                let mut name = String::new();
                while let Some(c) = chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_') {
                    name.push(c);
                }
                if chars.next_if_eq(&'}').is_none() {
                    // Not a macro reference, e.g. an invalid repetition. The parser reports it.
                    result.push('{');
                    result.push_str(&name);
                    continue;
                }
                match macros.get(&name) {
                    Some(expansion) => {
                        result.push_str("(?:");
                        result.push_str(expansion);
                        result.push(')');
                    }
                    None => {
                        return Err(BuildError::UnknownMacro {
                            name,
                            origin: origin.to_string(),
                        }
                        .into())
                    }
                }
            }
            _ => result.push(c),
        }
    }
    Ok(result)
}

fn starts_identifier(c: Option<&char>) -> bool {
    c.is_some_and(|c| c.is_ascii_alphabetic() || *c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_macros() -> FxHashMap<String, String> {
        FxHashMap::default()
    }

    #[test]
    fn test_parse_regex_syntax_valid() {
        let ast = parse_regex_syntax(r"\d", &no_macros(), Origin::Expression("digit")).unwrap();
        assert!(matches!(ast, Ast::ClassPerl(_)));
    }

    #[test]
    fn test_parse_regex_syntax_invalid() {
        let error = parse_regex_syntax("a|(b]|c", &no_macros(), Origin::Macro("myMacro"))
            .unwrap_err();
        assert!(matches!(
            *error.source,
            LexDfaErrorKind::RegexSyntaxError(_, ref origin) if origin == "macro 'myMacro'"
        ));
    }

    #[test]
    fn test_expand_quoted_text() {
        let expanded = expand(r#""(,)""#, &no_macros(), Origin::Expression("e")).unwrap();
        assert_eq!(expanded, r"\(,\)");
        let expanded = expand(r#""\"""#, &no_macros(), Origin::Expression("e")).unwrap();
        assert_eq!(expanded, "\"");
        // Quotes in a class are literal.
        let expanded = expand(r#"[^"]+"#, &no_macros(), Origin::Expression("e")).unwrap();
        assert_eq!(expanded, r#"[^"]+"#);
    }

    #[test]
    fn test_expand_macros() {
        let mut macros = no_macros();
        macros.insert("Digit".to_string(), "[0-9]".to_string());
        macros.insert("NonDigit".to_string(), "[a-zA-Z_]".to_string());
        let expanded = expand(
            "{NonDigit}({NonDigit}|{Digit})*",
            &macros,
            Origin::Expression("identifier"),
        )
        .unwrap();
        assert_eq!(
            expanded,
            "(?:[a-zA-Z_])((?:[a-zA-Z_])|(?:[0-9]))*"
        );
        // Repetitions and escaped braces stay untouched.
        let expanded = expand(r"a{2,4}\{Digit}", &macros, Origin::Expression("e")).unwrap();
        assert_eq!(expanded, r"a{2,4}\{Digit}");
    }

    #[test]
    fn test_unknown_macro() {
        let error = expand("{myMacro}", &no_macros(), Origin::Expression("myExpression"))
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Unknown macro identifier 'myMacro' in expression 'myExpression'"
        );
    }
}
