// Checks the error messages of invalid lexer declarations.
// Run with `cargo test --test error_test`

use lexdfa::{
    BuildError, Expression, LexDfaErrorKind, LexerBuilder, LexerMode, MAIN_CONTEXT,
};
use rstest::rstest;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn main_mode(expressions: &[Expression]) -> LexerMode {
    LexerMode::new(MAIN_CONTEXT, expressions)
}

fn first_error(builder: LexerBuilder) -> String {
    match builder.fail_fast(true).build() {
        Ok(_) => panic!("Expected an error"),
        Err(e) => e.to_string(),
    }
}

#[rstest]
#[case::duplicate_expression(
    LexerBuilder::new().add_mode(main_mode(&[
        Expression::new("hello").with_name("hello"),
        Expression::new("hello").with_name("hello"),
    ])),
    "Duplicate expression 'hello' in context 'main_context'"
)]
#[case::duplicate_context(
    LexerBuilder::new()
        .add_mode(main_mode(&[]))
        .add_mode(LexerMode::new("myContext", &[]))
        .add_mode(LexerMode::new("myContext", &[])),
    "Duplicate context name : 'myContext'"
)]
#[case::unknown_context(
    LexerBuilder::new().add_mode(main_mode(&[
        Expression::new("hello").with_name("hello").push("myContext"),
    ])),
    "Unknown context name : 'myContext'"
)]
#[case::pop_in_main_context(
    LexerBuilder::new().add_mode(main_mode(&[Expression::new("hello").with_name("hello").pop()])),
    "Cannot set a pop action in main context on expression 'hello'"
)]
#[case::expression_syntax_error(
    LexerBuilder::new().add_mode(main_mode(&[
        Expression::new("a|(b]|c").with_name("myExpression"),
    ])),
    "unclosed group at line 1, column 3 in expression 'myExpression'"
)]
#[case::macro_syntax_error(
    LexerBuilder::new().add_macro("myMacro", "a|(b]|c"),
    "unclosed group at line 1, column 3 in macro 'myMacro'"
)]
#[case::unknown_macro(
    LexerBuilder::new().add_mode(main_mode(&[
        Expression::new("{myMacro}").with_name("myExpression"),
    ])),
    "Unknown macro identifier 'myMacro' in expression 'myExpression'"
)]
#[case::empty_repetition(
    LexerBuilder::new().add_mode(main_mode(&[
        Expression::new("a{0,0}").with_name("myExpression"),
    ])),
    "Unsupported regex feature: Empty repetition a{0,0} in expression 'myExpression'"
)]
#[case::repetition_count_too_large(
    LexerBuilder::new().add_mode(main_mode(&[
        Expression::new("a{1001}").with_name("myExpression"),
    ])),
    "Unsupported regex feature: Repetition count above 1000 a{1001} in expression 'myExpression'"
)]
#[case::empty_expression(
    LexerBuilder::new().add_mode(main_mode(&[Expression::new("").with_name("myExpression")])),
    "Invalid empty expression"
)]
#[case::empty_macro_name(LexerBuilder::new().add_macro("", "a"), "Invalid empty name")]
#[case::empty_macro_pattern(LexerBuilder::new().add_macro("myMacro", ""), "Invalid empty expression")]
#[case::invalid_context_name(
    LexerBuilder::new().add_mode(LexerMode::new("my context", &[])),
    "Invalid identifier 'my context'"
)]
#[case::duplicate_lexeme_id(
    LexerBuilder::new().add_mode(main_mode(&[
        Expression::new("a").with_lexeme(7),
        Expression::new("b").with_name("second").with_lexeme(7),
    ])),
    "Duplicate lexeme id 7 on expression 'second'"
)]
fn test_fail_fast(#[case] builder: LexerBuilder, #[case] expected: &str) {
    init();
    assert_eq!(first_error(builder), expected);
}

#[test]
fn test_invalid_repetition_range() {
    init();
    let message = first_error(LexerBuilder::new().add_mode(main_mode(&[
        Expression::new("a{2,1}").with_name("myExpression"),
    ])));
    assert!(
        message.starts_with("invalid repetition count range"),
        "{message}"
    );
    assert!(message.ends_with("in expression 'myExpression'"), "{message}");
}

#[test]
fn test_unsupported_features() {
    init();
    for pattern in ["^abc", r"a\b", "a+?", r"\pL", "€", "(?i)abc"] {
        let message = first_error(
            LexerBuilder::new().add_mode(main_mode(&[Expression::new(pattern).with_name("e")])),
        );
        assert!(
            message.starts_with("Unsupported regex feature: "),
            "{pattern}: {message}"
        );
        assert!(message.ends_with("in expression 'e'"), "{pattern}: {message}");
    }
}

#[test]
fn test_errors_are_collected() {
    init();
    let error = LexerBuilder::new()
        .add_macro("", "a")
        .add_mode(main_mode(&[
            Expression::new("").with_name("empty"),
            Expression::new("x").with_name("x").pop(),
            Expression::new("y").with_name("y").push("Missing"),
            Expression::new("[a-z]+").with_name("identifier"),
        ]))
        .add_mode(LexerMode::new("Comment", &[Expression::new("{Unknown}").with_name("z")]))
        .build()
        .unwrap_err();
    assert!(matches!(*error.source, LexDfaErrorKind::Collected(_)));
    assert_eq!(
        error.messages(),
        vec![
            "Invalid empty name",
            "Invalid empty expression",
            "Cannot set a pop action in main context on expression 'x'",
            "Unknown macro identifier 'Unknown' in expression 'z'",
            "Unknown context name : 'Missing'",
        ]
    );
}

#[test]
fn test_build_error_kind() {
    init();
    let error = LexerBuilder::new()
        .add_mode(main_mode(&[Expression::new("a").push("Nowhere")]))
        .fail_fast(true)
        .build()
        .unwrap_err();
    assert!(matches!(
        *error.source,
        LexDfaErrorKind::BuildError(BuildError::UnknownContext(ref name)) if name == "Nowhere"
    ));
}
