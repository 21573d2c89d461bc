use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::{
    internal::{expand, parse_expanded, parse_regex_syntax, Origin, TreeBuilder},
    lexer::Lexer,
    BuildError, ContextID, ExprTree, Expression, LexDfaError, LexDfaErrorKind, LexerContext,
    LexerMode, MatchAction, Node, Result,
};

/// The conventional name of the default context.
pub const MAIN_CONTEXT: &str = "main_context";

/// A builder for creating a lexer.
///
/// Declaration errors are either returned as soon as they are found or, if `fail_fast` is off,
/// collected and returned together as [`LexDfaErrorKind::Collected`] at the end of the build.
#[derive(Debug, Clone, Default)]
pub struct LexerBuilder {
    macros: Vec<(String, String)>,
    modes: Vec<LexerMode>,
    fail_fast: bool,
}

impl LexerBuilder {
    /// Creates a new lexer builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a macro. A pattern refers to it as `{name}`. Macros can use the macros defined
    /// before them. If a name is defined twice, the first definition is used.
    pub fn add_macro(mut self, name: &str, pattern: &str) -> Self {
        self.macros.push((name.to_string(), pattern.to_string()));
        self
    }

    /// Adds a lexer mode to the lexer builder.
    /// The first mode is the default context of the lexer.
    pub fn add_mode(mut self, mode: LexerMode) -> Self {
        self.modes.push(mode);
        self
    }

    /// Adds multiple lexer modes to the lexer builder.
    pub fn add_modes(mut self, modes: &[LexerMode]) -> Self {
        self.modes.extend_from_slice(modes);
        self
    }

    /// Adds unnamed expressions to the default context, which is created if there is no mode
    /// yet.
    pub fn add_patterns<P: AsRef<str>>(mut self, patterns: &[P]) -> Self {
        if self.modes.is_empty() {
            self.modes.push(LexerMode::new(MAIN_CONTEXT, &[]));
        }
        self.modes[0]
            .expressions
            .extend(patterns.iter().map(|p| Expression::new(p.as_ref())));
        self
    }

    /// Return the first error immediately instead of collecting all errors.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Builds the lexer from the lexer builder.
    pub fn build(self) -> Result<Lexer> {
        let mut errors = Vec::new();
        let macros = self.expand_macros(&mut errors)?;
        let context_ids = self.context_ids(&mut errors)?;

        let mut contexts = Vec::with_capacity(self.modes.len());
        let mut pushes = Vec::new();
        let mut used_lexemes = FxHashMap::default();
        let mut next_lexeme = 1;
        for (index, mode) in self.modes.iter().enumerate() {
            let id = ContextID::new(index);
            let mut tree = ExprTree::new();
            let mut children = Vec::with_capacity(mode.expressions.len());
            let mut lexemes: Vec<(usize, String)> = Vec::new();
            let mut pops = Vec::new();
            let mut on_match = Vec::new();

            for expression in &mode.expressions {
                let lexeme = expression.lexeme().unwrap_or(next_lexeme);
                next_lexeme += 1;
                let name = match expression.name() {
                    Some(name) => name.to_string(),
                    None => format!("_lexeme_{}", lexeme),
                };
                if let Err(e) = check_declaration(&name, expression.pattern()) {
                    self.report(&mut errors, e.into())?;
                    continue;
                }
                if lexemes.iter().any(|(_, other)| *other == name) {
                    let e = BuildError::DuplicateExpression {
                        name,
                        context: mode.name.clone(),
                    };
                    self.report(&mut errors, e.into())?;
                    continue;
                }
                if used_lexemes.insert(lexeme, name.clone()).is_some() {
                    let e = BuildError::DuplicateLexemeId { id: lexeme, name };
                    self.report(&mut errors, e.into())?;
                    continue;
                }

                let node = match self.add_expression(&mut tree, expression, &name, lexeme, &macros)
                {
                    Ok(node) => node,
                    Err(e) => {
                        self.report(&mut errors, e)?;
                        continue;
                    }
                };
                trace!("Expression {} '{}' is lexeme {}", name, expression, lexeme);
                children.push(node);

                match expression.action() {
                    MatchAction::None => (),
                    MatchAction::Pop => {
                        if index == 0 {
                            let e = BuildError::PopInMainContext(name.clone());
                            self.report(&mut errors, e.into())?;
                        }
                        pops.push(lexeme);
                    }
                    MatchAction::Push(target) => pushes.push((id, lexeme, target.clone())),
                }
                if let Some(code) = expression.on_match_code() {
                    on_match.push((lexeme, code));
                }
                lexemes.push((lexeme, name));
            }

            let root = tree.add_node(Node::Or(children));
            let mut context = LexerContext::new(id, &mode.name, tree, root, lexemes);
            for lexeme in pops {
                context.add_pop(lexeme);
            }
            for (lexeme, code) in on_match {
                context.add_on_match(lexeme, code);
            }
            contexts.push(context);
        }

        // Pushed contexts may be declared after the context that enters them.
        for (source, lexeme, target) in pushes {
            match context_ids.get(target.as_str()) {
                Some(target) => contexts[source].add_push(lexeme, *target),
                None => self.report(&mut errors, BuildError::UnknownContext(target).into())?,
            }
        }

        if !errors.is_empty() {
            return Err(LexDfaError::new(LexDfaErrorKind::Collected(errors)));
        }
        debug!("Built lexer with {} contexts", contexts.len());
        Ok(Lexer::new(contexts))
    }

    fn report(&self, errors: &mut Vec<LexDfaError>, error: LexDfaError) -> Result<()> {
        if self.fail_fast {
            Err(error)
        } else {
            errors.push(error);
            Ok(())
        }
    }

    // Macros are stored with their own references resolved.
    fn expand_macros(&self, errors: &mut Vec<LexDfaError>) -> Result<FxHashMap<String, String>> {
        let mut macros = FxHashMap::default();
        for (name, pattern) in &self.macros {
            if let Err(e) = check_declaration(name, pattern) {
                self.report(errors, e.into())?;
                continue;
            }
            if macros.contains_key(name) {
                debug!("Macro {} is already defined", name);
                continue;
            }
            let origin = Origin::Macro(name);
            let expanded = match expand(pattern, &macros, origin) {
                Ok(expanded) => expanded,
                Err(e) => {
                    self.report(errors, e)?;
                    continue;
                }
            };
            // Syntax errors are reported for the macro instead of every expression using it.
            if let Err(e) = parse_expanded(&expanded, origin) {
                self.report(errors, e)?;
                continue;
            }
            macros.insert(name.clone(), expanded);
        }
        Ok(macros)
    }

    fn context_ids(&self, errors: &mut Vec<LexDfaError>) -> Result<FxHashMap<&str, ContextID>> {
        let mut ids = FxHashMap::default();
        for (index, mode) in self.modes.iter().enumerate() {
            if let Err(e) = check_name(&mode.name) {
                self.report(errors, e.into())?;
            }
            if ids.contains_key(mode.name.as_str()) {
                self.report(errors, BuildError::DuplicateContext(mode.name.clone()).into())?;
                continue;
            }
            ids.insert(mode.name.as_str(), ContextID::new(index));
        }
        Ok(ids)
    }

    fn add_expression(
        &self,
        tree: &mut ExprTree,
        expression: &Expression,
        name: &str,
        lexeme: usize,
        macros: &FxHashMap<String, String>,
    ) -> Result<crate::NodeID> {
        let origin = Origin::Expression(name);
        let ast = if expression.is_verbatim() {
            parse_expanded(&regex_syntax::escape(expression.pattern()), origin)?
        } else {
            parse_regex_syntax(expression.pattern(), macros, origin)?
        };
        TreeBuilder::new(tree, origin).add_expression(&ast, lexeme)
    }
}

fn check_declaration(name: &str, pattern: &str) -> std::result::Result<(), BuildError> {
    if pattern.is_empty() {
        return Err(BuildError::EmptyExpression);
    }
    check_name(name)
}

// Names are identifiers: a letter or underscore followed by letters, digits and underscores.
fn check_name(name: &str) -> std::result::Result<(), BuildError> {
    let mut chars = name.chars();
    match chars.next() {
        None => Err(BuildError::EmptyName),
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            if chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
                Ok(())
            } else {
                Err(BuildError::InvalidIdentifier(name.to_string()))
            }
        }
        Some(_) => Err(BuildError::InvalidIdentifier(name.to_string())),
    }
}
