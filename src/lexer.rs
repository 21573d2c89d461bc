use crate::{ContextID, LexerContext};

/// A lexer, i.e. the minimized DFAs of all of its contexts.
/// It is created by a [`crate::LexerBuilder`].
#[derive(Debug, Clone)]
pub struct Lexer {
    contexts: Vec<LexerContext>,
}

impl Lexer {
    pub(crate) fn new(contexts: Vec<LexerContext>) -> Self {
        Self { contexts }
    }

    /// The contexts in declaration order. The first one is the default context.
    #[inline]
    pub fn contexts(&self) -> &[LexerContext] {
        &self.contexts
    }

    /// The default context, if the lexer has any context.
    pub fn default_context(&self) -> Option<&LexerContext> {
        self.contexts.first()
    }

    /// The context with the given id.
    pub fn context(&self, id: ContextID) -> Option<&LexerContext> {
        self.contexts.get(id.as_usize())
    }

    /// The context with the given name.
    pub fn context_by_name(&self, name: &str) -> Option<&LexerContext> {
        self.contexts.iter().find(|c| c.name() == name)
    }

    /// The number of lexemes of all contexts.
    pub fn lexeme_count(&self) -> usize {
        self.contexts.iter().map(|c| c.lexeme_count()).sum()
    }

    /// The debug strings of all contexts, concatenated in declaration order.
    pub fn debug_string(&self) -> String {
        self.contexts.iter().map(|c| c.debug_string()).collect()
    }

    /// Traces the DFAs of all contexts as dot format.
    /// The output is written to the log.
    /// This function is used for debugging purposes.
    #[cfg(feature = "dot_writer")]
    pub fn log_contexts_as_dot(&self) -> crate::Result<()> {
        use std::io::Read;
        for context in &self.contexts {
            log::debug!("Context {}\n{}", context.name(), {
                let mut cursor = std::io::Cursor::new(Vec::new());
                context.render_dot(&mut cursor);
                let mut dot_format = String::new();
                cursor.set_position(0);
                cursor.read_to_string(&mut dot_format)?;
                dot_format
            });
        }
        Ok(())
    }

    /// Generates the DFAs of all contexts as dot files.
    /// The dot files are written to the target folder and named after the contexts.
    #[cfg(feature = "dot_writer")]
    pub fn generate_dot_files(&self, target_folder: &std::path::Path) -> crate::Result<()> {
        use std::fs::File;
        for context in &self.contexts {
            let mut file = File::create(target_folder.join(format!("{}.dot", context.name())))?;
            context.render_dot(&mut file);
        }
        Ok(())
    }
}
