/// The longest match of a lexer context at some offset of the input.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Match {
    /// The lexeme id of the accepted expression.
    lexeme: usize,
    /// The start offset, inclusive.
    start: usize,
    /// The end offset, exclusive.
    end: usize,
}

impl Match {
    /// Create a new match.
    pub fn new(lexeme: usize, start: usize, end: usize) -> Self {
        Self { lexeme, start, end }
    }

    /// Get the lexeme id of the match.
    #[inline]
    pub fn lexeme(&self) -> usize {
        self.lexeme
    }

    /// Get the start of the match.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Get the end of the match.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Get the matched range.
    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    /// Get the length of the match. A lexeme always consumes at least one byte.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the match is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl std::fmt::Display for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}..{}", self.lexeme, self.start, self.end)
    }
}
