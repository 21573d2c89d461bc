//! Module with the character set algebra.
//!
//! A [`CharSet`] is an immutable subset of the byte alphabet `0..=255`. All operations return one
//! of the canonical variants, so the result of an operation can always be fed into the next one.
//! The variant of a result is part of the contract because it determines the textual form, e.g.
//! the complement of `'*'` renders as `}'*'{` and not as the two intervals around `'*'`.
use std::{fmt, sync::LazyLock};

/// A closed interval of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    min: u8,
    max: u8,
}

impl Interval {
    /// Create a new interval. The bounds are ordered if given in reverse.
    pub fn new(min: u8, max: u8) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Create an interval holding exactly one byte.
    pub fn single(c: u8) -> Self {
        Self { min: c, max: c }
    }

    /// The lower bound, inclusive.
    #[inline]
    pub fn min(&self) -> u8 {
        self.min
    }

    /// The upper bound, inclusive.
    #[inline]
    pub fn max(&self) -> u8 {
        self.max
    }

    /// Check if the byte is inside the interval.
    #[inline]
    pub fn contains(&self, c: u8) -> bool {
        self.min <= c && c <= self.max
    }

    /// Check if the interval holds exactly one byte.
    #[inline]
    pub fn is_single_char(&self) -> bool {
        self.min == self.max
    }

    // Overlapping or adjacent intervals can be merged into one.
    fn touches(&self, other: &Interval) -> bool {
        self.min as u16 <= other.max as u16 + 1 && other.min as u16 <= self.max as u16 + 1
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_char() {
            write!(f, "{}", char_text(self.min))
        } else {
            write!(f, "[{}-{}]", char_text(self.min), char_text(self.max))
        }
    }
}

/// Textual form of a single byte.
/// Printable characters and the common escapes are quoted, all other bytes are written as decimal
/// numbers.
pub(crate) fn char_text(c: u8) -> String {
    match c {
        b'\n' => r"'\n'".to_string(),
        b'\t' => r"'\t'".to_string(),
        0x0B => r"'\v'".to_string(),
        0x08 => r"'\b'".to_string(),
        b'\r' => r"'\r'".to_string(),
        0x0C => r"'\f'".to_string(),
        0x07 => r"'\a'".to_string(),
        b'\'' => r"'\''".to_string(),
        b'\\' => r"'\\'".to_string(),
        32..=126 => format!("'{}'", c as char),
        _ => c.to_string(),
    }
}

/// A subset of the byte alphabet.
///
/// The interval vectors are always sorted, pairwise disjoint and never adjacent. Use the
/// constructors and operations of this type to obtain values, they maintain these invariants.
#[derive(Debug, Clone, Default)]
pub enum CharSet {
    /// No byte at all.
    #[default]
    Empty,
    /// Every byte.
    Whole,
    /// A single contiguous range.
    Interval(Interval),
    /// A union of at least two intervals.
    MultiInterval(Vec<Interval>),
    /// Every byte except the ones in the given intervals.
    MultiAntiInterval(Vec<Interval>),
}

impl CharSet {
    /// A set holding exactly one byte.
    pub fn single(c: u8) -> Self {
        CharSet::Interval(Interval::single(c))
    }

    /// A set holding the bytes `min..=max`.
    pub fn interval(min: u8, max: u8) -> Self {
        CharSet::Interval(Interval::new(min, max))
    }

    /// A set holding the union of the given intervals.
    /// Overlapping and adjacent intervals are merged.
    pub fn from_intervals<I: IntoIterator<Item = Interval>>(intervals: I) -> Self {
        included(normalize(intervals.into_iter().collect()))
    }

    /// A set holding every byte that is not in one of the given intervals.
    pub fn except<I: IntoIterator<Item = Interval>>(intervals: I) -> Self {
        excluded(normalize(intervals.into_iter().collect()))
    }

    /// Check if the set holds no byte.
    pub fn is_empty(&self) -> bool {
        match self {
            CharSet::Empty => true,
            CharSet::MultiAntiInterval(excl) => is_full(excl),
            CharSet::MultiInterval(v) => v.is_empty(),
            CharSet::Whole | CharSet::Interval(_) => false,
        }
    }

    /// Check if the set consists of exactly one byte written as an interval.
    pub fn is_single_char(&self) -> bool {
        match self {
            CharSet::Interval(i) => i.is_single_char(),
            CharSet::MultiInterval(v) => v.len() == 1 && v[0].is_single_char(),
            _ => false,
        }
    }

    /// Check if the byte is a member of the set.
    pub fn contains(&self, c: u8) -> bool {
        match self {
            CharSet::Empty => false,
            CharSet::Whole => true,
            CharSet::Interval(i) => i.contains(c),
            CharSet::MultiInterval(v) => v.iter().any(|i| i.contains(c)),
            CharSet::MultiAntiInterval(v) => !v.iter().any(|i| i.contains(c)),
        }
    }

    /// The bytes of the set as sorted, disjoint intervals.
    pub fn ranges(&self) -> Vec<Interval> {
        match self {
            CharSet::Empty => Vec::new(),
            CharSet::Whole => vec![Interval::new(0, u8::MAX)],
            CharSet::Interval(i) => vec![*i],
            CharSet::MultiInterval(v) => v.clone(),
            CharSet::MultiAntiInterval(excl) => complement_ranges(excl),
        }
    }

    /// Number of bytes in the set.
    pub fn len(&self) -> usize {
        self.ranges()
            .iter()
            .map(|i| (i.max - i.min) as usize + 1)
            .sum()
    }

    /// The bytes that are in both sets.
    pub fn intersect(&self, other: &CharSet) -> CharSet {
        use CharSet::*;
        match (self, other) {
            (Empty, _) | (_, Empty) => Empty,
            (Whole, x) | (x, Whole) => x.clone(),
            (MultiAntiInterval(a), MultiAntiInterval(b)) => excluded(union_ranges(a, b)),
            (MultiAntiInterval(excl), x) | (x, MultiAntiInterval(excl)) => {
                included(subtract_ranges(&x.ranges(), excl))
            }
            (x, y) => included(intersect_ranges(&x.ranges(), &y.ranges())),
        }
    }

    /// The bytes that are in either set.
    pub fn union(&self, other: &CharSet) -> CharSet {
        use CharSet::*;
        match (self, other) {
            (Empty, x) | (x, Empty) => x.clone(),
            (Whole, _) | (_, Whole) => Whole,
            (MultiAntiInterval(a), MultiAntiInterval(b)) => excluded(intersect_ranges(a, b)),
            (MultiAntiInterval(excl), x) | (x, MultiAntiInterval(excl)) => {
                excluded(subtract_ranges(excl, &x.ranges()))
            }
            (x, y) => included(union_ranges(&x.ranges(), &y.ranges())),
        }
    }

    /// The bytes of `self` that are not in `other`.
    pub fn subtract(&self, other: &CharSet) -> CharSet {
        use CharSet::*;
        match (self, other) {
            (Empty, _) | (_, Whole) => Empty,
            (x, Empty) => x.clone(),
            (Whole, x) => x.complement(),
            (MultiAntiInterval(a), MultiAntiInterval(b)) => included(subtract_ranges(b, a)),
            (MultiAntiInterval(excl), x) => excluded(union_ranges(excl, &x.ranges())),
            (x, MultiAntiInterval(excl)) => included(intersect_ranges(&x.ranges(), excl)),
            (x, y) => included(subtract_ranges(&x.ranges(), &y.ranges())),
        }
    }

    /// The bytes that are not in the set.
    pub fn complement(&self) -> CharSet {
        match self {
            CharSet::Empty => CharSet::Whole,
            CharSet::Whole => CharSet::Empty,
            CharSet::Interval(i) => excluded(vec![*i]),
            CharSet::MultiInterval(v) => excluded(v.clone()),
            CharSet::MultiAntiInterval(excl) => included(excl.clone()),
        }
    }
}

impl PartialEq for CharSet {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CharSet::Empty, x) | (x, CharSet::Empty) => x.is_empty(),
            (CharSet::Interval(a), CharSet::Interval(b)) => a == b,
            (CharSet::MultiAntiInterval(a), CharSet::MultiAntiInterval(b)) => a == b,
            (x, y) => x.ranges() == y.ranges(),
        }
    }
}

impl Eq for CharSet {}

impl fmt::Display for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharSet::Empty => write!(f, "()"),
            CharSet::Whole => write!(f, ")("),
            CharSet::Interval(i) => write!(f, "{}", i),
            CharSet::MultiInterval(v) if v.len() == 1 => write!(f, "{}", v[0]),
            CharSet::MultiInterval(v) => write!(f, "{{{}}}", join(v)),
            CharSet::MultiAntiInterval(v) => write!(f, "}}{}{{", join(v)),
        }
    }
}

fn join(intervals: &[Interval]) -> String {
    intervals
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

// Canonical form of a set given by its included ranges.
fn included(ranges: Vec<Interval>) -> CharSet {
    match ranges.len() {
        0 => CharSet::Empty,
        1 => CharSet::Interval(ranges[0]),
        _ => CharSet::MultiInterval(ranges),
    }
}

// Canonical form of a set given by its excluded ranges.
fn excluded(ranges: Vec<Interval>) -> CharSet {
    if ranges.is_empty() {
        CharSet::Whole
    } else if is_full(&ranges) {
        CharSet::Empty
    } else {
        CharSet::MultiAntiInterval(ranges)
    }
}

fn is_full(ranges: &[Interval]) -> bool {
    ranges.len() == 1 && ranges[0].min == 0 && ranges[0].max == u8::MAX
}

/// Sort the intervals and merge all that overlap or are adjacent.
fn normalize(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort();
    let mut result: Vec<Interval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match result.last_mut() {
            Some(last) if last.touches(&interval) => {
                last.min = last.min.min(interval.min);
                last.max = last.max.max(interval.max);
            }
            _ => result.push(interval),
        }
    }
    result
}

fn union_ranges(a: &[Interval], b: &[Interval]) -> Vec<Interval> {
    normalize(a.iter().chain(b.iter()).copied().collect())
}

fn intersect_ranges(a: &[Interval], b: &[Interval]) -> Vec<Interval> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let min = a[i].min.max(b[j].min);
        let max = a[i].max.min(b[j].max);
        if min <= max {
            result.push(Interval { min, max });
        }
        if a[i].max < b[j].max {
            i += 1;
        } else {
            j += 1;
        }
    }
    result
}

fn complement_ranges(ranges: &[Interval]) -> Vec<Interval> {
    let mut result = Vec::new();
    let mut next: u16 = 0;
    for i in ranges {
        if (i.min as u16) > next {
            result.push(Interval::new(next as u8, i.min - 1));
        }
        next = i.max as u16 + 1;
    }
    if next <= u8::MAX as u16 {
        result.push(Interval::new(next as u8, u8::MAX));
    }
    result
}

fn subtract_ranges(a: &[Interval], b: &[Interval]) -> Vec<Interval> {
    intersect_ranges(a, &complement_ranges(b))
}

/// The predefined character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// `[0-9a-zA-Z_]`
    Word,
    /// `[a-zA-Z]`
    Alpha,
    /// `[0-9a-zA-Z]`
    Alnum,
    /// `[a-z]`
    Lower,
    /// `[A-Z]`
    Upper,
    /// `[0-9]`
    Digit,
    /// `[0-9a-fA-F]`
    XDigit,
    /// Space, tab, newline, vertical tab, form feed and carriage return
    Space,
    /// Space and tab
    Blank,
    /// `[\x00-\x1f\x7f]`
    Cntrl,
    /// Printable characters including space
    Print,
    /// Printable characters except space
    Graph,
    /// Punctuation characters
    Punct,
}

impl CharClass {
    /// The cached character set of the class.
    pub fn char_set(self) -> &'static CharSet {
        match self {
            CharClass::Word => &WORD,
            CharClass::Alpha => &ALPHA,
            CharClass::Alnum => &ALNUM,
            CharClass::Lower => &LOWER,
            CharClass::Upper => &UPPER,
            CharClass::Digit => &DIGIT,
            CharClass::XDigit => &XDIGIT,
            CharClass::Space => &SPACE,
            CharClass::Blank => &BLANK,
            CharClass::Cntrl => &CNTRL,
            CharClass::Print => &PRINT,
            CharClass::Graph => &GRAPH,
            CharClass::Punct => &PUNCT,
        }
    }
}

macro_rules! char_class {
    ($name:ident, $($min:expr => $max:expr),+ $(,)?) => {
        static $name: LazyLock<CharSet> = LazyLock::new(|| {
            CharSet::from_intervals([$(Interval::new($min, $max)),+])
        });
    };
}

char_class!(WORD, b'0' => b'9', b'a' => b'z', b'A' => b'Z', b'_' => b'_');
char_class!(ALPHA, b'a' => b'z', b'A' => b'Z');
char_class!(ALNUM, b'0' => b'9', b'a' => b'z', b'A' => b'Z');
char_class!(LOWER, b'a' => b'z');
char_class!(UPPER, b'A' => b'Z');
char_class!(DIGIT, b'0' => b'9');
char_class!(XDIGIT, b'0' => b'9', b'a' => b'f', b'A' => b'F');
char_class!(SPACE, b' ' => b' ', b'\t' => b'\t', b'\n' => b'\n', 0x0B => 0x0B, 0x0C => 0x0C, b'\r' => b'\r');
char_class!(BLANK, b' ' => b' ', b'\t' => b'\t');
char_class!(CNTRL, 0 => 31, 127 => 127);
char_class!(PRINT, 32 => 126);
char_class!(GRAPH, 33 => 126);
char_class!(PUNCT, 33 => 47, 58 => 64, 91 => 96, 123 => 126);

#[cfg(test)]
mod tests {
    use super::*;

    fn multi(intervals: &[(u8, u8)]) -> CharSet {
        CharSet::from_intervals(intervals.iter().map(|(a, b)| Interval::new(*a, *b)))
    }

    fn anti(intervals: &[(u8, u8)]) -> CharSet {
        CharSet::except(intervals.iter().map(|(a, b)| Interval::new(*a, *b)))
    }

    #[test]
    fn test_interval_operations() {
        let a = CharSet::interval(5, 10);
        assert_eq!(a.intersect(&CharSet::interval(8, 20)), CharSet::interval(8, 10));
        assert_eq!(a.intersect(&CharSet::interval(11, 20)), CharSet::Empty);
        assert_eq!(a.union(&CharSet::interval(11, 20)), CharSet::interval(5, 20));
        assert_eq!(
            a.union(&CharSet::interval(15, 20)),
            multi(&[(5, 10), (15, 20)])
        );
        assert_eq!(
            CharSet::interval(5, 20).subtract(&CharSet::interval(8, 10)),
            multi(&[(5, 7), (11, 20)])
        );
        assert_eq!(a.subtract(&CharSet::interval(0, 30)), CharSet::Empty);
        assert_eq!(a.subtract(&CharSet::interval(20, 30)), a);
        assert!(matches!(a.complement(), CharSet::MultiAntiInterval(_)));
    }

    #[test]
    fn test_multi_interval_operations() {
        let m = multi(&[(5, 10), (20, 30)]);
        assert_eq!(m.intersect(&CharSet::interval(8, 22)), multi(&[(8, 10), (20, 22)]));
        assert_eq!(
            m.subtract(&anti(&[(8, 25)])),
            multi(&[(8, 10), (20, 25)])
        );
        assert_eq!(
            m.union(&multi(&[(11, 19)])),
            CharSet::interval(5, 30)
        );
        assert_eq!(m.union(&anti(&[(10, 25)])), anti(&[(11, 19)]));
        assert_eq!(
            m.subtract(&multi(&[(5, 6), (25, 30)])),
            multi(&[(7, 10), (20, 24)])
        );
        // A single remaining interval is always reported as an interval.
        assert!(matches!(
            m.intersect(&CharSet::interval(0, 12)),
            CharSet::Interval(_)
        ));
    }

    #[test]
    fn test_multi_anti_interval_operations() {
        let a = anti(&[(5, 15), (20, 30)]);
        assert_eq!(a.union(&CharSet::interval(10, 25)), anti(&[(5, 9), (26, 30)]));
        assert_eq!(
            anti(&[(5, 15), (30, 40)]).subtract(&anti(&[(10, 20), (35, 50)])),
            multi(&[(16, 20), (41, 50)])
        );
        assert_eq!(
            a.intersect(&anti(&[(14, 22)])),
            anti(&[(5, 30)])
        );
        assert_eq!(
            a.union(&anti(&[(14, 22)])),
            anti(&[(14, 15), (20, 22)])
        );
        assert_eq!(
            a.intersect(&multi(&[(0, 7), (16, 22)])),
            multi(&[(0, 4), (16, 19)])
        );
        assert_eq!(a.subtract(&CharSet::interval(0, 4)), anti(&[(0, 15), (20, 30)]));
        assert_eq!(anti(&[(0, 255)]), CharSet::Empty);
        assert!(matches!(anti(&[]), CharSet::Whole));
    }

    #[test]
    fn test_empty_and_whole() {
        let x = CharSet::interval(b'a', b'z');
        assert_eq!(CharSet::Empty.union(&x), x);
        assert_eq!(CharSet::Empty.intersect(&x), CharSet::Empty);
        assert_eq!(CharSet::Whole.intersect(&x), x);
        assert!(matches!(CharSet::Whole.union(&x), CharSet::Whole));
        assert_eq!(CharSet::Whole.subtract(&x), x.complement());
        assert_eq!(x.subtract(&CharSet::Whole), CharSet::Empty);
        assert!(matches!(CharSet::Empty.complement(), CharSet::Whole));
        assert_eq!(CharSet::interval(0, 255).complement(), CharSet::Empty);
    }

    #[test]
    fn test_text_form() {
        assert_eq!(CharSet::single(b'a').to_string(), "'a'");
        assert_eq!(CharSet::interval(b'a', b'z').to_string(), "['a'-'z']");
        assert_eq!(CharSet::single(b'\n').to_string(), r"'\n'");
        assert_eq!(CharSet::single(b'\\').to_string(), r"'\\'");
        assert_eq!(CharSet::single(b'\'').to_string(), r"'\''");
        assert_eq!(CharSet::single(200).to_string(), "200");
        assert_eq!(
            multi(&[(b'a', b'z'), (b'0', b'9')]).to_string(),
            "{['0'-'9'],['a'-'z']}"
        );
        assert_eq!(anti(&[(b'*', b'*')]).to_string(), "}'*'{");
        assert_eq!(CharSet::Empty.to_string(), "()");
        assert_eq!(CharSet::Whole.to_string(), ")(");
    }

    #[test]
    fn test_predefined_classes() {
        assert_eq!(CharClass::Digit.char_set().to_string(), "['0'-'9']");
        assert_eq!(
            CharClass::Word.char_set().to_string(),
            "{['0'-'9'],['A'-'Z'],'_',['a'-'z']}"
        );
        assert_eq!(CharClass::Space.char_set().to_string(), r"{['\t'-'\r'],' '}");
        assert_eq!(CharClass::Cntrl.char_set().to_string(), "{[0-31],127}");
        assert_eq!(CharClass::Print.char_set().to_string(), "[' '-'~']");
        assert_eq!(
            CharClass::Punct.char_set().to_string(),
            "{['!'-'/'],[':'-'@'],['['-'`'],['{'-'~']}"
        );
        assert_eq!(
            CharClass::Alnum.char_set().union(&CharSet::single(b'_')),
            *CharClass::Word.char_set()
        );
        assert_eq!(CharClass::Graph.char_set().len(), 94);
    }

    #[test]
    fn test_membership() {
        let s = anti(&[(b'0', b'9')]);
        assert!(s.contains(b'a'));
        assert!(!s.contains(b'5'));
        assert_eq!(s.len(), 246);
        assert!(CharSet::single(b'x').is_single_char());
        assert!(!s.is_single_char());
    }

    // A small deterministic generator so that the laws are checked on many shapes.
    fn generated_sets() -> Vec<CharSet> {
        let mut seed: u32 = 0x2545_F491;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            seed
        };
        let mut sets = Vec::new();
        for n in 0..60 {
            let count = 1 + (next() % 4) as usize;
            let intervals: Vec<Interval> = (0..count)
                .map(|_| {
                    let a = (next() % 256) as u8;
                    let b = (next() % 256) as u8;
                    Interval::new(a, b)
                })
                .collect();
            if n % 2 == 0 {
                sets.push(CharSet::from_intervals(intervals));
            } else {
                sets.push(CharSet::except(intervals));
            }
        }
        sets
    }

    #[test]
    fn test_algebra_laws() {
        let sets = generated_sets();
        for x in &sets {
            assert_eq!(x.complement().complement(), *x, "double complement of {x}");
            assert!(x.intersect(&x.complement()).is_empty(), "{x} & !{x}");
            assert_eq!(x.union(&x.complement()), CharSet::Whole, "{x} | !{x}");
            for y in &sets {
                let rebuilt = x.subtract(y).union(&x.intersect(y));
                assert_eq!(rebuilt, *x, "({x} - {y}) | ({x} & {y})");
                assert_eq!(x.intersect(y), y.intersect(x));
                assert_eq!(x.union(y), y.union(x));
            }
        }
    }
}
