//! Conversion of a parsed pattern into nodes of an expression tree.
//!
//! Every occurrence of a character or class in the pattern becomes a position of its own, so
//! counted repetitions are expanded into copies of the repeated subtree.

use regex_syntax::ast::{
    Ast, ClassAscii, ClassAsciiKind, ClassBracketed, ClassPerl, ClassPerlKind, ClassSet,
    ClassSetBinaryOp, ClassSetBinaryOpKind, ClassSetItem, GroupKind, RepetitionKind,
    RepetitionRange,
};

use crate::{CharClass, CharSet, ExprTree, LexDfaError, LexDfaErrorKind, Node, NodeID, Position, Result};

use super::parser::Origin;

/// The largest count a counted repetition may use.
pub(crate) const MAX_REPETITION: u32 = 1000;

/// The most positions a context may have. Counted repetitions are expanded into copies, so
/// nested ones multiply.
pub(crate) const MAX_POSITIONS: usize = 100_000;

macro_rules! unsupported {
    ($origin:expr, $feature:expr) => {
        LexDfaError::new(LexDfaErrorKind::UnsupportedFeature(format!(
            "{} in {}",
            $feature, $origin
        )))
    };
}

/// Adds the nodes of patterns to an expression tree.
pub(crate) struct TreeBuilder<'a> {
    tree: &'a mut ExprTree,
    origin: Origin<'a>,
}

impl<'a> TreeBuilder<'a> {
    pub(crate) fn new(tree: &'a mut ExprTree, origin: Origin<'a>) -> Self {
        Self { tree, origin }
    }

    /// Add the pattern followed by the end position of the lexeme.
    pub(crate) fn add_expression(&mut self, ast: &Ast, lexeme: usize) -> Result<NodeID> {
        let pattern = self.add_ast(ast)?;
        let end = self.tree.add_position(Position::End(lexeme));
        Ok(self.tree.add_node(Node::Concat(vec![pattern, end])))
    }

    /// Add the nodes of the pattern and return the id of its root node.
    pub(crate) fn add_ast(&mut self, ast: &Ast) -> Result<NodeID> {
        match ast {
            Ast::Empty(_) => Ok(self.tree.add_position(Position::Empty)),
            Ast::Flags(_) => Err(unsupported!(self.origin, format!("Flags {}", ast))),
            Ast::Literal(l) => {
                let c = self.byte(l.c)?;
                Ok(self.tree.add_position(Position::LiteralSet(CharSet::single(c))))
            }
            Ast::Dot(_) => {
                let set = CharSet::single(b'\n').union(&CharSet::single(b'\r'));
                Ok(self.tree.add_position(Position::Except(set.complement())))
            }
            Ast::Assertion(a) => Err(unsupported!(
                self.origin,
                format!("Assertion {:?}", a.kind)
            )),
            Ast::ClassUnicode(c) => Err(unsupported!(
                self.origin,
                format!("Unicode class {:?}", c.kind)
            )),
            Ast::ClassPerl(c) => {
                let set = self.class_perl(c);
                self.add_set(set)
            }
            Ast::ClassBracketed(c) => {
                let set = self.class_bracketed(c)?;
                self.add_set(set)
            }
            Ast::Repetition(r) => {
                if !r.greedy {
                    return Err(unsupported!(self.origin, format!("Lazy repetition {}", ast)));
                }
                let inner = r.ast.as_ref();
                match &r.op.kind {
                    RepetitionKind::ZeroOrOne => self.wrap(inner, Node::Option),
                    RepetitionKind::ZeroOrMore => self.wrap(inner, Node::Star),
                    RepetitionKind::OneOrMore => self.wrap(inner, Node::Plus),
                    RepetitionKind::Range(range) => match *range {
                        RepetitionRange::Exactly(0) | RepetitionRange::Bounded(_, 0) => Err(
                            unsupported!(self.origin, format!("Empty repetition {}", ast)),
                        ),
                        RepetitionRange::Exactly(count)
                        | RepetitionRange::AtLeast(count)
                        | RepetitionRange::Bounded(_, count)
                            if count > MAX_REPETITION =>
                        {
                            Err(unsupported!(
                                self.origin,
                                format!("Repetition count above {} {}", MAX_REPETITION, ast)
                            ))
                        }
                        RepetitionRange::Exactly(count) => self.repeat(inner, count, None),
                        RepetitionRange::AtLeast(least) => {
                            self.repeat(inner, least, Some(Node::Star))
                        }
                        RepetitionRange::Bounded(least, most) => {
                            let mut children = self.copies(inner, least)?;
                            for _ in least..most {
                                children.push(self.wrap(inner, Node::Option)?);
                                self.check_size(ast)?;
                            }
                            Ok(self.concat(children))
                        }
                    },
                }
            }
            Ast::Group(g) => {
                if let GroupKind::NonCapturing(flags) = &g.kind {
                    if !flags.items.is_empty() {
                        return Err(unsupported!(self.origin, format!("Flags {:?}", flags.items)));
                    }
                }
                self.add_ast(&g.ast)
            }
            Ast::Alternation(a) => {
                let children = a
                    .asts
                    .iter()
                    .map(|ast| self.add_ast(ast))
                    .collect::<Result<Vec<_>>>()?;
                Ok(self.tree.add_node(Node::Or(children)))
            }
            Ast::Concat(c) => {
                let children = c
                    .asts
                    .iter()
                    .map(|ast| self.add_ast(ast))
                    .collect::<Result<Vec<_>>>()?;
                Ok(self.concat(children))
            }
        }
    }

    fn wrap(&mut self, ast: &Ast, node: fn(NodeID) -> Node) -> Result<NodeID> {
        let child = self.add_ast(ast)?;
        Ok(self.tree.add_node(node(child)))
    }

    fn copies(&mut self, ast: &Ast, count: u32) -> Result<Vec<NodeID>> {
        (0..count)
            .map(|_| {
                let copy = self.add_ast(ast)?;
                self.check_size(ast)?;
                Ok(copy)
            })
            .collect()
    }

    fn check_size(&self, ast: &Ast) -> Result<()> {
        if self.tree.position_count() > MAX_POSITIONS {
            return Err(unsupported!(
                self.origin,
                format!("More than {} positions in {}", MAX_POSITIONS, ast)
            ));
        }
        Ok(())
    }

    // `count` copies, optionally followed by one wrapped copy.
    fn repeat(&mut self, ast: &Ast, count: u32, tail: Option<fn(NodeID) -> Node>) -> Result<NodeID> {
        let mut children = self.copies(ast, count)?;
        if let Some(tail) = tail {
            children.push(self.wrap(ast, tail)?);
        }
        Ok(self.concat(children))
    }

    fn concat(&mut self, children: Vec<NodeID>) -> NodeID {
        match children.as_slice() {
            [single] => *single,
            _ => self.tree.add_node(Node::Concat(children)),
        }
    }

    fn add_set(&mut self, set: CharSet) -> Result<NodeID> {
        let position = match set {
            CharSet::Empty => {
                return Err(unsupported!(self.origin, "Empty character class"));
            }
            CharSet::Whole | CharSet::MultiAntiInterval(_) => Position::Except(set),
            _ if set.is_single_char() => Position::LiteralSet(set),
            _ => Position::Range(set),
        };
        Ok(self.tree.add_position(position))
    }

    fn byte(&self, c: char) -> Result<u8> {
        u8::try_from(c).map_err(|_| unsupported!(self.origin, format!("Non-byte literal {:?}", c)))
    }

    fn class_perl(&self, perl: &ClassPerl) -> CharSet {
        let class = match perl.kind {
            ClassPerlKind::Digit => CharClass::Digit,
            ClassPerlKind::Space => CharClass::Space,
            ClassPerlKind::Word => CharClass::Word,
        };
        negate(class.char_set().clone(), perl.negated)
    }

    fn class_bracketed(&self, bracketed: &ClassBracketed) -> Result<CharSet> {
        let set = self.class_set(&bracketed.kind)?;
        Ok(negate(set, bracketed.negated))
    }

    fn class_set(&self, set: &ClassSet) -> Result<CharSet> {
        match set {
            ClassSet::Item(item) => self.set_item(item),
            ClassSet::BinaryOp(op) => self.binary_op(op),
        }
    }

    fn binary_op(&self, op: &ClassSetBinaryOp) -> Result<CharSet> {
        let lhs = self.class_set(&op.lhs)?;
        let rhs = self.class_set(&op.rhs)?;
        Ok(match op.kind {
            ClassSetBinaryOpKind::Intersection => lhs.intersect(&rhs),
            ClassSetBinaryOpKind::Difference => lhs.subtract(&rhs),
            ClassSetBinaryOpKind::SymmetricDifference => {
                lhs.subtract(&rhs).union(&rhs.subtract(&lhs))
            }
        })
    }

    fn set_item(&self, item: &ClassSetItem) -> Result<CharSet> {
        match item {
            ClassSetItem::Empty(_) => Ok(CharSet::Empty),
            ClassSetItem::Literal(l) => Ok(CharSet::single(self.byte(l.c)?)),
            ClassSetItem::Range(r) => Ok(CharSet::interval(
                self.byte(r.start.c)?,
                self.byte(r.end.c)?,
            )),
            ClassSetItem::Ascii(a) => Ok(class_ascii(a)),
            ClassSetItem::Unicode(c) => Err(unsupported!(
                self.origin,
                format!("Unicode class {:?}", c.kind)
            )),
            ClassSetItem::Perl(c) => Ok(self.class_perl(c)),
            ClassSetItem::Bracketed(c) => self.class_bracketed(c),
            ClassSetItem::Union(u) => u.items.iter().try_fold(CharSet::Empty, |acc, item| {
                self.set_item(item).map(|set| acc.union(&set))
            }),
        }
    }
}

fn class_ascii(ascii: &ClassAscii) -> CharSet {
    let class = match ascii.kind {
        ClassAsciiKind::Alnum => CharClass::Alnum,
        ClassAsciiKind::Alpha => CharClass::Alpha,
        ClassAsciiKind::Ascii => return negate(CharSet::interval(0, 127), ascii.negated),
        ClassAsciiKind::Blank => CharClass::Blank,
        ClassAsciiKind::Cntrl => CharClass::Cntrl,
        ClassAsciiKind::Digit => CharClass::Digit,
        ClassAsciiKind::Graph => CharClass::Graph,
        ClassAsciiKind::Lower => CharClass::Lower,
        ClassAsciiKind::Print => CharClass::Print,
        ClassAsciiKind::Punct => CharClass::Punct,
        ClassAsciiKind::Space => CharClass::Space,
        ClassAsciiKind::Upper => CharClass::Upper,
        ClassAsciiKind::Word => CharClass::Word,
        ClassAsciiKind::Xdigit => CharClass::XDigit,
    };
    negate(class.char_set().clone(), ascii.negated)
}

fn negate(set: CharSet, negated: bool) -> CharSet {
    if negated {
        set.complement()
    } else {
        set
    }
}
