//! Module with the expression tree.
//!
//! The tree is an arena of nodes addressed by [`NodeID`]. Leaves are positions, addressed by
//! [`PositionID`] in the order of their creation. After all patterns of a context are added, a
//! single call to [`ExprTree::compute`] determines `nullable`, `firstpos`, `lastpos` and
//! `followpos` with the classic two-pass algorithm of the direct regex-to-DFA construction.
use std::collections::BTreeSet;

use log::trace;

use crate::{
    internal::ids::{NodeIDBase, PositionIDBase},
    CharSet, NodeID, PositionID,
};

/// An ordered set of positions.
/// It is the identity of a DFA state, so it must be comparable and hashable.
pub type PositionSet = BTreeSet<PositionID>;

static EMPTY_SET: CharSet = CharSet::Empty;

/// A leaf of the expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    /// An explicit character set, usually a single literal byte.
    LiteralSet(CharSet),
    /// A union of intervals, e.g. `[a-z0-9]`.
    Range(CharSet),
    /// Every byte not excluded by the set, e.g. `[^*]`.
    Except(CharSet),
    /// End of a match of the lexeme with the given id.
    End(usize),
    /// Matches the empty string.
    Empty,
}

impl Position {
    /// The bytes this position consumes. End and Empty positions consume nothing.
    pub fn char_set(&self) -> &CharSet {
        match self {
            Position::LiteralSet(set) | Position::Range(set) | Position::Except(set) => set,
            Position::End(_) | Position::Empty => &EMPTY_SET,
        }
    }

    /// The lexeme id of an end position.
    pub fn lexeme(&self) -> Option<usize> {
        match self {
            Position::End(lexeme) => Some(*lexeme),
            _ => None,
        }
    }

    /// Only the empty position matches without consuming input.
    pub fn is_nullable(&self) -> bool {
        matches!(self, Position::Empty)
    }
}

/// A node of the expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// The children in sequence.
    Concat(Vec<NodeID>),
    /// Any of the children.
    Or(Vec<NodeID>),
    /// The child or nothing.
    Option(NodeID),
    /// One or more repetitions of the child.
    Plus(NodeID),
    /// Zero or more repetitions of the child.
    Star(NodeID),
    /// A leaf.
    Position(PositionID),
}

#[derive(Debug, Clone)]
struct NodeData {
    node: Node,
    nullable: bool,
    firstpos: PositionSet,
    lastpos: PositionSet,
}

#[derive(Debug, Clone)]
struct PositionData {
    position: Position,
    followpos: PositionSet,
}

/// The expression tree of one lexer context.
#[derive(Debug, Clone, Default)]
pub struct ExprTree {
    nodes: Vec<NodeData>,
    positions: Vec<PositionData>,
    computed: bool,
}

impl ExprTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leaf and return the id of its node.
    pub fn add_position(&mut self, position: Position) -> NodeID {
        let position_id = PositionID::new(self.positions.len() as PositionIDBase);
        let node_id = self.push_node(Node::Position(position_id));
        self.positions.push(PositionData {
            position,
            followpos: PositionSet::new(),
        });
        node_id
    }

    /// Add an inner node. Its children must already be part of the tree.
    ///
    /// # Panics
    /// If a child id is unknown or the node is a [`Node::Position`], which must be added with
    /// [`ExprTree::add_position`].
    pub fn add_node(&mut self, node: Node) -> NodeID {
        let children: &[NodeID] = match &node {
            Node::Concat(children) | Node::Or(children) => children,
            Node::Option(child) | Node::Plus(child) | Node::Star(child) => std::slice::from_ref(child),
            Node::Position(_) => panic!("Positions are added with add_position"),
        };
        assert!(
            children.iter().all(|c| c.as_usize() < self.nodes.len()),
            "Child node does not exist"
        );
        self.push_node(node)
    }

    fn push_node(&mut self, node: Node) -> NodeID {
        let id = NodeID::new(self.nodes.len() as NodeIDBase);
        self.nodes.push(NodeData {
            node,
            nullable: false,
            firstpos: PositionSet::new(),
            lastpos: PositionSet::new(),
        });
        id
    }

    /// The node with the given id.
    pub fn node(&self, id: NodeID) -> &Node {
        &self.nodes[id].node
    }

    /// The position with the given id.
    pub fn position(&self, id: PositionID) -> &Position {
        &self.positions[id].position
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of positions.
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Check if [`ExprTree::compute`] has already run.
    pub fn is_computed(&self) -> bool {
        self.computed
    }

    /// Compute `nullable`, `firstpos`, `lastpos` and `followpos` for the subtree rooted at
    /// `root`. A second call is a no-op.
    pub fn compute(&mut self, root: NodeID) {
        if self.computed {
            trace!("Expression tree already computed");
            return;
        }
        self.compute_first_last(root);
        self.compute_followpos(root);
        self.computed = true;
        trace!(
            "Computed {} nodes, {} positions, firstpos of root: {:?}",
            self.nodes.len(),
            self.positions.len(),
            self.nodes[root].firstpos
        );
    }

    /// Whether the node matches the empty string.
    pub fn nullable(&self, id: NodeID) -> bool {
        self.nodes[id].nullable
    }

    /// The positions that can match the first byte of the node.
    pub fn firstpos(&self, id: NodeID) -> &PositionSet {
        &self.nodes[id].firstpos
    }

    /// The positions that can match the last byte of the node.
    pub fn lastpos(&self, id: NodeID) -> &PositionSet {
        &self.nodes[id].lastpos
    }

    /// The positions that can immediately follow the position.
    pub fn followpos(&self, id: PositionID) -> &PositionSet {
        &self.positions[id].followpos
    }

    // First pass, bottom up.
    fn compute_first_last(&mut self, id: NodeID) {
        let node = self.nodes[id].node.clone();
        let (nullable, firstpos, lastpos) = match &node {
            // The empty position matches nothing, so it never starts or ends a match.
            Node::Position(p) if self.positions[*p].position.is_nullable() => {
                (true, PositionSet::new(), PositionSet::new())
            }
            Node::Position(p) => {
                let set = PositionSet::from([*p]);
                (false, set.clone(), set)
            }
            Node::Concat(children) => {
                for child in children {
                    self.compute_first_last(*child);
                }
                let mut firstpos = PositionSet::new();
                for child in children {
                    firstpos.extend(self.nodes[*child].firstpos.iter().copied());
                    if !self.nodes[*child].nullable {
                        break;
                    }
                }
                let mut lastpos = PositionSet::new();
                for child in children.iter().rev() {
                    lastpos.extend(self.nodes[*child].lastpos.iter().copied());
                    if !self.nodes[*child].nullable {
                        break;
                    }
                }
                let nullable = children.iter().all(|c| self.nodes[*c].nullable);
                (nullable, firstpos, lastpos)
            }
            Node::Or(children) => {
                let mut firstpos = PositionSet::new();
                let mut lastpos = PositionSet::new();
                for child in children {
                    self.compute_first_last(*child);
                    firstpos.extend(self.nodes[*child].firstpos.iter().copied());
                    lastpos.extend(self.nodes[*child].lastpos.iter().copied());
                }
                let nullable = children.iter().any(|c| self.nodes[*c].nullable);
                (nullable, firstpos, lastpos)
            }
            Node::Option(child) | Node::Star(child) | Node::Plus(child) => {
                self.compute_first_last(*child);
                let data = &self.nodes[*child];
                let nullable = !matches!(node, Node::Plus(_)) || data.nullable;
                (nullable, data.firstpos.clone(), data.lastpos.clone())
            }
        };
        let data = &mut self.nodes[id];
        data.nullable = nullable;
        data.firstpos.extend(firstpos);
        data.lastpos.extend(lastpos);
    }

    // Second pass, top down.
    fn compute_followpos(&mut self, id: NodeID) {
        let node = self.nodes[id].node.clone();
        match &node {
            Node::Position(_) => {}
            Node::Concat(children) => {
                let mut previous: Vec<NodeID> = Vec::new();
                for child in children {
                    let firstpos = self.nodes[*child].firstpos.clone();
                    for p in &previous {
                        let lastpos = self.nodes[*p].lastpos.clone();
                        self.add_followpos(&lastpos, &firstpos);
                    }
                    if !self.nodes[*child].nullable {
                        previous.clear();
                    }
                    previous.push(*child);
                    self.compute_followpos(*child);
                }
            }
            Node::Or(children) => {
                for child in children {
                    self.compute_followpos(*child);
                }
            }
            Node::Option(child) => self.compute_followpos(*child),
            Node::Plus(child) | Node::Star(child) => {
                let data = &self.nodes[id];
                let (lastpos, firstpos) = (data.lastpos.clone(), data.firstpos.clone());
                self.add_followpos(&lastpos, &firstpos);
                self.compute_followpos(*child);
            }
        }
    }

    fn add_followpos(&mut self, sources: &PositionSet, targets: &PositionSet) {
        for source in sources {
            self.positions[*source]
                .followpos
                .extend(targets.iter().copied());
        }
    }

    /// The intersection of the character sets of all positions in the set.
    /// An empty set yields [`CharSet::Empty`].
    pub fn intersect_all(&self, set: &PositionSet) -> CharSet {
        let mut iter = set.iter();
        match iter.next() {
            Some(first) => iter.fold(self.position(*first).char_set().clone(), |acc, p| {
                acc.intersect(self.position(*p).char_set())
            }),
            None => CharSet::Empty,
        }
    }

    /// The union of the followpos sets of all positions in the set.
    pub fn followpos_union(&self, set: &PositionSet) -> PositionSet {
        set.iter()
            .flat_map(|p| self.followpos(*p).iter().copied())
            .collect()
    }

    /// The smallest lexeme id of all end positions in the set.
    pub fn accept_lexeme(&self, set: &PositionSet) -> Option<usize> {
        set.iter().filter_map(|p| self.position(*p).lexeme()).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn leaf(tree: &mut ExprTree, c: u8) -> NodeID {
        tree.add_position(Position::LiteralSet(CharSet::single(c)))
    }

    fn pos(ids: &[u32]) -> PositionSet {
        ids.iter().map(|i| PositionID::new(*i)).collect()
    }

    // (a|b)*abb# from the dragon book, positions are numbered from zero here.
    #[test]
    fn test_followpos_dragon_book() {
        init();
        let mut tree = ExprTree::new();
        let a0 = leaf(&mut tree, b'a');
        let b1 = leaf(&mut tree, b'b');
        let or = tree.add_node(Node::Or(vec![a0, b1]));
        let star = tree.add_node(Node::Star(or));
        let a2 = leaf(&mut tree, b'a');
        let b3 = leaf(&mut tree, b'b');
        let b4 = leaf(&mut tree, b'b');
        let end = tree.add_position(Position::End(1));
        let root = tree.add_node(Node::Concat(vec![star, a2, b3, b4, end]));
        tree.compute(root);

        assert_eq!(tree.firstpos(root), &pos(&[0, 1, 2]));
        assert_eq!(tree.lastpos(root), &pos(&[5]));
        assert!(!tree.nullable(root));
        assert!(tree.nullable(star));
        assert_eq!(tree.followpos(PositionID::new(0)), &pos(&[0, 1, 2]));
        assert_eq!(tree.followpos(PositionID::new(1)), &pos(&[0, 1, 2]));
        assert_eq!(tree.followpos(PositionID::new(2)), &pos(&[3]));
        assert_eq!(tree.followpos(PositionID::new(3)), &pos(&[4]));
        assert_eq!(tree.followpos(PositionID::new(4)), &pos(&[5]));
        assert!(tree.followpos(PositionID::new(5)).is_empty());
        assert_eq!(tree.accept_lexeme(&pos(&[4, 5])), Some(1));
    }

    #[test]
    fn test_nullable_rules() {
        let mut tree = ExprTree::new();
        let a = leaf(&mut tree, b'a');
        let b = leaf(&mut tree, b'b');
        let empty = tree.add_position(Position::Empty);
        let opt = tree.add_node(Node::Option(a));
        let plus = tree.add_node(Node::Plus(b));
        let or = tree.add_node(Node::Or(vec![plus, empty]));
        let root = tree.add_node(Node::Concat(vec![opt, or]));
        tree.compute(root);

        assert!(tree.nullable(opt));
        assert!(!tree.nullable(plus));
        assert!(tree.nullable(empty));
        assert!(tree.nullable(or));
        assert!(tree.nullable(root));
        // The optional prefix lets the first position of the suffix start a match.
        assert_eq!(tree.firstpos(root), &pos(&[0, 1]));
        assert_eq!(tree.lastpos(root), &pos(&[0, 1]));
        assert_eq!(tree.followpos(PositionID::new(0)), &pos(&[1]));
        assert_eq!(tree.followpos(PositionID::new(1)), &pos(&[1]));
    }

    #[test]
    fn test_followpos_across_nullable_run() {
        // a b? c? d
        let mut tree = ExprTree::new();
        let a = leaf(&mut tree, b'a');
        let b = leaf(&mut tree, b'b');
        let b = tree.add_node(Node::Option(b));
        let c = leaf(&mut tree, b'c');
        let c = tree.add_node(Node::Option(c));
        let d = leaf(&mut tree, b'd');
        let root = tree.add_node(Node::Concat(vec![a, b, c, d]));
        tree.compute(root);
        assert_eq!(tree.followpos(PositionID::new(0)), &pos(&[1, 2, 3]));
        assert_eq!(tree.followpos(PositionID::new(1)), &pos(&[2, 3]));
        assert_eq!(tree.followpos(PositionID::new(2)), &pos(&[3]));
    }

    #[test]
    fn test_compute_runs_once() {
        let mut tree = ExprTree::new();
        let a = leaf(&mut tree, b'a');
        let root = tree.add_node(Node::Plus(a));
        tree.compute(root);
        let followpos = tree.followpos(PositionID::new(0)).clone();
        tree.compute(root);
        assert!(tree.is_computed());
        assert_eq!(tree.followpos(PositionID::new(0)), &followpos);
    }

    #[test]
    fn test_set_helpers() {
        let mut tree = ExprTree::new();
        tree.add_position(Position::Range(CharSet::interval(b'a', b'z')));
        tree.add_position(Position::LiteralSet(CharSet::single(b'k')));
        tree.add_position(Position::End(3));
        let set = pos(&[0, 1]);
        assert_eq!(tree.intersect_all(&set), CharSet::single(b'k'));
        assert_eq!(tree.intersect_all(&PositionSet::new()), CharSet::Empty);
        assert_eq!(tree.accept_lexeme(&set), None);
    }

    #[test]
    #[should_panic(expected = "Child node does not exist")]
    fn test_unknown_child() {
        let mut tree = ExprTree::new();
        tree.add_node(Node::Plus(NodeID::new(7)));
    }
}
