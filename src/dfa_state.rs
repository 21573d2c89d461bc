use std::fmt;

use crate::{CharSet, PositionSet, StateID};

/// The condition under which a transition is taken.
///
/// Transitions of a state are tested in order, so a guard only applies to the bytes that the
/// guards before it did not match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// The transition is taken for the bytes in `chars`.
    Set {
        /// The bytes matched by the guard.
        chars: CharSet,
        /// The character sets whose intersection is `chars`. They name the guard in the debug
        /// form and are what a code generator would test.
        terms: Vec<CharSet>,
    },
    /// The transition is taken for any byte not matched by an earlier guard.
    Else,
}

impl Guard {
    /// Create a guard from its resolved bytes and the sets that describe it.
    pub fn new(chars: CharSet, terms: Vec<CharSet>) -> Self {
        Guard::Set { chars, terms }
    }

    /// The bytes matched by the guard. `None` for the default branch.
    pub fn char_set(&self) -> Option<&CharSet> {
        match self {
            Guard::Set { chars, .. } => Some(chars),
            Guard::Else => None,
        }
    }

    /// Check if the guard accepts the byte, ignoring the guards before it.
    pub fn matches(&self, c: u8) -> bool {
        match self {
            Guard::Set { chars, .. } => chars.contains(c),
            Guard::Else => true,
        }
    }

    /// Check if the guard is the default branch.
    pub fn is_else(&self) -> bool {
        matches!(self, Guard::Else)
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::Set { terms, .. } => {
                let terms: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
                write!(f, "{}", terms.join("&&"))
            }
            Guard::Else => write!(f, "else"),
        }
    }
}

/// A transition of a DFA state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub(crate) guard: Guard,
    pub(crate) target: StateID,
}

impl Transition {
    /// Create a new transition.
    pub fn new(guard: Guard, target: StateID) -> Self {
        Self { guard, target }
    }

    /// The guard of the transition.
    #[inline]
    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    /// The target state.
    #[inline]
    pub fn target(&self) -> StateID {
        self.target
    }

    // Transitions are equivalent if they select the same bytes for the same target, regardless
    // of how the guard is described.
    pub(crate) fn is_equivalent(&self, other: &Transition) -> bool {
        self.target == other.target && self.guard.char_set() == other.guard.char_set()
    }
}

/// A state of a lexer DFA.
#[derive(Debug, Clone)]
pub struct DfaState {
    pub(crate) id: StateID,
    pub(crate) positions: PositionSet,
    pub(crate) accept: Option<usize>,
    pub(crate) transitions: Vec<Transition>,
    pub(crate) ref_count: usize,
}

impl DfaState {
    pub(crate) fn new(id: StateID, positions: PositionSet, accept: Option<usize>) -> Self {
        Self {
            id,
            positions,
            accept,
            transitions: Vec::new(),
            ref_count: 0,
        }
    }

    /// The id of the state.
    #[inline]
    pub fn id(&self) -> StateID {
        self.id
    }

    /// The positions of the expression tree this state stands for.
    #[inline]
    pub fn positions(&self) -> &PositionSet {
        &self.positions
    }

    /// The lexeme accepted if the match ends in this state.
    #[inline]
    pub fn accept(&self) -> Option<usize> {
        self.accept
    }

    /// Check if the state is accepting.
    #[inline]
    pub fn is_accepting(&self) -> bool {
        self.accept.is_some()
    }

    /// The outgoing transitions in evaluation order.
    #[inline]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Number of transitions from states of the same DFA that lead to this state.
    /// States with a count of zero need no jump label in generated code.
    #[inline]
    pub fn ref_count(&self) -> usize {
        self.ref_count
    }

    /// Check if the state has a transition to itself, i.e. it is the loop point of a repetition.
    pub fn is_self_loop(&self) -> bool {
        self.transitions.iter().any(|t| t.target == self.id)
    }

    // Two states are equivalent if they accept the same lexeme and have the same transitions.
    pub(crate) fn is_equivalent(&self, other: &DfaState) -> bool {
        self.accept == other.accept
            && self.transitions.len() == other.transitions.len()
            && self
                .transitions
                .iter()
                .zip(other.transitions.iter())
                .all(|(a, b)| a.is_equivalent(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_display() {
        let guard = Guard::new(
            CharSet::interval(b'h', b'm'),
            vec![CharSet::interval(b'a', b'm'), CharSet::interval(b'h', b'z')],
        );
        assert_eq!(guard.to_string(), "['a'-'m']&&['h'-'z']");
        assert!(guard.matches(b'k'));
        assert!(!guard.matches(b'b'));
        assert_eq!(Guard::Else.to_string(), "else");
        assert!(Guard::Else.matches(0));
    }

    #[test]
    fn test_state_equivalence() {
        let digits = || Guard::new(CharSet::interval(b'0', b'9'), vec![CharSet::interval(b'0', b'9')]);
        let mut s1 = DfaState::new(StateID::new(1), PositionSet::new(), Some(2));
        let mut s2 = DfaState::new(StateID::new(2), PositionSet::new(), Some(2));
        s1.transitions.push(Transition::new(digits(), StateID::new(1)));
        s2.transitions.push(Transition::new(digits(), StateID::new(1)));
        assert!(s1.is_equivalent(&s2));
        assert!(s1.is_self_loop());
        assert!(!s2.is_self_loop());
        s2.accept = Some(1);
        assert!(!s1.is_equivalent(&s2));
    }
}
