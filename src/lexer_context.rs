//! Module with the lexer context, one independent automaton of a lexer.
use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::{internal::Dfa, ContextID, DfaState, ExprTree, Match, NodeID, StateID};

/// The DFA of one lexer mode together with the lexemes it recognizes.
///
/// State 0 is the start state. States keep the ids of their construction, so after minimization
/// the ids can have gaps.
#[derive(Debug, Clone)]
pub struct LexerContext {
    id: ContextID,
    name: String,
    states: Vec<DfaState>,
    // Lexeme id and name, in declaration order.
    lexemes: Vec<(usize, String)>,
    pops: BTreeSet<usize>,
    pushes: BTreeMap<usize, ContextID>,
    on_match: BTreeMap<usize, String>,
}

impl LexerContext {
    /// Computes the positions of the tree and builds the minimized DFA.
    pub(crate) fn new(
        id: ContextID,
        name: &str,
        mut tree: ExprTree,
        root: NodeID,
        lexemes: Vec<(usize, String)>,
    ) -> Self {
        tree.compute(root);
        let states = Dfa::build(&tree, root).into_states();
        debug!(
            "Context {} '{}': {} lexemes, {} states",
            id,
            name,
            lexemes.len(),
            states.len()
        );
        Self {
            id,
            name: name.to_string(),
            states,
            lexemes,
            pops: BTreeSet::new(),
            pushes: BTreeMap::new(),
            on_match: BTreeMap::new(),
        }
    }

    pub(crate) fn add_pop(&mut self, lexeme: usize) {
        self.pops.insert(lexeme);
    }

    pub(crate) fn add_push(&mut self, lexeme: usize, context: ContextID) {
        self.pushes.insert(lexeme, context);
    }

    pub(crate) fn add_on_match(&mut self, lexeme: usize, code: &str) {
        self.on_match.insert(lexeme, code.to_string());
    }

    /// The id of the context, i.e. its index in the lexer.
    #[inline]
    pub fn id(&self) -> ContextID {
        self.id
    }

    /// The name of the context.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The states of the minimized DFA in order of their ids.
    #[inline]
    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    /// The start state.
    #[inline]
    pub fn start_state(&self) -> &DfaState {
        &self.states[0]
    }

    /// The state with the given id, if it survived minimization.
    pub fn state(&self, id: StateID) -> Option<&DfaState> {
        self.states
            .binary_search_by_key(&id, |s| s.id())
            .ok()
            .map(|index| &self.states[index])
    }

    // Transition targets always exist.
    fn target(&self, id: StateID) -> &DfaState {
        match self.state(id) {
            Some(state) => state,
            None => panic!("Transition to the unknown state {} in context '{}'", id, self.name),
        }
    }

    /// The number of lexemes recognized by the context.
    #[inline]
    pub fn lexeme_count(&self) -> usize {
        self.lexemes.len()
    }

    /// The lexeme ids and names of the context in declaration order.
    #[inline]
    pub fn lexemes(&self) -> &[(usize, String)] {
        &self.lexemes
    }

    /// The name of the lexeme with the given id.
    pub fn lexeme_name(&self, lexeme: usize) -> Option<&str> {
        self.lexemes
            .iter()
            .find(|(id, _)| *id == lexeme)
            .map(|(_, name)| name.as_str())
    }

    /// The lexemes whose match returns to the calling context.
    #[inline]
    pub fn pop_lexemes(&self) -> &BTreeSet<usize> {
        &self.pops
    }

    /// Check if a match of the lexeme returns to the calling context.
    #[inline]
    pub fn is_pop(&self, lexeme: usize) -> bool {
        self.pops.contains(&lexeme)
    }

    /// The contexts entered on a match, by lexeme id.
    #[inline]
    pub fn pushes(&self) -> &BTreeMap<usize, ContextID> {
        &self.pushes
    }

    /// The context entered on a match of the lexeme.
    pub fn pushed_context(&self, lexeme: usize) -> Option<ContextID> {
        self.pushes.get(&lexeme).copied()
    }

    /// The on-match code snippets, by lexeme id.
    #[inline]
    pub fn on_match_codes(&self) -> &BTreeMap<usize, String> {
        &self.on_match
    }

    /// The on-match code snippet of the lexeme.
    pub fn on_match(&self, lexeme: usize) -> Option<&str> {
        self.on_match.get(&lexeme).map(|code| code.as_str())
    }

    /// Check if the state has a transition to itself.
    pub fn is_self_loop(&self, id: StateID) -> bool {
        self.state(id).is_some_and(|s| s.is_self_loop())
    }

    /// Check if at least one direct successor of the state accepts.
    pub fn has_accepting_successor(&self, id: StateID) -> bool {
        self.state(id).is_some_and(|s| {
            s.transitions()
                .iter()
                .any(|t| self.target(t.target()).is_accepting())
        })
    }

    /// Renders the DFA in a compact textual form, one line per state with transitions:
    /// `sN:GUARD->TARGET;...;else->FALLBACK;`.
    ///
    /// A transition to a state without transitions ends the match. It is rendered as `pop` if
    /// the context has pop lexemes and as `accept K` otherwise.
    pub fn debug_string(&self) -> String {
        let mut result = String::new();
        let has_pops = !self.pops.is_empty();
        for state in self.states.iter().filter(|s| !s.transitions().is_empty()) {
            result.push_str(&format!("s{}:", state.id()));
            for transition in state.transitions() {
                let target = self.target(transition.target());
                let target = if !target.transitions().is_empty() {
                    format!("s{}", target.id())
                } else if has_pops {
                    "pop".to_string()
                } else {
                    format!("accept {}", target.accept().unwrap_or_default())
                };
                result.push_str(&format!("{}->{};", transition.guard(), target));
            }
            if let Some(lexeme) = state.accept() {
                let fallback = if !has_pops {
                    format!("accept {}", lexeme)
                } else if self.is_pop(lexeme) {
                    "pop".to_string()
                } else {
                    "s0".to_string()
                };
                result.push_str(&format!("else->{};", fallback));
            }
            result.push('\n');
        }
        result
    }

    /// Find the longest match at the start of the input.
    pub fn longest_match(&self, input: &[u8]) -> Option<Match> {
        self.longest_match_at(input, 0)
    }

    /// Find the longest match starting at the given offset.
    /// The guards of a state are tried in order, the first one that matches is taken. If several
    /// lexemes match the longest input, the one with the lowest id wins. The start state never
    /// accepts, so a match is never empty.
    pub fn longest_match_at(&self, input: &[u8], start: usize) -> Option<Match> {
        let mut state = self.start_state();
        let mut last_match = None;
        for (offset, c) in input.iter().enumerate().skip(start) {
            let Some(transition) = state.transitions().iter().find(|t| t.guard().matches(*c))
            else {
                break;
            };
            state = self.target(transition.target());
            if let Some(lexeme) = state.accept() {
                last_match = Some(Match::new(lexeme, start, offset + 1));
            }
        }
        last_match
    }

    /// Render the DFA to a graphviz dot format.
    #[cfg(feature = "dot_writer")]
    pub fn render_dot<W: std::io::Write>(&self, output: &mut W) {
        let label = format!("Context {}", self.name);
        crate::internal::dot::context_render(self, &label, output);
    }
}
