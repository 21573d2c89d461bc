//! This module contains the DFA construction.
//! The states are discovered breadth first from the firstpos set of the expression tree. Each
//! state is identified by the set of positions it stands for, and its transitions are obtained by
//! partitioning these positions. Afterwards the DFA is simplified until a fixpoint is reached:
//! shadowed transitions are dropped and equivalent states are merged.

use std::collections::{BTreeMap, VecDeque};

use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::{DfaState, ExprTree, NodeID, PositionSet, StateID, Transition};

use super::{ids::StateIDBase, partition::partition};

#[derive(Debug, Clone, Default)]
pub(crate) struct Dfa {
    // Indexed by state id, merged states are removed.
    states: Vec<Option<DfaState>>,
}

impl Dfa {
    /// Build the minimized DFA of a computed expression tree.
    pub(crate) fn build(tree: &ExprTree, root: NodeID) -> Self {
        debug_assert!(tree.is_computed(), "The expression tree must be computed");
        let mut dfa = Self::construct(tree, root);
        let constructed = dfa.states.len();
        dfa.simplify();
        dfa.count_references();
        debug!(
            "DFA with {} states, {} left after minimization",
            constructed,
            dfa.states().count()
        );
        dfa
    }

    /// The remaining states in order of their ids.
    pub(crate) fn states(&self) -> impl Iterator<Item = &DfaState> {
        self.states.iter().flatten()
    }

    pub(crate) fn into_states(self) -> Vec<DfaState> {
        self.states.into_iter().flatten().collect()
    }

    fn state_mut(&mut self, id: StateID) -> &mut DfaState {
        match self.states.get_mut(id.as_usize()) {
            Some(Some(state)) => state,
            _ => panic!("Transition to the unknown state {}", id),
        }
    }

    fn construct(tree: &ExprTree, root: NodeID) -> Self {
        let start = tree.firstpos(root).clone();
        let mut ids: FxHashMap<PositionSet, StateID> = FxHashMap::default();
        ids.insert(start.clone(), StateID::new(0));
        // The start state never accepts, a lexeme consumes at least one byte.
        let mut states = vec![DfaState::new(StateID::new(0), start, None)];
        let mut queue = VecDeque::from([StateID::new(0)]);

        while let Some(id) = queue.pop_front() {
            for p in partition(tree, &states[id].positions) {
                let next = tree.followpos_union(&p.positions);
                if next.is_empty() {
                    continue;
                }
                let target = match ids.get(&next) {
                    Some(target) => *target,
                    None => {
                        let target = StateID::new(states.len() as StateIDBase);
                        let accept = tree.accept_lexeme(&next);
                        trace!("New state {} for {:?}, accepts {:?}", target, next, accept);
                        ids.insert(next.clone(), target);
                        states.push(DfaState::new(target, next, accept));
                        queue.push_back(target);
                        target
                    }
                };
                let transition = Transition::new(p.guard, target);
                if !states[id].transitions.contains(&transition) {
                    states[id].transitions.push(transition);
                }
            }
        }
        Self {
            states: states.into_iter().map(Some).collect(),
        }
    }

    fn simplify(&mut self) {
        let mut rounds = 0;
        loop {
            rounds += 1;
            let removed = self.remove_redundant_transitions();
            let merged = self.merge_duplicate_states();
            if !removed && !merged {
                break;
            }
        }
        trace!("Simplification took {} rounds", rounds);
    }

    // A transition is shadowed by a later one to the same target that matches all of its bytes,
    // unless a transition in between catches some of these bytes and leads elsewhere.
    fn remove_redundant_transitions(&mut self) -> bool {
        let mut changed = false;
        for state in self.states.iter_mut().flatten() {
            let transitions = &mut state.transitions;
            let mut index = 0;
            while index < transitions.len() {
                if is_shadowed(&transitions[index..]) {
                    trace!(
                        "Removing shadowed transition {} of state {}",
                        transitions[index].guard,
                        state.id
                    );
                    transitions.remove(index);
                    changed = true;
                } else {
                    index += 1;
                }
            }
        }
        changed
    }

    // Later states are merged into the first equivalent state.
    fn merge_duplicate_states(&mut self) -> bool {
        let alive: Vec<StateID> = self.states().map(|s| s.id).collect();
        let mut replaced: BTreeMap<StateID, StateID> = BTreeMap::new();
        for (n, kept) in alive.iter().enumerate() {
            if replaced.contains_key(kept) {
                continue;
            }
            for other in &alive[n + 1..] {
                if replaced.contains_key(other) {
                    continue;
                }
                if let (Some(a), Some(b)) = (&self.states[*kept], &self.states[*other]) {
                    if a.is_equivalent(b) {
                        replaced.insert(*other, *kept);
                    }
                }
            }
        }
        if replaced.is_empty() {
            return false;
        }
        for (old, new) in &replaced {
            trace!("Merging state {} into state {}", old, new);
            self.states[*old] = None;
        }
        for state in self.states.iter_mut().flatten() {
            for transition in state.transitions.iter_mut() {
                if let Some(new) = replaced.get(&transition.target) {
                    transition.target = *new;
                }
            }
        }
        true
    }

    fn count_references(&mut self) {
        let targets: Vec<StateID> = self
            .states()
            .flat_map(|s| s.transitions.iter().map(|t| t.target))
            .collect();
        for target in targets {
            self.state_mut(target).ref_count += 1;
        }
    }
}

// Checks the first transition against the ones that follow it.
fn is_shadowed(transitions: &[Transition]) -> bool {
    let Some((current, later)) = transitions.split_first() else {
        return false;
    };
    let Some(chars) = current.guard.char_set() else {
        return false;
    };
    for transition in later {
        let Some(other) = transition.guard.char_set() else {
            return false;
        };
        if transition.target == current.target {
            if chars.subtract(other).is_empty() {
                return true;
            }
        } else if !chars.intersect(other).is_empty() {
            return false;
        }
    }
    false
}
