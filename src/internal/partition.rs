//! Partitioning of the positions of a DFA state into guarded transitions.
//!
//! Every byte is mapped to the positions whose character sets contain it, and bytes with the same
//! positions form one partition. Guards are evaluated in order and the first one that matches
//! wins, which allows a guard to be described by the intersection of its positions' sets even if
//! that intersection is broader than the bytes of the partition:
//! * single byte guards come first,
//! * a partition whose positions are a superset of another partition's positions is placed before
//!   it, so the broader description of the latter only sees the bytes left over.
//!
//! If the last guard covers exactly what the other guards leave over, it becomes the default
//! branch.
use std::{cmp::Ordering, collections::BTreeMap};

use log::trace;

use crate::{CharSet, ExprTree, Guard, Interval, PositionID, PositionSet};

/// One outgoing transition of a DFA state before the target state is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Partition {
    /// The positions that match the bytes selected by the guard.
    pub(crate) positions: PositionSet,
    /// The guard of the transition.
    pub(crate) guard: Guard,
}

/// Split the positions of one DFA state into guarded transitions.
pub(crate) fn partition(tree: &ExprTree, set: &PositionSet) -> Vec<Partition> {
    let consuming: Vec<PositionID> = set
        .iter()
        .copied()
        .filter(|p| !tree.position(*p).char_set().is_empty())
        .collect();

    let mut groups: BTreeMap<PositionSet, Vec<Interval>> = BTreeMap::new();
    for c in 0..=u8::MAX {
        let positions: PositionSet = consuming
            .iter()
            .copied()
            .filter(|p| tree.position(*p).char_set().contains(c))
            .collect();
        if !positions.is_empty() {
            groups.entry(positions).or_default().push(Interval::single(c));
        }
    }

    let (mut singles, mut others): (Vec<Partition>, Vec<Partition>) = groups
        .into_keys()
        .map(|positions| Partition {
            guard: describe(tree, &positions),
            positions,
        })
        .partition(|p| p.guard.char_set().is_some_and(|s| s.is_single_char()));

    singles.sort_by(|a, b| b.positions.cmp(&a.positions));
    others.sort_by(superset_first);
    singles.append(&mut others);
    let mut partitions = singles;

    if let Some((last, others)) = partitions.split_last_mut() {
        let covered = others.iter().fold(CharSet::Empty, |acc, p| {
            acc.union(p.guard.char_set().unwrap_or(&CharSet::Empty))
        });
        if last
            .guard
            .char_set()
            .is_some_and(|s| s.complement() == covered)
        {
            last.guard = Guard::Else;
        }
    }

    trace!(
        "Partitioned {} into {}",
        ids(set),
        partitions
            .iter()
            .map(|p| format!("{}->{}", p.guard, ids(&p.positions)))
            .collect::<Vec<_>>()
            .join(" ")
    );
    partitions
}

// The guard is described by the minimal sets of the positions: a position whose set contains the
// set of another one adds nothing to the intersection, equal sets are named once.
fn describe(tree: &ExprTree, positions: &PositionSet) -> Guard {
    let sets: Vec<&CharSet> = positions
        .iter()
        .map(|p| tree.position(*p).char_set())
        .collect();
    let mut terms: Vec<CharSet> = Vec::new();
    for (i, set) in sets.iter().enumerate() {
        let redundant = sets.iter().enumerate().any(|(j, other)| {
            i != j && other.subtract(set).is_empty() && (*other != *set || j < i)
        });
        if !redundant {
            terms.push((*set).clone());
        }
    }
    // Left out sets are supersets of the terms, so they do not change the intersection.
    Guard::new(tree.intersect_all(positions), terms)
}

// Partitions are ordered by their first position. If they share it, the one with more positions
// goes first, it may be a superset of the other.
fn superset_first(a: &Partition, b: &Partition) -> Ordering {
    a.positions
        .first()
        .cmp(&b.positions.first())
        .then(b.positions.len().cmp(&a.positions.len()))
        .then(a.positions.cmp(&b.positions))
}

fn ids(set: &PositionSet) -> String {
    let ids: Vec<String> = set.iter().map(|p| p.to_string()).collect();
    format!("{{{}}}", ids.join(","))
}
