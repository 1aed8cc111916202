//! This module contains node consistency and the classic AC-3 algorithm for the crossword CSP.
//! A variable is arc-consistent with a crossing variable when every word remaining in its domain
//! has at least one supporting word in the other domain that agrees on the shared cell. We keep
//! revising arcs until no more eliminations are possible or some domain is wiped out.

use log::debug;
use std::collections::{HashSet, VecDeque};

use crate::grid::Crossword;
use crate::types::{VariableId, WordId};

/// The mutable per-variable candidate sets, indexed by `VariableId`. A store is owned by one
/// solver instance and pruned monotonically: node consistency filters by length, then AC-3
/// removes words with no support in a crossing domain. Search itself never mutates the store.
#[derive(Debug, Clone)]
pub struct DomainStore {
    domains: Vec<HashSet<WordId>>,
}

impl DomainStore {
    /// Create a store giving every variable a copy of the full vocabulary.
    #[must_use]
    pub fn new(crossword: &Crossword) -> DomainStore {
        let full_vocabulary: HashSet<WordId> = (0..crossword.word_list.len()).collect();

        DomainStore {
            domains: vec![full_vocabulary; crossword.variables.len()],
        }
    }

    /// The current candidate set for the given variable.
    #[must_use]
    pub fn domain(&self, var_id: VariableId) -> &HashSet<WordId> {
        &self.domains[var_id]
    }

    /// The number of candidates remaining for the given variable.
    #[must_use]
    pub fn size(&self, var_id: VariableId) -> usize {
        self.domains[var_id].len()
    }
}

/// Remove from each variable's domain every word whose length doesn't match the variable's
/// length. Must run before `ac3`, which indexes into words at overlap positions.
pub fn enforce_node_consistency(crossword: &Crossword, domains: &mut DomainStore) {
    for (var_id, variable) in crossword.variables.iter().enumerate() {
        let word_list = &crossword.word_list;
        domains.domains[var_id].retain(|&word_id| word_list.get(word_id).chars.len() == variable.length);
    }
}

/// Make variable `x` arc-consistent with variable `y` by removing every word in `x`'s domain
/// that has no supporting word in `y`'s domain at their shared cell. Only `x`'s domain is
/// modified. Returns whether any removal occurred; if the variables don't cross, there is no
/// constraint and the domain is untouched.
pub fn revise(crossword: &Crossword, domains: &mut DomainStore, x: VariableId, y: VariableId) -> bool {
    let Some((i, j)) = crossword.overlap(x, y) else {
        return false;
    };

    // The characters available at the shared cell from `y`'s side.
    let supported_chars: HashSet<char> = domains.domains[y]
        .iter()
        .map(|&word_id| crossword.word_list.get(word_id).chars[j])
        .collect();

    // Snapshot the removals before applying them so we never mutate a set we're iterating.
    let removals: Vec<WordId> = domains.domains[x]
        .iter()
        .copied()
        .filter(|&word_id| !supported_chars.contains(&crossword.word_list.get(word_id).chars[i]))
        .collect();

    for &word_id in &removals {
        domains.domains[x].remove(&word_id);
    }

    !removals.is_empty()
}

/// Enforce arc consistency across the whole problem (or the supplied worklist) using AC-3.
/// Arcs are processed in FIFO order; whenever a revision shrinks a domain, every other arc
/// pointing at the revised variable is re-enqueued. Returns `false` as soon as any domain is
/// wiped out, meaning the CSP is unsatisfiable under the current domains.
pub fn ac3(
    crossword: &Crossword,
    domains: &mut DomainStore,
    arcs: Option<Vec<(VariableId, VariableId)>>,
) -> bool {
    let mut queue: VecDeque<(VariableId, VariableId)> = match arcs {
        Some(arcs) => arcs.into(),
        None => all_arcs(crossword).into(),
    };

    while let Some((x, y)) = queue.pop_front() {
        if !revise(crossword, domains, x, y) {
            continue;
        }

        if domains.domains[x].is_empty() {
            debug!(
                "domain wipeout for variable {} while revising against {}",
                crossword.variable(x).to_key(),
                crossword.variable(y).to_key()
            );
            return false;
        }

        for &neighbor in crossword.neighbors(x) {
            if neighbor != y {
                queue.push_back((neighbor, x));
            }
        }
    }

    true
}

/// Every ordered pair of distinct variables that shares a defined overlap.
#[must_use]
pub fn all_arcs(crossword: &Crossword) -> Vec<(VariableId, VariableId)> {
    (0..crossword.variables.len())
        .flat_map(|x| crossword.neighbors(x).iter().map(move |&y| (x, y)))
        .collect()
}
