//! This module implements the fill search: recursive backtracking over the domains pruned by
//! arc consistency, ordering variables with minimum-remaining-values (degree as tie-break) and
//! words with least-constraining-value. The domain store is treated as read-only once search
//! begins; each recursive frame owns its own copy-on-extend assignment, so backtracking is just
//! returning from the call.

use log::{debug, info};
use std::cmp::Reverse;

use crate::arc_consistency::{ac3, enforce_node_consistency, DomainStore};
use crate::grid::Crossword;
use crate::types::{Assignment, VariableId, WordId};

/// A struct tracking stats about the search process.
#[derive(Debug, Clone, Copy, Default)]
pub struct Statistics {
    /// How many candidate extensions were evaluated.
    pub states: usize,

    /// How many times a variable's candidates were exhausted without success.
    pub backtracks: usize,
}

/// A solver instance owning the domain store for one fill attempt. The crossword model and its
/// vocabulary are shared, read-only inputs that outlive the solver.
pub struct Solver<'a> {
    crossword: &'a Crossword,
    domains: DomainStore,
    pub statistics: Statistics,
}

impl<'a> Solver<'a> {
    #[must_use]
    pub fn new(crossword: &'a Crossword) -> Solver<'a> {
        Solver {
            crossword,
            domains: DomainStore::new(crossword),
            statistics: Statistics::default(),
        }
    }

    /// The solver's current domains, as pruned so far.
    #[must_use]
    pub fn domains(&self) -> &DomainStore {
        &self.domains
    }

    /// Enforce node and arc consistency, then search for a complete assignment. Returns `None`
    /// if the problem is unsatisfiable: either propagation wipes out a domain, in which case
    /// search would be trivially unproductive and we don't attempt it, or backtracking exhausts
    /// every candidate.
    pub fn solve(&mut self) -> Option<Assignment> {
        enforce_node_consistency(self.crossword, &mut self.domains);

        if !ac3(self.crossword, &mut self.domains, None) {
            debug!("initial propagation wiped out a domain; grid is unfillable");
            return None;
        }

        let result = self.backtrack(&Assignment::new());

        info!(
            "search finished: {} states, {} backtracks, solution {}",
            self.statistics.states,
            self.statistics.backtracks,
            if result.is_some() { "found" } else { "not found" }
        );

        result
    }

    /// Check that a (partial) assignment violates no constraints: all assigned words are
    /// pairwise distinct, every word fits its variable's length, and the letters agree at every
    /// overlap between assigned neighbors.
    #[must_use]
    pub fn consistent(&self, assignment: &Assignment) -> bool {
        for (&var_id, &word_id) in assignment {
            let word = self.crossword.word_list.get(word_id);

            if word.chars.len() != self.crossword.variable(var_id).length {
                return false;
            }

            for (&other_id, &other_word_id) in assignment {
                if other_id != var_id && other_word_id == word_id {
                    return false;
                }
            }

            for &neighbor in self.crossword.neighbors(var_id) {
                let Some(&neighbor_word_id) = assignment.get(&neighbor) else {
                    continue;
                };

                let (i, j) = self
                    .crossword
                    .overlap(var_id, neighbor)
                    .expect("neighbors must have a defined overlap");

                if word.chars[i] != self.crossword.word_list.get(neighbor_word_id).chars[j] {
                    return false;
                }
            }
        }

        true
    }

    /// Choose the unassigned variable to branch on next: smallest remaining domain, ties broken
    /// by highest degree, residual ties by lowest id so runs are reproducible.
    fn select_unassigned_variable(&self, assignment: &Assignment) -> VariableId {
        (0..self.crossword.variables.len())
            .filter(|var_id| !assignment.contains_key(var_id))
            .min_by_key(|&var_id| {
                (
                    self.domains.size(var_id),
                    Reverse(self.crossword.neighbors(var_id).len()),
                    var_id,
                )
            })
            .expect("backtrack only selects variables while some are unassigned")
    }

    /// The number of candidates this word would rule out across `var_id`'s unassigned
    /// neighbors, via the shared-cell constraints. Already-assigned neighbors are excluded;
    /// their constraint is enforced by `consistent` instead.
    fn rule_out_count(&self, var_id: VariableId, word_id: WordId, assignment: &Assignment) -> usize {
        let chars = &self.crossword.word_list.get(word_id).chars;

        self.crossword
            .neighbors(var_id)
            .iter()
            .copied()
            .filter(|neighbor| !assignment.contains_key(neighbor))
            .map(|neighbor| {
                let (i, j) = self
                    .crossword
                    .overlap(var_id, neighbor)
                    .expect("neighbors must have a defined overlap");
                let ch = chars[i];

                self.domains
                    .domain(neighbor)
                    .iter()
                    .filter(|&&other| self.crossword.word_list.get(other).chars[j] != ch)
                    .count()
            })
            .sum()
    }

    /// Order `var_id`'s domain least-constraining-value first: ascending by the number of
    /// neighbor candidates each word would rule out, ties by word id for reproducibility.
    fn order_domain_values(&self, var_id: VariableId, assignment: &Assignment) -> Vec<WordId> {
        let mut values: Vec<WordId> = self.domains.domain(var_id).iter().copied().collect();

        values.sort_unstable_by_key(|&word_id| {
            (self.rule_out_count(var_id, word_id, assignment), word_id)
        });

        values
    }

    /// Recursive depth-first search over partial assignments. Each candidate extension is a
    /// clone of the parent assignment, checked for consistency before recursing; the first
    /// complete assignment found propagates up immediately.
    fn backtrack(&mut self, assignment: &Assignment) -> Option<Assignment> {
        if assignment.len() == self.crossword.variables.len() {
            return Some(assignment.clone());
        }

        let var_id = self.select_unassigned_variable(assignment);

        for word_id in self.order_domain_values(var_id, assignment) {
            self.statistics.states += 1;

            let mut trial = assignment.clone();
            trial.insert(var_id, word_id);

            if !self.consistent(&trial) {
                continue;
            }

            if let Some(result) = self.backtrack(&trial) {
                return Some(result);
            }
        }

        self.statistics.backtracks += 1;
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::backtracking_search::Solver;
    use crate::grid::Crossword;
    use crate::types::Assignment;
    use crate::word_list::WordList;
    use std::collections::HashSet;

    fn build_crossword(template: &str, words: &[&str]) -> Crossword {
        Crossword::new(template, WordList::from_words(words).unwrap()).unwrap()
    }

    fn assert_valid_solution(crossword: &Crossword, assignment: &Assignment) {
        assert_eq!(assignment.len(), crossword.variables.len());

        let words: HashSet<_> = assignment.values().collect();
        assert_eq!(words.len(), assignment.len(), "words must be distinct");

        assert!(Solver::new(crossword).consistent(assignment));
    }

    #[test]
    fn test_crossing_slots_share_a_letter() {
        // Two length-3 slots crossing at the origin cell; both candidates start with 'c', so
        // either order works but the words must differ.
        let crossword = build_crossword(
            "
            ...
            .##
            .##
            ",
            &["cat", "cot"],
        );

        let mut solver = Solver::new(&crossword);
        let assignment = solver.solve().expect("expected a solution");

        assert_valid_solution(&crossword, &assignment);

        let shared: HashSet<char> = assignment
            .values()
            .map(|&word_id| crossword.word_list.get(word_id).chars[0])
            .collect();
        assert_eq!(shared, HashSet::from(['c']));
    }

    #[test]
    fn test_single_isolated_variable() {
        let crossword = build_crossword("...", &["dog", "mouse"]);

        let mut solver = Solver::new(&crossword);
        let assignment = solver.solve().expect("expected a solution");

        assert_eq!(assignment.len(), 1);
        let &word_id = assignment.values().next().unwrap();
        assert_eq!(crossword.word_list.get(word_id).string, "dog");
    }

    #[test]
    fn test_empty_vocabulary_has_no_solution() {
        let crossword = build_crossword(
            "
            ...
            .##
            .##
            ",
            &[],
        );

        assert!(Solver::new(&crossword).solve().is_none());
    }

    #[test]
    fn test_incompatible_candidates_have_no_solution() {
        // Both slots can only hold "cat" or "dog"; "cat"/"dog" disagree at the shared cell and
        // reusing one word twice is forbidden, so search exhausts every branch.
        let crossword = build_crossword(
            "
            ...
            .##
            .##
            ",
            &["cat", "dog"],
        );

        let mut solver = Solver::new(&crossword);

        assert!(solver.solve().is_none());
        assert!(solver.statistics.backtracks > 0);
    }

    #[test]
    fn test_propagation_failure_short_circuits_search() {
        // The only length-3 word starts with 'c' but the only length-4 word starts with 'd', so
        // the initial AC-3 pass wipes out the across domain and search is never attempted.
        let crossword = build_crossword(
            "
            ...
            .##
            .##
            .##
            ",
            &["cat", "dire"],
        );

        let mut solver = Solver::new(&crossword);

        assert!(solver.solve().is_none());
        assert_eq!(solver.statistics.states, 0);
    }

    #[test]
    fn test_propagation_alone_solves_singleton_domains() {
        // Node consistency leaves exactly one candidate per slot and the pair is compatible, so
        // search should confirm the assignment without a single backtrack.
        let crossword = build_crossword(
            "
            ....
            .###
            .###
            ",
            &["able", "art"],
        );

        let mut solver = Solver::new(&crossword);
        let assignment = solver.solve().expect("expected a solution");

        assert_valid_solution(&crossword, &assignment);
        assert_eq!(solver.statistics.backtracks, 0);
        assert_eq!(solver.statistics.states, 2);
    }

    #[test]
    fn test_solve_prunes_domains_before_search() {
        let crossword = build_crossword(
            "
            ...
            .##
            .##
            ",
            &["cat", "cot", "mouse"],
        );

        let mut solver = Solver::new(&crossword);
        solver.solve().expect("expected a solution");

        for (var_id, variable) in crossword.variables.iter().enumerate() {
            for &word_id in solver.domains().domain(var_id) {
                assert_eq!(crossword.word_list.get(word_id).chars.len(), variable.length);
            }
        }
    }

    #[test]
    fn test_consistent_rejects_bad_assignments() {
        let crossword = build_crossword(
            "
            ...
            .##
            .##
            ",
            &["cat", "cot", "tip", "ox"],
        );
        let solver = Solver::new(&crossword);

        let cat = crossword.word_list.word_id_by_string["cat"];
        let cot = crossword.word_list.word_id_by_string["cot"];
        let tip = crossword.word_list.word_id_by_string["tip"];
        let ox = crossword.word_list.word_id_by_string["ox"];

        // Valid partial and complete assignments.
        assert!(solver.consistent(&Assignment::from([(0, cat)])));
        assert!(solver.consistent(&Assignment::from([(0, cat), (1, cot)])));

        // Word reused across variables.
        assert!(!solver.consistent(&Assignment::from([(0, cat), (1, cat)])));

        // Wrong length.
        assert!(!solver.consistent(&Assignment::from([(0, ox)])));

        // Overlap mismatch: "cat" and "tip" disagree at the shared origin cell.
        assert!(!solver.consistent(&Assignment::from([(0, cat), (1, tip)])));
    }

    #[test]
    fn test_five_by_five_lattice_fill() {
        // A denser grid: 3 across and 3 down slots crossing in a lattice. One known fill is
        // cargo/tenet/salsa across with cotes/renal/outta down; the rest are decoys.
        let crossword = build_crossword(
            "
            .....
            .#.#.
            .....
            .#.#.
            .....
            ",
            &[
                "cargo", "tenet", "salsa", "cotes", "renal", "outta", "crane", "radar", "needs",
                "abode",
            ],
        );

        let mut solver = Solver::new(&crossword);
        let assignment = solver.solve().expect("expected a solution");

        assert_valid_solution(&crossword, &assignment);
    }
}
