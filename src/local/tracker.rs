use crate::cnf::cnf::{Lit, Model, Problem, Var};
use crate::cnf::occurs::OccurrenceIndex;

use super::unsat::UnsatSet;

/// Incremental bookkeeping for single-variable flips over a fixed formula.
///
/// Invariants, maintained by [`FlipTracker::flip`]:
/// - `true_counts[c]` is the number of true literals of clause `c`;
/// - `unsat` holds exactly the clauses with `true_counts[c] == 0`, and
///   `weight_unsat` is the sum of their weights;
/// - `break_counts[v]` is the weight of the clauses whose only true literal
///   belongs to `v`;
/// - when tracked, `make_counts[v]` is the weight of the unsatisfied clauses
///   that mention `v`, once per occurrence.
///
/// Counts are per literal occurrence, so clauses with repeated or
/// complementary literals are tracked as written. A flip costs time
/// proportional to the occurrences of the flipped variable (times clause
/// length), never to the size of the formula.
#[derive(Debug, Clone)]
pub struct FlipTracker<'a> {
    problem: &'a Problem,
    occurs: &'a OccurrenceIndex,
    model: Model,
    true_counts: Vec<u32>,
    unsat: UnsatSet,
    weight_unsat: u64,
    break_counts: Vec<i64>,
    make_counts: Option<Vec<i64>>,
    touched: Vec<usize>,
}

impl<'a> FlipTracker<'a> {
    /// # Panics
    ///
    /// Panics if `model` does not hold exactly `problem.num_vars` values.
    pub fn new(problem: &'a Problem, occurs: &'a OccurrenceIndex, model: Model) -> Self {
        Self::build(problem, occurs, model, false)
    }

    /// Like [`FlipTracker::new`], also tracking make counts.
    ///
    /// # Panics
    ///
    /// Panics if `model` does not hold exactly `problem.num_vars` values.
    pub fn with_make_counts(
        problem: &'a Problem,
        occurs: &'a OccurrenceIndex,
        model: Model,
    ) -> Self {
        Self::build(problem, occurs, model, true)
    }

    fn build(
        problem: &'a Problem,
        occurs: &'a OccurrenceIndex,
        model: Model,
        track_make: bool,
    ) -> Self {
        assert_eq!(
            model.len(),
            problem.num_vars as usize,
            "model length must match number of vars"
        );
        let num_vars = problem.num_vars as usize;
        let mut true_counts = vec![0u32; problem.num_clauses()];
        let mut unsat = UnsatSet::with_capacity(problem.num_clauses());
        let mut weight_unsat = 0u64;
        let mut break_counts = vec![0i64; num_vars];
        let mut make_counts = track_make.then(|| vec![0i64; num_vars]);

        for (idx, clause) in problem.clauses.iter().enumerate() {
            let weight = problem.weights[idx];
            let mut unit = None;
            for &lit in clause {
                if lit.is_true(&model) {
                    unit = Some(lit.var);
                    true_counts[idx] += 1;
                }
            }

            match (true_counts[idx], unit) {
                (0, _) => {
                    unsat.insert(idx);
                    weight_unsat += weight;
                    if let Some(make) = make_counts.as_mut() {
                        for &lit in clause {
                            make[lit.var as usize] += weight as i64;
                        }
                    }
                }
                (1, Some(v)) => break_counts[v as usize] += weight as i64,
                _ => {}
            }
        }

        Self {
            problem,
            occurs,
            model,
            true_counts,
            unsat,
            weight_unsat,
            break_counts,
            make_counts,
            touched: Vec::new(),
        }
    }

    pub fn flip(&mut self, var: Var) {
        let mut touched = std::mem::take(&mut self.touched);
        touched.clear();
        touched.extend_from_slice(self.occurs.clauses_of(Lit::new(var, true)));
        touched.extend_from_slice(self.occurs.clauses_of(Lit::new(var, false)));
        // a clause may list `var` more than once, in either polarity
        touched.sort_unstable();
        touched.dedup();

        for &idx in &touched {
            self.retract(idx);
        }
        self.model.flip(var);
        for &idx in &touched {
            self.apply(idx);
        }
        self.touched = touched;
    }

    /// Removes the contribution of clause `idx` under the current model.
    fn retract(&mut self, idx: usize) {
        let problem = self.problem;
        let weight = problem.weights[idx];
        let clause = &problem.clauses[idx];
        match self.true_counts[idx] {
            0 => {
                self.unsat.remove(idx);
                self.weight_unsat -= weight;
                if let Some(make) = self.make_counts.as_mut() {
                    for &lit in clause {
                        make[lit.var as usize] -= weight as i64;
                    }
                }
            }
            1 => {
                if let Some(v) = self.true_var(clause) {
                    self.break_counts[v as usize] -= weight as i64;
                }
            }
            _ => {}
        }
    }

    /// Recounts clause `idx` under the current model and adds its contribution.
    fn apply(&mut self, idx: usize) {
        let problem = self.problem;
        let weight = problem.weights[idx];
        let clause = &problem.clauses[idx];
        let count = clause.iter().filter(|lit| lit.is_true(&self.model)).count() as u32;
        self.true_counts[idx] = count;
        match count {
            0 => {
                self.unsat.insert(idx);
                self.weight_unsat += weight;
                if let Some(make) = self.make_counts.as_mut() {
                    for &lit in clause {
                        make[lit.var as usize] += weight as i64;
                    }
                }
            }
            1 => {
                if let Some(v) = self.true_var(clause) {
                    self.break_counts[v as usize] += weight as i64;
                }
            }
            _ => {}
        }
    }

    fn true_var(&self, clause: &[Lit]) -> Option<Var> {
        clause
            .iter()
            .find(|lit| lit.is_true(&self.model))
            .map(|lit| lit.var)
    }

    pub fn problem(&self) -> &'a Problem {
        self.problem
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Total weight of the currently unsatisfied clauses.
    pub fn score(&self) -> u64 {
        self.weight_unsat
    }

    pub fn num_unsat(&self) -> usize {
        self.unsat.len()
    }

    pub fn unsat_clauses(&self) -> &[usize] {
        self.unsat.as_slice()
    }

    pub fn true_counts(&self) -> &[u32] {
        &self.true_counts
    }

    pub fn break_count(&self, var: Var) -> i64 {
        self.break_counts[var as usize]
    }

    pub fn break_counts(&self) -> &[i64] {
        &self.break_counts
    }

    pub fn make_count(&self, var: Var) -> Option<i64> {
        self.make_counts.as_ref().map(|m| m[var as usize])
    }

    pub fn make_counts(&self) -> Option<&[i64]> {
        self.make_counts.as_deref()
    }
}
