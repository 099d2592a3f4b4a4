use rand::Rng;

use crate::cnf::cnf::{Model, Problem, Var};
use crate::cnf::occurs::OccurrenceIndex;

use super::LocalSearch;
use super::tracker::FlipTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabuConfig {
    /// Tabu lengths are drawn uniformly from `0..tabu_len_limit` per restart.
    pub tabu_len_limit: u64,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self { tabu_len_limit: 10 }
    }
}

impl TabuConfig {
    pub fn sample_tabu_len<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        if self.tabu_len_limit == 0 {
            0
        } else {
            rng.random_range(0..self.tabu_len_limit)
        }
    }
}

/// Tabu search: flip the least-breaking variable of a random unsatisfied
/// clause, skipping recently flipped variables unless flipping them breaks
/// nothing.
#[derive(Debug, Clone)]
pub struct TabuSearch<'a> {
    tracker: FlipTracker<'a>,
    tabu_len: u64,
    flips: u64,
    last_flip: Vec<Option<u64>>,
    candidates: Vec<Var>,
}

impl<'a> TabuSearch<'a> {
    pub fn new<R: Rng + ?Sized>(
        problem: &'a Problem,
        occurs: &'a OccurrenceIndex,
        tabu_len: u64,
        rng: &mut R,
    ) -> Self {
        let model = Model::random(problem.num_vars, rng);
        Self::with_model(problem, occurs, tabu_len, model)
    }

    pub fn with_model(
        problem: &'a Problem,
        occurs: &'a OccurrenceIndex,
        tabu_len: u64,
        model: Model,
    ) -> Self {
        Self {
            tracker: FlipTracker::new(problem, occurs, model),
            tabu_len,
            flips: 0,
            last_flip: vec![None; problem.num_vars as usize],
            candidates: Vec::new(),
        }
    }

    pub fn tracker(&self) -> &FlipTracker<'a> {
        &self.tracker
    }

    pub fn is_tabu(&self, var: Var) -> bool {
        match self.last_flip[var as usize] {
            Some(at) => self.flips - at <= self.tabu_len,
            None => false,
        }
    }

    /// Chooses the variable to flip next, or `None` when every variable of
    /// the sampled clause is tabu (a dead step).
    pub fn pick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Var> {
        let unsat = self.tracker.unsat_clauses();
        if unsat.is_empty() {
            return None;
        }
        let idx = unsat[rng.random_range(0..unsat.len())];
        let clause = &self.tracker.problem().clauses[idx];

        self.candidates.clear();
        let mut best = None::<i64>;
        for lit in clause {
            let breaks = self.tracker.break_count(lit.var);
            let aspiration = breaks == 0;
            if !aspiration && self.is_tabu(lit.var) {
                continue;
            }
            match best {
                Some(b) if breaks > b => continue,
                Some(b) if breaks == b => {}
                _ => {
                    best = Some(breaks);
                    self.candidates.clear();
                }
            }
            self.candidates.push(lit.var);
        }

        match self.candidates.len() {
            0 => None,
            1 => Some(self.candidates[0]),
            n => Some(self.candidates[rng.random_range(0..n)]),
        }
    }

    pub fn flip(&mut self, var: Var) {
        self.flips += 1;
        self.last_flip[var as usize] = Some(self.flips);
        self.tracker.flip(var);
    }
}

impl LocalSearch for TabuSearch<'_> {
    fn solve<R: Rng + ?Sized>(&mut self, trials: u64, rng: &mut R) -> &Model {
        for _ in 0..trials {
            if self.tracker.num_unsat() == 0 {
                break;
            }
            if let Some(var) = self.pick(rng) {
                self.flip(var);
            }
        }
        self.tracker.model()
    }

    fn score(&self) -> u64 {
        self.tracker.score()
    }

    fn model(&self) -> &Model {
        self.tracker.model()
    }
}
