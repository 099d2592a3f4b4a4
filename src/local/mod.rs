pub mod anneal;
pub mod tabu;
pub mod tracker;
pub mod unsat;

use rand::Rng;

use crate::cnf::cnf::Model;

/// A randomized local-search solver over one fixed formula.
///
/// Scores are total weights of unsatisfied clauses: lower is better, 0 means
/// every clause is satisfied.
pub trait LocalSearch {
    /// Runs at most `trials` steps and returns the current assignment.
    fn solve<R: Rng + ?Sized>(&mut self, trials: u64, rng: &mut R) -> &Model;
    fn score(&self) -> u64;
    fn model(&self) -> &Model;
}
