use rand::Rng;

use crate::cnf::cnf::{Model, Problem, Var};
use crate::cnf::occurs::OccurrenceIndex;

use super::LocalSearch;
use super::tracker::FlipTracker;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnealConfig {
    pub initial_temperature: f64,
    /// Geometric cooling factor applied once per trial.
    pub cooling: f64,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1.0,
            cooling: 0.99,
        }
    }
}

/// Metropolis acceptance: improving or neutral moves always pass.
pub fn acceptance_probability(delta: f64, temperature: f64) -> f64 {
    if delta >= 0.0 {
        1.0
    } else {
        (-(1.0 - delta) / temperature).exp()
    }
}

/// Simulated annealing over uniformly drawn variables.
#[derive(Debug, Clone)]
pub struct Annealing<'a> {
    tracker: FlipTracker<'a>,
    temperature: f64,
    cooling: f64,
}

impl<'a> Annealing<'a> {
    pub fn new<R: Rng + ?Sized>(
        problem: &'a Problem,
        occurs: &'a OccurrenceIndex,
        config: AnnealConfig,
        rng: &mut R,
    ) -> Self {
        let model = Model::random(problem.num_vars, rng);
        Self::with_model(problem, occurs, config, model)
    }

    pub fn with_model(
        problem: &'a Problem,
        occurs: &'a OccurrenceIndex,
        config: AnnealConfig,
        model: Model,
    ) -> Self {
        Self {
            tracker: FlipTracker::with_make_counts(problem, occurs, model),
            temperature: config.initial_temperature,
            cooling: config.cooling,
        }
    }

    pub fn tracker(&self) -> &FlipTracker<'a> {
        &self.tracker
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Normalized score change of flipping `var`; positive means less
    /// unsatisfied weight after the flip.
    pub fn delta(&self, var: Var) -> f64 {
        let make = self.tracker.make_count(var).unwrap_or(0);
        let breaks = self.tracker.break_count(var);
        (make - breaks) as f64 / self.tracker.problem().num_vars as f64
    }
}

impl LocalSearch for Annealing<'_> {
    fn solve<R: Rng + ?Sized>(&mut self, trials: u64, rng: &mut R) -> &Model {
        let num_vars = self.tracker.problem().num_vars;
        if num_vars == 0 {
            return self.tracker.model();
        }
        for _ in 0..trials {
            if self.tracker.score() == 0 {
                break;
            }
            let var = rng.random_range(0..num_vars);
            let delta = self.delta(var);
            self.temperature *= self.cooling;
            if rng.random::<f64>() < acceptance_probability(delta, self.temperature) {
                self.tracker.flip(var);
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
