use std::fmt;
use std::ops::Deref;

use rand::Rng;

/// Zero-based variable index into a [`Model`].
pub type Var = u32;

/// A variable or its negation. `sign == true` is the unnegated literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lit {
    pub var: Var,
    pub sign: bool,
}

impl Lit {
    pub fn new(var: Var, sign: bool) -> Self {
        Self { var, sign }
    }

    pub fn neg(self) -> Self {
        Self {
            var: self.var,
            sign: !self.sign,
        }
    }

    /// Decodes a signed DIMACS literal; `0` is the clause sentinel, not a literal.
    pub fn from_dimacs(value: i64) -> Option<Self> {
        if value == 0 {
            return None;
        }
        let var = u32::try_from(value.unsigned_abs() - 1).ok()?;
        Some(Self::new(var, value > 0))
    }

    pub fn to_dimacs(self) -> i64 {
        let v = self.var as i64 + 1;
        if self.sign { v } else { -v }
    }

    pub fn is_true(self, model: &Model) -> bool {
        model[self.var as usize] == self.sign
    }
}

pub type Clause = Vec<Lit>;

/// A weighted CNF formula. `weights[i]` is the cost of leaving `clauses[i]`
/// unsatisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub num_vars: u32,
    pub clauses: Vec<Clause>,
    pub weights: Vec<u64>,
}

impl Problem {
    pub fn new(num_vars: u32) -> Self {
        Self {
            num_vars,
            clauses: Vec::new(),
            weights: Vec::new(),
        }
    }

    pub fn add_clause(&mut self, clause: Clause) {
        self.add_weighted_clause(1, clause);
    }

    pub fn add_weighted_clause(&mut self, weight: u64, clause: Clause) {
        self.clauses.push(clause);
        self.weights.push(weight);
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn total_weight(&self) -> u64 {
        self.weights.iter().sum()
    }

    pub fn is_weighted(&self) -> bool {
        self.weights.iter().any(|&w| w != 1)
    }
}

/// A complete assignment, one boolean per variable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Model(Vec<bool>);

impl Model {
    pub fn new(values: Vec<bool>) -> Self {
        Self(values)
    }

    pub fn random<R: Rng + ?Sized>(num_vars: u32, rng: &mut R) -> Self {
        Self((0..num_vars).map(|_| rng.random::<bool>()).collect())
    }

    pub fn flip(&mut self, var: Var) {
        let slot = &mut self.0[var as usize];
        *slot = !*slot;
    }

    pub fn satisfies(&self, clause: &[Lit]) -> bool {
        clause.iter().any(|&lit| lit.is_true(self))
    }

    /// Total weight of unsatisfied clauses, recomputed over the whole formula.
    pub fn cost(&self, problem: &Problem) -> u64 {
        problem
            .clauses
            .iter()
            .zip(&problem.weights)
            .filter(|(clause, _)| !self.satisfies(clause))
            .map(|(_, &w)| w)
            .sum()
    }

    pub fn unsat_clauses(&self, problem: &Problem) -> Vec<usize> {
        problem
            .clauses
            .iter()
            .enumerate()
            .filter(|(_, clause)| !self.satisfies(clause))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn to_dimacs_line(&self) -> String {
        let mut out = String::from("v");
        for (i, &value) in self.0.iter().enumerate() {
            let lit = Lit::new(i as Var, value);
            out.push_str(&format!(" {}", lit.to_dimacs()));
        }
        out.push_str(" 0");
        out
    }
}

impl Deref for Model {
    type Target = [bool];

    fn deref(&self) -> &[bool] {
        &self.0
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}
