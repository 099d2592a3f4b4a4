use super::cnf::{Lit, Problem};

/// For each literal, the indices of the clauses it appears in.
///
/// Literal `v` lives in slot `2 * v`, literal `-v` in slot `2 * v + 1`.
/// Clause indices are stored in increasing order, once per occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceIndex {
    slots: Vec<Vec<usize>>,
}

impl OccurrenceIndex {
    pub fn new(problem: &Problem) -> Self {
        let mut slots = vec![Vec::new(); 2 * problem.num_vars as usize];
        for (idx, clause) in problem.clauses.iter().enumerate() {
            for &lit in clause {
                slots[slot_of(lit)].push(idx);
            }
        }
        Self { slots }
    }

    pub fn clauses_of(&self, lit: Lit) -> &[usize] {
        &self.slots[slot_of(lit)]
    }

    pub fn num_vars(&self) -> usize {
        self.slots.len() / 2
    }
}

fn slot_of(lit: Lit) -> usize {
    2 * lit.var as usize + usize::from(!lit.sign)
}
