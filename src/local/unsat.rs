const ABSENT: usize = usize::MAX;

/// Dense set of clause indices with O(1) insert, remove and membership.
///
/// `members` holds the clauses in arbitrary order; `position[c]` is the slot
/// of clause `c` in `members`, or `ABSENT`.
#[derive(Debug, Clone)]
pub struct UnsatSet {
    members: Vec<usize>,
    position: Vec<usize>,
}

impl UnsatSet {
    pub fn with_capacity(num_clauses: usize) -> Self {
        Self {
            members: Vec::new(),
            position: vec![ABSENT; num_clauses],
        }
    }

    pub fn insert(&mut self, clause: usize) {
        if self.position[clause] != ABSENT {
            return;
        }
        self.position[clause] = self.members.len();
        self.members.push(clause);
    }

    pub fn remove(&mut self, clause: usize) {
        let slot = self.position[clause];
        if slot == ABSENT {
            return;
        }
        self.members.swap_remove(slot);
        if let Some(&moved) = self.members.get(slot) {
            self.position[moved] = slot;
        }
        self.position[clause] = ABSENT;
    }

    pub fn contains(&self, clause: usize) -> bool {
        self.position.get(clause).is_some_and(|&p| p != ABSENT)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.members
    }
}
