use lsmax::cnf::cnf::{Lit, Model, Problem};
use lsmax::cnf::dimacs::parse_dimacs_str;
use lsmax::cnf::occurs::OccurrenceIndex;
use lsmax::local::tracker::FlipTracker;
use proptest::prelude::*;

// Clauses may repeat a variable in either polarity; such literals are
// tracked per occurrence like any other.
fn problem_strategy() -> impl Strategy<Value = (Problem, Vec<bool>, Vec<u32>)> {
    (1u32..7).prop_flat_map(|num_vars| {
        let lit = (0..num_vars, any::<bool>()).prop_map(|(v, s)| Lit::new(v, s));
        let clause = prop::collection::vec(lit, 1..5);
        let weighted = (1u64..10, clause);
        (
            prop::collection::vec(weighted, 0..16),
            prop::collection::vec(any::<bool>(), num_vars as usize),
            prop::collection::vec(0..num_vars, 0..40),
        )
            .prop_map(move |(clauses, model, flips)| {
                let mut pb = Problem::new(num_vars);
                for (w, c) in clauses {
                    pb.add_weighted_clause(w, c);
                }
                (pb, model, flips)
            })
    })
}

fn sorted(xs: &[usize]) -> Vec<usize> {
    let mut v = xs.to_vec();
    v.sort_unstable();
    v
}

/// Recomputes every tracked quantity from scratch and compares.
fn check_invariants(t: &FlipTracker<'_>) -> Result<(), TestCaseError> {
    let pb = t.problem();
    let model = t.model();
    let mut breaks = vec![0i64; pb.num_vars as usize];
    let mut makes = vec![0i64; pb.num_vars as usize];
    let mut unsat = Vec::new();

    for (idx, clause) in pb.clauses.iter().enumerate() {
        let w = pb.weights[idx] as i64;
        let true_lits = clause.iter().filter(|l| l.is_true(model)).collect::<Vec<_>>();
        prop_assert_eq!(t.true_counts()[idx] as usize, true_lits.len());
        match true_lits.len() {
            0 => {
                unsat.push(idx);
                for l in clause {
                    makes[l.var as usize] += w;
                }
            }
            1 => breaks[true_lits[0].var as usize] += w,
            _ => {}
        }
    }

    prop_assert_eq!(sorted(t.unsat_clauses()), unsat.clone());
    prop_assert_eq!(t.num_unsat(), unsat.len());
    let listed: u64 = t.unsat_clauses().iter().map(|&c| pb.weights[c]).sum();
    prop_assert_eq!(t.score(), listed);
    prop_assert_eq!(t.score(), model.cost(pb));
    prop_assert_eq!(t.break_counts(), breaks.as_slice());
    if let Some(m) = t.make_counts() {
        prop_assert_eq!(m, makes.as_slice());
    }
    Ok(())
}

#[test]
fn initial_state_counts_units_and_unsat() {
    let mut pb = Problem::new(3);
    pb.add_weighted_clause(2, vec![Lit::new(0, true), Lit::new(1, true)]);
    pb.add_weighted_clause(5, vec![Lit::new(0, false), Lit::new(2, true)]);
    pb.add_weighted_clause(3, vec![Lit::new(1, true), Lit::new(2, false)]);
    let occurs = OccurrenceIndex::new(&pb);

    // x0 = T, x1 = F, x2 = F
    let model = Model::new(vec![true, false, false]);
    let t = FlipTracker::with_make_counts(&pb, &occurs, model);
    assert_eq!(t.true_counts(), &[1, 0, 1]);
    assert_eq!(t.unsat_clauses(), &[1]);
    assert_eq!(t.score(), 5);
    assert_eq!(t.break_counts(), &[2, 0, 3]);
    assert_eq!(t.make_counts(), Some(&[5i64, 0, 5][..]));
}

#[test]
fn flip_updates_score_and_counts() {
    let mut pb = Problem::new(2);
    pb.add_clause(vec![Lit::new(0, true), Lit::new(1, true)]);
    pb.add_clause(vec![Lit::new(0, false)]);
    let occurs = OccurrenceIndex::new(&pb);
    let mut t = FlipTracker::new(&pb, &occurs, Model::new(vec![false, false]));
    assert_eq!(t.score(), 1);
    assert_eq!(t.break_counts(), &[1, 0]);
    assert_eq!(t.make_counts(), None);

    t.flip(1);
    assert_eq!(t.score(), 0);
    assert_eq!(t.break_counts(), &[1, 1]);

    t.flip(0);
    assert_eq!(t.score(), 1);
    assert_eq!(t.unsat_clauses(), &[1]);
    assert_eq!(t.break_counts(), &[0, 0]);
}

#[test]
fn tautology_keeps_break_counts_stable() {
    let pb = parse_dimacs_str("p cnf 2 2\n1 -1 0\n1 2 0\n").expect("parse");
    let occurs = OccurrenceIndex::new(&pb);
    let mut t = FlipTracker::with_make_counts(&pb, &occurs, Model::new(vec![false, true]));
    // (x0 | -x0) is held by -x0 alone, (x0 | x1) by x1 alone
    assert_eq!(t.break_counts(), &[1, 1]);

    t.flip(0);
    // x0 now holds the tautology and shares the second clause with x1
    assert_eq!(t.break_counts(), &[1, 0]);
    assert_eq!(t.true_counts(), &[1, 2]);

    for _ in 0..11 {
        t.flip(0);
    }
    assert_eq!(t.model(), &Model::new(vec![false, true]));
    assert_eq!(t.break_counts(), &[1, 1]);
    assert_eq!(t.true_counts(), &[1, 1]);
    assert_eq!(t.score(), 0);
    assert_eq!(t.make_counts(), Some(&[0i64, 0][..]));
}

#[test]
fn repeated_literal_counts_each_occurrence() {
    let mut pb = Problem::new(1);
    pb.add_weighted_clause(3, vec![Lit::new(0, true), Lit::new(0, true)]);
    let occurs = OccurrenceIndex::new(&pb);
    let mut t = FlipTracker::with_make_counts(&pb, &occurs, Model::new(vec![false]));
    assert_eq!(t.score(), 3);
    assert_eq!(t.make_counts(), Some(&[6i64][..]));

    t.flip(0);
    assert_eq!(t.score(), 0);
    assert_eq!(t.true_counts(), &[2]);
    assert_eq!(t.break_counts(), &[0]);
    assert_eq!(t.make_counts(), Some(&[0i64][..]));

    t.flip(0);
    assert_eq!(t.score(), 3);
    assert_eq!(t.unsat_clauses(), &[0]);
    assert_eq!(t.break_counts(), &[0]);
    assert_eq!(t.make_counts(), Some(&[6i64][..]));
}

#[test]
#[should_panic(expected = "model length")]
fn model_of_wrong_length_is_rejected() {
    let pb = Problem::new(2);
    let occurs = OccurrenceIndex::new(&pb);
    let _ = FlipTracker::new(&pb, &occurs, Model::new(vec![true]));
}

proptest! {
    #[test]
    fn invariants_hold_after_every_flip((pb, model, flips) in problem_strategy()) {
        let occurs = OccurrenceIndex::new(&pb);
        let mut t = FlipTracker::with_make_counts(&pb, &occurs, Model::new(model));
        check_invariants(&t)?;
        for v in flips {
            t.flip(v);
            check_invariants(&t)?;
        }
    }

    #[test]
    fn break_only_tracker_matches_scan((pb, model, flips) in problem_strategy()) {
        let occurs = OccurrenceIndex::new(&pb);
        let mut t = FlipTracker::new(&pb, &occurs, Model::new(model));
        for v in flips {
            t.flip(v);
        }
        check_invariants(&t)?;
    }

    #[test]
    fn double_flip_restores_state((pb, model, flips) in problem_strategy()) {
        let occurs = OccurrenceIndex::new(&pb);
        let mut t = FlipTracker::with_make_counts(&pb, &occurs, Model::new(model));
        for v in flips {
            let before_model = t.model().clone();
            let before_true = t.true_counts().to_vec();
            let before_unsat = sorted(t.unsat_clauses());
            let before_score = t.score();
            let before_break = t.break_counts().to_vec();
            let before_make = t.make_counts().map(|m| m.to_vec());

            t.flip(v);
            t.flip(v);

            prop_assert_eq!(t.model(), &before_model);
            prop_assert_eq!(t.true_counts(), before_true.as_slice());
            prop_assert_eq!(sorted(t.unsat_clauses()), before_unsat);
            prop_assert_eq!(t.score(), before_score);
            prop_assert_eq!(t.break_counts(), before_break.as_slice());
            prop_assert_eq!(t.make_counts().map(|m| m.to_vec()), before_make);

            // move on to a new state for the next round
            t.flip(v);
        }
    }
}
