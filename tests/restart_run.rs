use std::sync::atomic::{AtomicUsize, Ordering};

use lsmax::cnf::cnf::{Lit, Problem};
use lsmax::cnf::occurs::OccurrenceIndex;
use lsmax::local::anneal::AnnealConfig;
use lsmax::local::tabu::{TabuConfig, TabuSearch};
use lsmax::restart::{RestartConfig, Strategy, run_restarts, run_restarts_with};

fn config(workers: usize, restarts: usize, trials: u64, seed: u64) -> RestartConfig {
    RestartConfig {
        workers,
        restarts,
        trials,
        seed,
    }
}

/// Pairwise "at most one" over `n` vars plus "at least one" of each
/// block; weighted so that no assignment is free.
fn frustrated(n: u32) -> Problem {
    let mut pb = Problem::new(n);
    for a in 0..n {
        for b in (a + 1)..n {
            pb.add_weighted_clause(
                1 + u64::from((a + b) % 3),
                vec![Lit::new(a, false), Lit::new(b, false)],
            );
        }
    }
    for a in 0..n {
        pb.add_weighted_clause(2, vec![Lit::new(a, true)]);
    }
    pb
}

#[test]
fn trivially_satisfiable_reaches_zero() {
    let mut pb = Problem::new(2);
    pb.add_clause(vec![Lit::new(0, true), Lit::new(1, true)]);

    for strategy in [
        Strategy::Tabu(TabuConfig::default()),
        Strategy::Annealing(AnnealConfig::default()),
    ] {
        let mut seen = Vec::new();
        let report = run_restarts(&pb, &config(4, 10, 100, 3), strategy, |s| {
            seen.push(s.score)
        });
        let best = report.best.expect("a result");
        assert_eq!(best.score, 0);
        assert_eq!(best.model.cost(&pb), 0);
        assert_eq!(seen.last(), Some(&0));
        assert_eq!(report.improvements, seen.len());
    }
}

#[test]
fn contradiction_best_is_one() {
    let mut pb = Problem::new(1);
    pb.add_clause(vec![Lit::new(0, true)]);
    pb.add_clause(vec![Lit::new(0, false)]);

    for strategy in [
        Strategy::Tabu(TabuConfig::default()),
        Strategy::Annealing(AnnealConfig::default()),
    ] {
        let mut seen = Vec::new();
        let report = run_restarts(&pb, &config(3, 5, 200, 11), strategy, |s| {
            seen.push(s.score)
        });
        assert_eq!(report.best_score(), Some(1));
        assert_eq!(seen, vec![1]);
        assert_eq!(report.finished_workers, 3);
    }
}

#[test]
fn reported_scores_strictly_decrease() {
    let pb = frustrated(9);
    for strategy in [
        Strategy::Tabu(TabuConfig::default()),
        Strategy::Annealing(AnnealConfig::default()),
    ] {
        let mut seen = Vec::new();
        let report = run_restarts(&pb, &config(4, 20, 300, 5), strategy, |s| {
            assert_eq!(s.model.cost(&pb), s.score);
            seen.push(s.score);
        });
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(report.best_score(), seen.last().copied());
        assert_eq!(report.finished_workers, 4);
    }
}

#[test]
fn no_workers_means_no_result() {
    let mut pb = Problem::new(1);
    pb.add_clause(vec![Lit::new(0, true)]);
    let report = run_restarts(
        &pb,
        &config(0, 10, 10, 0),
        Strategy::Tabu(TabuConfig::default()),
        |_| panic!("no worker should report"),
    );
    assert_eq!(report.best, None);
    assert_eq!(report.finished_workers, 0);
}

#[test]
fn workers_stop_restarting_after_global_zero() {
    let mut pb = Problem::new(3);
    pb.add_clause(vec![Lit::new(0, true), Lit::new(1, true), Lit::new(2, true)]);
    let occurs = OccurrenceIndex::new(&pb);
    let built = AtomicUsize::new(0);
    let workers = 4;
    let restarts = 10_000;

    let report = run_restarts_with(
        &pb,
        &occurs,
        &config(workers, restarts, 50, 9),
        |p, o, rng| {
            built.fetch_add(1, Ordering::Relaxed);
            TabuSearch::new(p, o, 2, rng)
        },
        |_| {},
    );
    assert_eq!(report.best_score(), Some(0));
    // each worker stops at its first zero or at the next restart boundary
    assert!(built.load(Ordering::Relaxed) < workers * restarts);
}

#[test]
fn worker_and_restart_are_recorded() {
    let mut pb = Problem::new(2);
    pb.add_clause(vec![Lit::new(0, true)]);
    pb.add_clause(vec![Lit::new(1, false)]);
    let report = run_restarts(
        &pb,
        &config(2, 3, 10, 1),
        Strategy::Annealing(AnnealConfig::default()),
        |_| {},
    );
    let best = report.best.expect("a result");
    assert!(best.worker < 2);
    assert!(best.restart < 3);
    assert_eq!(best.score, 0);
    assert_eq!(best.model.to_vec(), vec![true, false]);
}
