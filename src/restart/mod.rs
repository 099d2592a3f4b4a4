use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;

use log::{debug, info};
use rand_chacha::ChaCha8Rng;

use crate::cnf::cnf::{Model, Problem};
use crate::cnf::occurs::OccurrenceIndex;
use crate::local::LocalSearch;
use crate::local::anneal::{AnnealConfig, Annealing};
use crate::local::tabu::{TabuConfig, TabuSearch};
use crate::rng::worker_rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    Tabu(TabuConfig),
    Annealing(AnnealConfig),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Tabu(_) => "tabu",
            Strategy::Annealing(_) => "sa",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartConfig {
    pub workers: usize,
    pub restarts: usize,
    pub trials: u64,
    pub seed: u64,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            workers: available_workers(),
            restarts: 100,
            trials: 100_000,
            seed: 0,
        }
    }
}

pub fn available_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub score: u64,
    pub model: Model,
    pub worker: usize,
    pub restart: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartReport {
    pub best: Option<Solution>,
    pub improvements: usize,
    pub finished_workers: usize,
}

impl RestartReport {
    pub fn best_score(&self) -> Option<u64> {
        self.best.as_ref().map(|s| s.score)
    }
}

enum Report {
    Improved(Solution),
    Finished { worker: usize },
}

pub fn run_restarts<P>(
    problem: &Problem,
    config: &RestartConfig,
    strategy: Strategy,
    on_improve: P,
) -> RestartReport
where
    P: FnMut(&Solution),
{
    let occurs = OccurrenceIndex::new(problem);
    match strategy {
        Strategy::Tabu(tabu) => run_restarts_with(
            problem,
            &occurs,
            config,
            |p, o, rng| {
                let tabu_len = tabu.sample_tabu_len(rng);
                TabuSearch::new(p, o, tabu_len, rng)
            },
            on_improve,
        ),
        Strategy::Annealing(anneal) => run_restarts_with(
            problem,
            &occurs,
            config,
            |p, o, rng| Annealing::new(p, o, anneal, rng),
            on_improve,
        ),
    }
}

/// Races `config.workers` threads, each running up to `config.restarts`
/// fresh solvers built by `factory`. Workers only report results strictly
/// better than their own previous best; `on_improve` sees strictly
/// decreasing global scores.
///
/// Returns once every worker has finished or a zero score was found; the
/// remaining workers stop at their next restart boundary.
pub fn run_restarts_with<'a, S, F, P>(
    problem: &'a Problem,
    occurs: &'a OccurrenceIndex,
    config: &RestartConfig,
    factory: F,
    mut on_improve: P,
) -> RestartReport
where
    S: LocalSearch,
    F: Fn(&'a Problem, &'a OccurrenceIndex, &mut ChaCha8Rng) -> S + Sync,
    P: FnMut(&Solution),
{
    let stop = AtomicBool::new(false);
    let (tx, rx) = mpsc::sync_channel::<Report>(0);

    thread::scope(|scope| {
        for worker in 0..config.workers {
            let tx = tx.clone();
            let factory = &factory;
            let stop = &stop;
            scope.spawn(move || run_worker(worker, problem, occurs, config, factory, stop, tx));
        }
        drop(tx);

        let report = aggregate(problem, &rx, config.workers, &mut on_improve);
        stop.store(true, Ordering::Release);
        // blocked senders fail once the receiver is gone
        drop(rx);
        info!(
            "run finished: best={:?} improvements={} finished_workers={}",
            report.best_score(),
            report.improvements,
            report.finished_workers
        );
        report
    })
}

fn run_worker<'a, S, F>(
    worker: usize,
    problem: &'a Problem,
    occurs: &'a OccurrenceIndex,
    config: &RestartConfig,
    factory: &F,
    stop: &AtomicBool,
    tx: SyncSender<Report>,
) where
    S: LocalSearch,
    F: Fn(&'a Problem, &'a OccurrenceIndex, &mut ChaCha8Rng) -> S,
{
    let mut rng = worker_rng(config.seed, worker);
    let mut best = None::<u64>;
    debug!("worker {worker}: starting, {} restarts", config.restarts);

    for restart in 0..config.restarts {
        if stop.load(Ordering::Acquire) {
            debug!("worker {worker}: stopped before restart {restart}");
            return;
        }

        let mut solver = factory(problem, occurs, &mut rng);
        solver.solve(config.trials, &mut rng);
        let score = solver.score();
        if best.is_some_and(|b| score >= b) {
            continue;
        }
        best = Some(score);
        debug!("worker {worker}: restart {restart} improved to {score}");

        let solution = Solution {
            score,
            model: solver.model().clone(),
            worker,
            restart,
        };
        if tx.send(Report::Improved(solution)).is_err() {
            return;
        }
        if score == 0 {
            break;
        }
    }

    debug!("worker {worker}: done");
    let _ = tx.send(Report::Finished { worker });
}

fn aggregate<P>(
    problem: &Problem,
    rx: &Receiver<Report>,
    workers: usize,
    on_improve: &mut P,
) -> RestartReport
where
    P: FnMut(&Solution),
{
    let mut report = RestartReport {
        best: None,
        improvements: 0,
        finished_workers: 0,
    };

    while report.finished_workers < workers && report.best_score() != Some(0) {
        let Ok(msg) = rx.recv() else {
            break;
        };
        match msg {
            Report::Improved(solution) => {
                if report.best_score().is_some_and(|b| solution.score >= b) {
                    continue;
                }
                debug_assert_eq!(solution.model.cost(problem), solution.score);
                info!(
                    "new best {} (worker {}, restart {})",
                    solution.score, solution.worker, solution.restart
                );
                on_improve(&solution);
                report.improvements += 1;
                report.best = Some(solution);
            }
            Report::Finished { worker } => {
                debug!("worker {worker}: finished");
                report.finished_workers += 1;
            }
        }
    }
    report
}
