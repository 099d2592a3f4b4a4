//! Incremental local search for weighted MAX-SAT.
//!
//! A [`cnf::cnf::Problem`] is searched by tabu search or simulated annealing
//! ([`local`]), both driven by the same flip bookkeeping
//! ([`local::tracker::FlipTracker`]). [`restart`] races many restarts on a
//! fixed pool of threads and surfaces only strictly improving results.

pub mod cnf;
pub mod local;
pub mod restart;
pub mod rng;
