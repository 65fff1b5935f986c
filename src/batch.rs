use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::solve::{self, Solution};
use crate::{Goal, Puzzle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Sequential,
    /// Bounded by `threads`, or the host parallelism when unset.
    Parallel { threads: Option<NonZeroUsize> },
}

#[derive(Debug, Clone)]
pub struct Run {
    pub elapsed: Duration,
    pub solution: Solution,
}

impl Run {
    pub fn millis(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

#[derive(Debug, Clone)]
pub struct Batch {
    /// One entry per input puzzle, in input order.
    pub runs: Vec<Run>,
    /// End-to-end duration of the whole batch.
    pub wall: Duration,
}

impl Batch {
    pub fn total_millis(&self) -> f64 {
        self.runs.iter().map(Run::millis).sum()
    }

    pub fn total_nodes(&self) -> usize {
        self.runs.iter().map(|run| run.solution.nodes_expanded).sum()
    }

    pub fn wall_millis(&self) -> f64 {
        self.wall.as_secs_f64() * 1000.0
    }
}

fn solve_timed(index: usize, puzzle: &Puzzle, goal: Goal) -> Run {
    let start = Instant::now();
    let solution = solve::astar(puzzle.clone(), goal, || {});
    let elapsed = start.elapsed();

    match solution.steps() {
        Some(steps) => debug!(
            puzzle = index + 1,
            steps,
            nodes = solution.nodes_expanded,
            "Solved in {:.3} ms",
            elapsed.as_secs_f64() * 1000.0
        ),
        None => warn!(
            puzzle = index + 1,
            nodes = solution.nodes_expanded,
            "Search space exhausted without reaching the goal"
        ),
    }
    Run { elapsed, solution }
}

pub fn run_sequential(puzzles: &[Puzzle], goal: Goal, on_done: impl Fn(usize, &Run)) -> Batch {
    let start = Instant::now();
    let runs = puzzles
        .iter()
        .enumerate()
        .map(|(i, puzzle)| {
            let run = solve_timed(i, puzzle, goal);
            on_done(i, &run);
            run
        })
        .collect();
    Batch {
        runs,
        wall: start.elapsed(),
    }
}

pub fn run_parallel(
    puzzles: &[Puzzle],
    goal: Goal,
    threads: Option<NonZeroUsize>,
    on_done: impl Fn(usize, &Run) + Sync,
) -> Result<Batch> {
    let threads = match threads {
        Some(n) => n,
        None => std::thread::available_parallelism()
            .context("Failed to query the available parallelism")?,
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.get())
        .build()
        .context("Failed to build the worker pool")?;
    debug!(threads = threads.get(), "Worker pool ready");

    let start = Instant::now();
    let runs = pool.install(|| {
        puzzles
            .par_iter()
            .enumerate()
            .map(|(i, puzzle)| {
                let run = solve_timed(i, puzzle, goal);
                on_done(i, &run);
                run
            })
            .collect::<Vec<_>>()
    });
    Ok(Batch {
        runs,
        wall: start.elapsed(),
    })
}

pub fn run(
    puzzles: &[Puzzle],
    goal: Goal,
    mode: Mode,
    on_done: impl Fn(usize, &Run) + Sync,
) -> Result<Batch> {
    match mode {
        Mode::Sequential => Ok(run_sequential(puzzles, goal, on_done)),
        Mode::Parallel { threads } => run_parallel(puzzles, goal, threads, on_done),
    }
}
