//! Text output for solved batches: human readable dumps and the line based
//! bench/steps records.

use std::io::{self, Write};

use crate::batch::{Batch, Run};

pub fn write_solution(w: &mut impl Write, index: usize, run: &Run) -> io::Result<()> {
    let solution = &run.solution;
    writeln!(w, "Solution for puzzle {}", index + 1)?;
    for step in &solution.path {
        write!(w, "{}\n{}", step.action, step.puzzle)?;
    }
    match solution.steps() {
        Some(steps) => writeln!(
            w,
            "Solved in {steps} steps, expanded {} nodes\n",
            solution.nodes_expanded
        ),
        None => writeln!(
            w,
            "No solution found, expanded {} nodes\n",
            solution.nodes_expanded
        ),
    }
}

pub fn write_summary(w: &mut impl Write, batch: &Batch) -> io::Result<()> {
    for (run, i) in batch.runs.iter().zip(1..) {
        writeln!(
            w,
            "Puzzle {i}: {:.6} ms, {} nodes",
            run.millis(),
            run.solution.nodes_expanded
        )?;
    }
    writeln!(
        w,
        "\nTotal: {:.6} ms, {} nodes",
        batch.total_millis(),
        batch.total_nodes()
    )?;
    writeln!(w, "End-to-end: {:.6} ms", batch.wall_millis())
}

/// `N, ms` per puzzle followed by `total, ms`.
pub fn write_bench(w: &mut impl Write, batch: &Batch) -> io::Result<()> {
    for (run, i) in batch.runs.iter().zip(1..) {
        writeln!(w, "{i}, {:.6}", run.millis())?;
    }
    writeln!(w, "total, {:.6}", batch.total_millis())
}

pub fn write_steps(w: &mut impl Write, batch: &Batch) -> io::Result<()> {
    for run in &batch.runs {
        match run.solution.steps() {
            Some(steps) => writeln!(w, "{steps} steps")?,
            None => writeln!(w, "no solution")?,
        }
    }
    Ok(())
}
