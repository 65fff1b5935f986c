use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use npuzzle_solver::batch::{self, Batch};
use npuzzle_solver::{parse, report, Goal};
use tracing::{info, Level};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Optimal N-puzzle solver (A* with Manhattan distance)")]
struct Cli {
    /// Input file; boards are separated by blank lines.
    input: PathBuf,

    #[arg(value_enum, default_value_t = ModeArg::Seq)]
    mode: ModeArg,

    /// Worker count for `par`, defaults to the available parallelism.
    #[arg(short, long)]
    threads: Option<NonZeroUsize>,

    #[arg(short, long, value_enum, default_value_t = GoalArg::BlankFirst)]
    goal: GoalArg,

    /// Write `index, ms` timing records here.
    #[arg(long)]
    bench: Option<PathBuf>,

    /// Write the solved step count of every puzzle here.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Only print the summary.
    #[arg(short, long, default_value_t = false)]
    quiet: bool,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Seq,
    Par,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GoalArg {
    BlankFirst,
    BlankLast,
}

impl From<GoalArg> for Goal {
    fn from(arg: GoalArg) -> Self {
        match arg {
            GoalArg::BlankFirst => Goal::BlankFirst,
            GoalArg::BlankLast => Goal::BlankLast,
        }
    }
}

/// Log sink that hides the progress bar while a line is written.
#[derive(Clone)]
struct ProgressLog(ProgressBar);

impl<'a> MakeWriter<'a> for ProgressLog {
    type Writer = Suspended<'a, io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        Suspended {
            pb: &self.0,
            inner: io::stderr(),
        }
    }
}

struct Suspended<'a, W> {
    pb: &'a ProgressBar,
    inner: W,
}

impl<W: Write> Write for Suspended<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let inner = &mut self.inner;
        self.pb.suspend(|| inner.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        let inner = &mut self.inner;
        self.pb.suspend(|| inner.flush())
    }
}

fn write_record(
    path: &Path,
    batch: &Batch,
    f: impl FnOnce(&mut BufWriter<File>, &Batch) -> std::io::Result<()>,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut w = BufWriter::new(file);
    f(&mut w, batch)
        .and_then(|()| w.flush())
        .with_context(|| format!("Failed to write output file {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Both draw on stderr, so logging goes through the bar.
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} puzzles")
            .context("Invalid progress template")?
            .progress_chars("##-"),
    );
    tracing_subscriber::fmt()
        .with_writer(ProgressLog(pb.clone()))
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    let data = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read input file {}", cli.input.display()))?;
    let puzzles = parse::puzzles(&data)
        .with_context(|| format!("Failed to parse input file {}", cli.input.display()))?;
    let mode = match cli.mode {
        ModeArg::Seq => batch::Mode::Sequential,
        ModeArg::Par => batch::Mode::Parallel {
            threads: cli.threads,
        },
    };
    info!(count = puzzles.len(), ?mode, "Running puzzle input(s)");

    pb.set_length(puzzles.len() as u64);
    let batch = batch::run(&puzzles, cli.goal.into(), mode, |_, _| pb.inc(1))?;
    pb.finish_and_clear();

    let mut term = Term::stdout();
    if !cli.quiet {
        for (i, run) in batch.runs.iter().enumerate() {
            report::write_solution(&mut term, i, run)?;
        }
    }
    term.write_line(&style("Timings").bold().to_string())?;
    report::write_summary(&mut term, &batch)?;

    if let Some(path) = &cli.bench {
        write_record(path, &batch, |w, batch| report::write_bench(w, batch))?;
        info!(path = %path.display(), "Wrote bench records");
    }
    if let Some(path) = &cli.out {
        write_record(path, &batch, |w, batch| report::write_steps(w, batch))?;
        info!(path = %path.display(), "Wrote step counts");
    }

    let unsolved = batch
        .runs
        .iter()
        .filter(|run| !run.solution.is_solved())
        .count();
    if unsolved != 0 {
        term.write_line(
            &style(format!("{unsolved}/{} puzzles have no solution", batch.runs.len()))
                .yellow()
                .to_string(),
        )?;
    }
    Ok(())
}
