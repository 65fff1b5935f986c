use std::path::Path;

use anyhow::{Context, Result};
use npuzzle_solver::{Goal, Move};

pub const SEPARATOR: &str = "================\n";
pub const TEST_DIR: &str = "tests";
pub const EXTENTION: &str = "txt";

#[allow(unused)]
pub fn parse_move(ch: char) -> Result<Move> {
    Move::from_char(ch).with_context(|| format!("Invalid action: {ch:?}"))
}

/// Optional `goal: blank-last` header line in front of a fixture.
#[allow(unused)]
pub fn split_goal(input: &str) -> Result<(Goal, &str)> {
    let Some(rest) = input.strip_prefix("goal:") else {
        return Ok((Goal::BlankFirst, input));
    };
    let (goal, rest) = rest.split_once('\n').context("Missing puzzle after goal")?;
    let goal = match goal.trim() {
        "blank-first" => Goal::BlankFirst,
        "blank-last" => Goal::BlankLast,
        goal => anyhow::bail!("Invalid goal: {goal:?}"),
    };
    Ok((goal, rest))
}

pub fn run_tests(subdir: &str, mut f: impl FnMut(&str) -> Result<String>) {
    let mut tests = std::fs::read_dir(Path::new(TEST_DIR).join(subdir))
        .unwrap()
        .filter_map(|ent| {
            let path = ent.unwrap().path();
            if path.extension().map_or(true, |ext| ext != EXTENTION) {
                return None;
            }
            let name = path.file_stem().unwrap().to_str().unwrap().to_owned();
            Some((name, path))
        })
        .collect::<Vec<_>>();
    tests.sort();

    let do_update_tests = std::env::var("UPDATE_EXPECT").map_or(false, |v| v == "1");

    let mut failed_cnt = 0;
    for (name, path) in &tests {
        eprint!("{subdir}/{name}: ");
        let content = std::fs::read_to_string(path).unwrap();
        match f(&content) {
            Ok(got) if got == content => eprintln!("\x1B[32mOK\x1B[0m"),
            Ok(got) if do_update_tests => {
                std::fs::write(path, got).unwrap();
                eprintln!("\x1B[33mUpdated\x1B[0m");
            }
            Ok(got) => {
                eprintln!("\x1B[31mFAILED\x1B[0m\n{got}");
                failed_cnt += 1;
            }
            Err(err) => {
                eprintln!("\x1B[31mFAILED\x1B[0m\n{:?}", err);
                failed_cnt += 1;
            }
        }
    }

    if failed_cnt != 0 {
        eprintln!("{failed_cnt}/{} tests failed", tests.len());
        std::process::exit(1);
    }
}
