use std::str::FromStr;

use anyhow::{Context, Result};

use crate::{Puzzle, Tile};

impl FromStr for Puzzle {
    type Err = anyhow::Error;

    /// Parses a single board: whitespace separated tiles, row breaks ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tiles = s
            .split_whitespace()
            .map(|tok| {
                tok.parse::<Tile>()
                    .with_context(|| format!("Invalid tile: {tok:?}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Puzzle::new(tiles)
    }
}

/// Parses every board of an input file. Boards are separated by blank lines.
pub fn puzzles(s: &str) -> Result<Vec<Puzzle>> {
    let mut puzzles = Vec::new();
    let mut block = String::new();
    let mut block_start = 0;

    let mut flush = |block: &mut String, line: usize| -> Result<()> {
        if !block.is_empty() {
            let puzzle = block.parse::<Puzzle>().with_context(|| {
                format!("Invalid puzzle {} starting at line {line}", puzzles.len() + 1)
            })?;
            puzzles.push(puzzle);
            block.clear();
        }
        Ok(())
    };

    for (line, i) in s.lines().zip(1..) {
        let line = line.trim();
        if line.is_empty() {
            flush(&mut block, block_start)?;
            continue;
        }
        if block.is_empty() {
            block_start = i;
        }
        block.push_str(line);
        block.push('\n');
    }
    flush(&mut block, block_start)?;

    Ok(puzzles)
}
