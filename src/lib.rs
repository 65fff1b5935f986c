use std::ops::Index;

use anyhow::{ensure, Result};
use arrayvec::ArrayVec;

pub mod batch;
pub mod fingerprint;
mod fmt;
pub mod parse;
pub mod report;
pub mod solve;

pub type Tile = u8;

/// Largest board whose tiles still fit in a [`Tile`].
pub const MAX_TILES: usize = Tile::MAX as usize + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn of_index(idx: usize, dim: usize) -> Self {
        Self {
            row: idx / dim,
            col: idx % dim,
        }
    }

    pub fn to_index(self, dim: usize) -> usize {
        self.row * dim + self.col
    }

    pub fn in_bounds(self, dim: usize) -> bool {
        self.row < dim && self.col < dim
    }

    /// The neighbouring position in direction `mv`, if it is still on the board.
    pub fn offset(self, mv: Move, dim: usize) -> Option<Self> {
        let (dr, dc) = mv.delta()?;
        let pos = Self {
            row: self.row.checked_add_signed(dr)?,
            col: self.col.checked_add_signed(dc)?,
        };
        pos.in_bounds(dim).then_some(pos)
    }

    pub fn manhattan(self, other: Self) -> u32 {
        (self.row.abs_diff(other.row) + self.col.abs_diff(other.col)) as u32
    }
}

/// A move of the blank tile. `Start` tags the root of a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Move {
    Start,
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// Real moves, in expansion order.
    pub const SLIDES: [Self; 4] = [Self::Right, Self::Down, Self::Left, Self::Up];

    fn delta(self) -> Option<(isize, isize)> {
        Some(match self {
            Move::Start => return None,
            Move::Up => (-1, 0),
            Move::Down => (1, 0),
            Move::Left => (0, -1),
            Move::Right => (0, 1),
        })
    }

    pub fn reversed(self) -> Self {
        match self {
            Move::Start => Move::Start,
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }

    pub fn from_char(ch: char) -> Option<Self> {
        Some(match ch {
            'S' => Move::Start,
            'U' => Move::Up,
            'D' => Move::Down,
            'L' => Move::Left,
            'R' => Move::Right,
            _ => return None,
        })
    }

    pub fn as_char(self) -> char {
        match self {
            Move::Start => 'S',
            Move::Up => 'U',
            Move::Down => 'D',
            Move::Left => 'L',
            Move::Right => 'R',
        }
    }
}

/// Where the blank sits in the solved state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Goal {
    /// `0, 1, .., L-1`
    #[default]
    BlankFirst,
    /// `1, .., L-1, 0`
    BlankLast,
}

impl Goal {
    pub fn index_of(self, tile: Tile, len: usize) -> usize {
        match self {
            Goal::BlankFirst => tile as usize,
            Goal::BlankLast if tile == 0 => len - 1,
            Goal::BlankLast => tile as usize - 1,
        }
    }

    pub fn tiles(self, len: usize) -> impl Iterator<Item = Tile> {
        (0..len).map(move |idx| match self {
            Goal::BlankFirst => idx as Tile,
            Goal::BlankLast => ((idx + 1) % len) as Tile,
        })
    }

    pub fn puzzle(self, dim: usize) -> Puzzle {
        let len = dim * dim;
        Puzzle {
            dim,
            tiles: self.tiles(len).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Puzzle {
    dim: usize,
    tiles: Box<[Tile]>,
}

impl Index<Position> for Puzzle {
    type Output = Tile;
    fn index(&self, pos: Position) -> &Self::Output {
        &self.tiles[pos.to_index(self.dim)]
    }
}

impl Puzzle {
    /// Builds a puzzle from a flat tile sequence.
    ///
    /// The length must be a non-zero perfect square and the tiles a permutation
    /// of `0..len`. Solvability is not checked.
    pub fn new(tiles: impl Into<Box<[Tile]>>) -> Result<Self> {
        let tiles = tiles.into();
        let len = tiles.len();
        ensure!(len != 0, "Empty puzzle");
        ensure!(
            len <= MAX_TILES,
            "A puzzle must have no more than {MAX_TILES} tiles, got {len}"
        );
        let dim = (1..=len).take_while(|d| d * d <= len).last().unwrap_or(1);
        ensure!(
            dim * dim == len,
            "Board size must be a perfect square, {len} is not"
        );
        // In range and distinct, hence a permutation with exactly one blank.
        let mut seen = [false; MAX_TILES];
        for &tile in tiles.iter() {
            let idx = tile as usize;
            ensure!(
                idx < len,
                "Tile {tile} out of range for a puzzle of {len} tiles"
            );
            ensure!(!seen[idx], "Duplicate tile {tile}");
            seen[idx] = true;
        }
        Ok(Self { dim, tiles })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> + '_ {
        self.tiles.chunks(self.dim)
    }

    pub fn is_goal(&self, goal: Goal) -> bool {
        self.tiles.iter().copied().eq(goal.tiles(self.len()))
    }

    pub fn locate_blank(&self) -> Position {
        let idx = self
            .tiles
            .iter()
            .position(|&t| t == 0)
            .unwrap_or_else(|| panic!("Puzzle contains no blank tile: {:?}", self.tiles));
        Position::of_index(idx, self.dim)
    }

    /// Sum of the Manhattan distances of every numbered tile to its goal cell.
    pub fn heuristic(&self, goal: Goal) -> u32 {
        let len = self.len();
        self.tiles
            .iter()
            .enumerate()
            .filter(|&(_, &tile)| tile != 0)
            .map(|(idx, &tile)| {
                let cur = Position::of_index(idx, self.dim);
                let target = Position::of_index(goal.index_of(tile, len), self.dim);
                cur.manhattan(target)
            })
            .sum()
    }

    /// Slides the blank one cell towards `mv`.
    pub fn slide(&self, mv: Move) -> Option<Self> {
        let blank = self.locate_blank();
        self.slide_from(blank, mv)
    }

    fn slide_from(&self, blank: Position, mv: Move) -> Option<Self> {
        let target = blank.offset(mv, self.dim)?;
        let mut tiles = self.tiles.clone();
        tiles.swap(blank.to_index(self.dim), target.to_index(self.dim));
        Some(Self {
            dim: self.dim,
            tiles,
        })
    }

    pub fn neighbors(&self) -> ArrayVec<(Move, Self), 4> {
        let blank = self.locate_blank();
        Move::SLIDES
            .into_iter()
            .filter_map(|mv| Some((mv, self.slide_from(blank, mv)?)))
            .collect()
    }
}
