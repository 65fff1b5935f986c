use crate::{Puzzle, Tile};

/// Boards up to this many tiles pack into a `u64` at 4 bits per tile.
pub const PACKED_MAX_TILES: usize = 16;

/// Compact key of a board, used by the visited set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    Packed(u64),
    Bytes(Box<[Tile]>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintKind {
    Packed,
    Bytes,
}

impl FingerprintKind {
    pub fn for_len(len: usize) -> Self {
        if len <= PACKED_MAX_TILES {
            Self::Packed
        } else {
            Self::Bytes
        }
    }

    pub fn of(self, puzzle: &Puzzle) -> Fingerprint {
        match self {
            Self::Packed => Fingerprint::Packed(
                puzzle
                    .tiles()
                    .iter()
                    .zip(0..)
                    .fold(0, |acc, (&tile, i)| acc | (u64::from(tile) << (i * 4))),
            ),
            Self::Bytes => Fingerprint::Bytes(puzzle.tiles().into()),
        }
    }
}
