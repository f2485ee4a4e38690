use serde::{Deserialize, Serialize};

use crate::tile_core::{Coord, TileGrid};

/// The tile path traced during one gesture: an ordered, duplicate-free list
/// of connected cells plus the running result of folding each tile's
/// operator left to right from an accumulator of zero.
///
/// Path and sum live and die together; `reset` restores the empty state,
/// which is distinct from a path whose sum happens to be zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathTracker {
    path: Vec<Coord>,
    sum: i64,
}

impl PathTracker {
    /// Tries to append a cell to the path.
    ///
    /// Rejects unresolvable coordinates and duplicates outright. The first
    /// member is accepted unconditionally; the caller is responsible for
    /// refusing a first member whose tile is not an adder. Every later
    /// member must be 4-adjacent to some member already in the path, not
    /// necessarily the last one.
    pub fn try_extend(&mut self, coords: Option<Coord>, grid: &TileGrid) -> bool {
        let Some(coord) = coords else {
            return false;
        };
        if self.contains(coord) {
            return false;
        }
        if !self.path.is_empty() && !self.path.iter().any(|&member| member.is_adjacent(coord)) {
            return false;
        }
        let Some(tile) = grid.tile(coord) else {
            return false;
        };

        self.sum = tile.apply_op(self.sum);
        self.path.push(coord);
        true
    }

    pub fn reset(&mut self) {
        self.path.clear();
        self.sum = 0;
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.path.contains(&coord)
    }

    pub fn coords(&self) -> &[Coord] {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn sum(&self) -> i64 {
        self.sum
    }

    /// `None` while no path is in progress, so the HUD can show "no sum"
    /// instead of a misleading zero.
    pub fn display_sum(&self) -> Option<i64> {
        if self.path.is_empty() {
            None
        } else {
            Some(self.sum)
        }
    }
}
