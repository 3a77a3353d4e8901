use itertools::Itertools;
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::Position;

/// Grids larger than this per dimension skip cycle generation entirely; the
/// follower then degrades to survival-style move selection.
pub const MAX_CYCLE_DIM: i32 = 20;

/// A boustrophedon tour of the grid: row 0 left-to-right, row 1 right-to-left,
/// alternating, so every cell appears exactly once. The wrap-around step from
/// the last cell back to the first is only a legal move on some grid shapes;
/// generation validates that and the follower refuses to emit a non-unit step.
pub struct HamiltonianCycle {
    cells: Vec<Position>,
    index_of: FxHashMap<Position, usize>,
}

impl HamiltonianCycle {
    pub fn generate(width: i32, height: i32) -> Self {
        if width <= 0 || height <= 0 || width > MAX_CYCLE_DIM || height > MAX_CYCLE_DIM {
            return Self {
                cells: Vec::new(),
                index_of: FxHashMap::default(),
            };
        }

        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            if y % 2 == 0 {
                for x in 0..width {
                    cells.push(Position::new(x, y));
                }
            } else {
                for x in (0..width).rev() {
                    cells.push(Position::new(x, y));
                }
            }
        }

        let index_of = cells
            .iter()
            .enumerate()
            .map(|(index, pos)| (*pos, index))
            .collect();

        let cycle = Self { cells, index_of };
        if !cycle.closes_cleanly() {
            warn!(
                width,
                height, "boustrophedon tour does not close at the wrap-around edge"
            );
        }
        cycle
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    /// Every consecutive pair, including last-to-first, is one unit step.
    pub fn closes_cleanly(&self) -> bool {
        if self.cells.len() < 2 {
            return false;
        }
        let consecutive_ok = self
            .cells
            .iter()
            .tuple_windows()
            .all(|(a, b)| a.dist_from(b) == 1);
        let wrap_ok = match (self.cells.last(), self.cells.first()) {
            (Some(last), Some(first)) => last.dist_from(first) == 1,
            _ => false,
        };
        consecutive_ok && wrap_ok
    }

    /// Direction from `head` toward the next cell on the tour. `None` when
    /// the head is off-cycle (e.g. just spawned) or when the next step is the
    /// non-adjacent wrap-around edge; the caller falls back to pathfinding.
    pub fn step_from(&self, head: &Position) -> Option<Position> {
        let index = *self.index_of.get(head)?;
        let next = self.cells[(index + 1) % self.cells.len()];
        head.direction_to(&next)
    }
}
