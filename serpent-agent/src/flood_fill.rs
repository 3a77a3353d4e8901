use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::{GameState, Position, SnakeState, DIRECTIONS};

/// Hard ceiling on explored cells. The count is a safety proxy, not an exact
/// area measurement; the cap keeps one decision from stalling the tick loop.
pub const EXPLORATION_CAP: usize = 100;

/// Breadth-first flood fill over 4-connected neighbors, counting cells
/// reachable from `start`. The start cell itself is counted and is exempt
/// from the occupancy test, so callers can flood from the current head as
/// well as from a candidate next cell.
pub fn count_reachable(start: &Position, self_snake: &SnakeState, state: &GameState) -> usize {
    if !state.in_bounds(start) {
        return 0;
    }

    let mut visited: FxHashSet<Position> = FxHashSet::default();
    let mut to_search: VecDeque<Position> = VecDeque::new();

    visited.insert(*start);
    to_search.push_back(*start);

    let mut count = 0;

    while let Some(current) = to_search.pop_front() {
        count += 1;
        if count >= EXPLORATION_CAP {
            break;
        }

        for dir in DIRECTIONS {
            let neighbor = current.add(&dir);
            if visited.contains(&neighbor) || state.is_occupied(&neighbor, self_snake) {
                continue;
            }
            visited.insert(neighbor);
            to_search.push_back(neighbor);
        }
    }

    count
}
