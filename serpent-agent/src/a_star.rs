use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::{GameState, Position, SnakeState, DIRECTIONS};

const NEIGHBOR_DISTANCE: i32 = 1;

/// Hard ceiling on node expansions, so a search on a cluttered board cannot
/// stall the tick loop. Generous relative to any grid the cycle generator
/// accepts.
const EXPANSION_CAP: usize = 512;

/// How long a cached path stays valid. Within this window a cached entry is
/// served even if obstacles or other snakes have moved; food moves rarely
/// relative to the tick rate, so the staleness is bounded and accepted.
pub const CACHE_VALIDITY: Duration = Duration::from_millis(500);

#[derive(Copy, Clone, Eq, PartialEq)]
struct Node {
    cost: i32,
    position: Position,
}

// The priority queue depends on `Ord`. Explicitly implement the trait so the
// queue becomes a min-heap instead of a max-heap, and break cost ties on
// coordinates so the expansion order is deterministic.
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| self.position.x.cmp(&other.position.x))
            .then_with(|| self.position.y.cmp(&other.position.y))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* over the 4-connected grid. Returns the full path from `start` to
/// `goal` inclusive, or an empty vector when the goal is unreachable.
/// Neighbors are admitted through the occupancy oracle; the Manhattan
/// heuristic is admissible and consistent here, so the first pop of the goal
/// is optimal.
pub fn find_path(
    start: &Position,
    goal: &Position,
    self_snake: &SnakeState,
    state: &GameState,
) -> Vec<Position> {
    let mut to_search: BinaryHeap<Node> = BinaryHeap::new();
    let mut known_score: FxHashMap<Position, i32> = FxHashMap::default();
    let mut came_from: FxHashMap<Position, Position> = FxHashMap::default();

    known_score.insert(*start, 0);
    to_search.push(Node {
        cost: start.dist_from(goal),
        position: *start,
    });

    let mut expanded = 0;

    while let Some(Node { position, .. }) = to_search.pop() {
        if position == *goal {
            return reconstruct(&came_from, position);
        }

        expanded += 1;
        if expanded > EXPANSION_CAP {
            break;
        }

        let tentative = known_score.get(&position).unwrap_or(&i32::MAX) + NEIGHBOR_DISTANCE;

        for dir in DIRECTIONS {
            let neighbor = position.add(&dir);
            if state.is_occupied(&neighbor, self_snake) {
                continue;
            }
            if &tentative < known_score.get(&neighbor).unwrap_or(&i32::MAX) {
                known_score.insert(neighbor, tentative);
                came_from.insert(neighbor, position);
                to_search.push(Node {
                    cost: tentative + neighbor.dist_from(goal),
                    position: neighbor,
                });
            }
        }
    }

    Vec::new()
}

fn reconstruct(came_from: &FxHashMap<Position, Position>, goal: Position) -> Vec<Position> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(previous) = came_from.get(&current) {
        path.push(*previous);
        current = *previous;
    }
    path.reverse();
    path
}

/// Most recently computed path per `(head, food)` pair, reused while younger
/// than `CACHE_VALIDITY`. Invalidation is purely time-based; board changes
/// inside the window are deliberately ignored.
#[derive(Default)]
pub struct PathCache {
    entries: FxHashMap<(i32, i32, i32, i32), CachedPath>,
}

struct CachedPath {
    path: Vec<Position>,
    computed_at: Instant,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&mut self, head: &Position, food: &Position) -> Option<&[Position]> {
        let key = (head.x, head.y, food.x, food.y);
        let fresh = self
            .entries
            .get(&key)
            .map_or(false, |cached| cached.computed_at.elapsed() < CACHE_VALIDITY);
        if !fresh {
            self.entries.remove(&key);
            return None;
        }
        self.entries.get(&key).map(|cached| cached.path.as_slice())
    }

    pub fn insert(&mut self, head: &Position, food: &Position, path: Vec<Position>) {
        self.entries.insert(
            (head.x, head.y, food.x, food.y),
            CachedPath {
                path,
                computed_at: Instant::now(),
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::*;

    #[test]
    fn test_open_grid_path_is_manhattan_length() {
        let you = snake(&[(1, 1)]);
        let state = open_grid(11, 11, vec![you.clone()]);

        let start = Position::new(1, 1);
        let goal = Position::new(5, 4);
        let path = find_path(&start, &goal, &you, &state);

        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert_eq!(path.len() as i32 - 1, start.dist_from(&goal));
    }

    #[test]
    fn test_corridor_obstruction_forces_detour() {
        let you = snake(&[(5, 5)]);
        let mut state = open_grid(10, 10, vec![you.clone()]);
        // A short wall directly between head and goal.
        state.obstacles.push(Position::new(5, 3));
        state.obstacles.push(Position::new(5, 4));

        let start = Position::new(5, 5);
        let goal = Position::new(5, 2);
        let path = find_path(&start, &goal, &you, &state);

        // Straight line is 3; the detour around a 1-wide, 2-tall wall is 5.
        assert_eq!(path.len() as i32 - 1, 5);
    }

    #[test]
    fn test_unreachable_goal_returns_empty_path() {
        let you = snake(&[(0, 0)]);
        let mut state = open_grid(10, 10, vec![you.clone()]);
        // Seal the goal inside four obstacles.
        state.obstacles.push(Position::new(5, 4));
        state.obstacles.push(Position::new(5, 6));
        state.obstacles.push(Position::new(4, 5));
        state.obstacles.push(Position::new(6, 5));

        let path = find_path(&Position::new(0, 0), &Position::new(5, 5), &you, &state);
        assert!(path.is_empty());
    }

    #[test]
    fn test_path_avoids_snake_bodies() {
        let you = snake(&[(0, 1)]);
        let other = snake(&[(2, 0), (2, 1), (2, 2), (2, 3)]);
        let state = open_grid(6, 6, vec![you.clone(), other]);

        let path = find_path(&Position::new(0, 1), &Position::new(4, 1), &you, &state);

        assert!(!path.is_empty());
        // (2,3) is the other snake's tail; the tail exception only applies
        // to the searching snake's own tail.
        for segment in &[(2, 0), (2, 1), (2, 2), (2, 3)] {
            let blocked = Position::new(segment.0, segment.1);
            assert!(!path.contains(&blocked));
        }
    }

    #[test]
    fn test_cache_serves_then_clears() {
        let mut cache = PathCache::new();
        let head = Position::new(1, 1);
        let food = Position::new(4, 4);
        let path = vec![head, Position::new(2, 1)];

        cache.insert(&head, &food, path.clone());
        assert_eq!(cache.lookup(&head, &food), Some(path.as_slice()));

        cache.clear();
        assert_eq!(cache.lookup(&head, &food), None);
    }

    #[test]
    fn test_cache_is_keyed_by_both_endpoints() {
        let mut cache = PathCache::new();
        let head = Position::new(1, 1);
        let food = Position::new(4, 4);
        cache.insert(&head, &food, vec![head]);

        assert!(cache.lookup(&head, &Position::new(4, 5)).is_none());
        assert!(cache.lookup(&Position::new(1, 2), &food).is_none());
    }
}
