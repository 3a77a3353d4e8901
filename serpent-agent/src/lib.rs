use serde::{Deserialize, Serialize};

pub mod a_star;
pub mod agent;
pub mod flood_fill;
pub mod hamiltonian;

pub use agent::{Agent, AgentMetrics, Difficulty, Strategy};

/// Integer grid coordinate. Doubles as a displacement, so the four unit
/// values of `DIRECTIONS` are also `Position`s.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

pub const RIGHT: Position = Position { x: 1, y: 0 };
pub const LEFT: Position = Position { x: -1, y: 0 };
pub const DOWN: Position = Position { x: 0, y: 1 };
pub const UP: Position = Position { x: 0, y: -1 };

/// Fixed enumeration order used by every fallback scan.
pub const DIRECTIONS: [Position; 4] = [RIGHT, LEFT, DOWN, UP];

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn add(&self, other: &Position) -> Position {
        Position {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    pub fn dist_from(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// The unit step that takes `self` to `other`, if they are 4-adjacent.
    pub fn direction_to(&self, other: &Position) -> Option<Position> {
        let dir = Position {
            x: other.x - self.x,
            y: other.y - self.y,
        };
        (dir.x.abs() + dir.y.abs() == 1).then_some(dir)
    }

    pub fn is_unit_direction(&self) -> bool {
        self.x.abs() + self.y.abs() == 1
    }
}

/// One competitor's body as seen in a snapshot. `head` duplicates `body[0]`;
/// `body` is ordered head-first, tail-last.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SnakeState {
    pub head: Position,
    pub body: Vec<Position>,
    pub direction: Position,
    pub length: usize,
}

impl SnakeState {
    pub fn tail(&self) -> Option<&Position> {
        self.body.last()
    }
}

/// A single tick's read-only view of the world. Built fresh by the host loop
/// every tick; the agent core never mutates it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub food: Position,
    pub grid_width: i32,
    pub grid_height: i32,
    pub obstacles: Vec<Position>,
    pub snakes: Vec<SnakeState>,
}

impl GameState {
    pub fn total_cells(&self) -> usize {
        (self.grid_width * self.grid_height) as usize
    }

    pub fn in_bounds(&self, pos: &Position) -> bool {
        pos.x >= 0 && pos.x < self.grid_width && pos.y >= 0 && pos.y < self.grid_height
    }

    /// Occupancy oracle. A cell is blocked when it is out of bounds, an
    /// obstacle, or any snake's body segment. The self-snake's tail is the
    /// one exception: it vacates on the same tick the head would arrive, so
    /// treating it as solid would show false dead-ends behind the tail.
    pub fn is_occupied(&self, pos: &Position, self_snake: &SnakeState) -> bool {
        if !self.in_bounds(pos) {
            return true;
        }
        if self.obstacles.contains(pos) {
            return true;
        }

        self.snakes.iter().any(|snake| {
            let segments = if snake == self_snake && !snake.body.is_empty() {
                &snake.body[..snake.body.len() - 1]
            } else {
                &snake.body[..]
            };
            segments.contains(pos)
        })
    }

    /// First non-occupied direction in the fixed enumeration order, or
    /// `RIGHT` when every neighbor is blocked. The all-blocked return is a
    /// known collision the caller accepts; a move must always be emitted.
    pub fn first_safe_direction(&self, self_snake: &SnakeState) -> Position {
        DIRECTIONS
            .iter()
            .copied()
            .find(|dir| !self.is_occupied(&self_snake.head.add(dir), self_snake))
            .unwrap_or(DIRECTIONS[0])
    }
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::*;
    use super::*;

    #[test]
    fn test_walls_are_occupied() {
        let you = snake(&[(0, 0)]);
        let state = open_grid(5, 5, vec![you.clone()]);

        assert!(state.is_occupied(&Position::new(-1, 0), &you));
        assert!(state.is_occupied(&Position::new(0, -1), &you));
        assert!(state.is_occupied(&Position::new(5, 0), &you));
        assert!(state.is_occupied(&Position::new(0, 5), &you));
        assert!(!state.is_occupied(&Position::new(4, 4), &you));
    }

    #[test]
    fn test_own_tail_is_not_occupied() {
        let you = snake(&[(2, 2), (2, 3), (2, 4)]);
        let state = open_grid(10, 10, vec![you.clone()]);

        assert!(state.is_occupied(&Position::new(2, 2), &you));
        assert!(state.is_occupied(&Position::new(2, 3), &you));
        assert!(!state.is_occupied(&Position::new(2, 4), &you));
    }

    #[test]
    fn test_other_snake_tail_is_occupied() {
        let you = snake(&[(0, 0)]);
        let other = snake(&[(5, 5), (5, 6), (5, 7)]);
        let state = open_grid(10, 10, vec![you.clone(), other]);

        assert!(state.is_occupied(&Position::new(5, 5), &you));
        assert!(state.is_occupied(&Position::new(5, 7), &you));
    }

    #[test]
    fn test_obstacles_are_occupied() {
        let you = snake(&[(0, 0)]);
        let mut state = open_grid(10, 10, vec![you.clone()]);
        state.obstacles.push(Position::new(3, 3));

        assert!(state.is_occupied(&Position::new(3, 3), &you));
    }

    #[test]
    fn test_first_safe_direction_order() {
        let you = snake(&[(1, 1)]);
        let state = open_grid(3, 3, vec![you.clone()]);
        assert_eq!(state.first_safe_direction(&you), RIGHT);

        // Box the head in on the right; the scan falls through to LEFT.
        let mut state = state;
        state.obstacles.push(Position::new(2, 1));
        assert_eq!(state.first_safe_direction(&you), LEFT);
    }

    #[test]
    fn test_first_safe_direction_all_blocked() {
        // Head cornered at (0,0) with both in-bounds exits filled by
        // obstacles. No legal move exists, so the scan gives up and returns
        // the first enumerated direction.
        let you = snake(&[(0, 0)]);
        let mut state = open_grid(2, 2, vec![you.clone()]);
        state.obstacles.push(Position::new(1, 0));
        state.obstacles.push(Position::new(0, 1));

        assert_eq!(state.first_safe_direction(&you), RIGHT);
    }
}
