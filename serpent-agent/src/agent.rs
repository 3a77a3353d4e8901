use std::time::Instant;

use rand::Rng;
use serde::Serialize;
use tinyvec::TinyVec;
use tracing::debug;

use crate::a_star::{self, PathCache};
use crate::flood_fill;
use crate::hamiltonian::HamiltonianCycle;
use crate::{GameState, Position, SnakeState, DIRECTIONS, DOWN};

/// Reachable-space ratio below which defensive play engages.
const SURVIVAL_SPACE_RATIO: f64 = 0.30;
/// Body-length share of the board above which defensive play engages.
const SURVIVAL_LENGTH_RATIO: f64 = 0.50;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
    Impossible,
}

impl Difficulty {
    pub fn base_strategy(&self) -> Strategy {
        match self {
            Difficulty::Easy => Strategy::Simple,
            Difficulty::Medium | Difficulty::Hard | Difficulty::Expert => Strategy::AStar,
            Difficulty::Impossible => Strategy::Hamiltonian,
        }
    }

    /// Chance that a snake of this difficulty plays the precomputed cycle
    /// instead of its base strategy. Rolled once per `set_difficulty`, never
    /// per tick.
    pub fn hamiltonian_probability(&self) -> f64 {
        match self {
            Difficulty::Easy | Difficulty::Medium => 0.0,
            Difficulty::Hard => 0.3,
            Difficulty::Expert => 0.7,
            Difficulty::Impossible => 1.0,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Simple,
    AStar,
    Survival,
    Hamiltonian,
}

/// Diagnostics snapshot. Non-authoritative; nothing in the decision path
/// reads it back.
#[derive(Serialize, Debug, Clone, Copy)]
pub struct AgentMetrics {
    pub difficulty: Difficulty,
    pub strategy: Strategy,
    pub last_decision_time_ms: f64,
    pub last_path_length: usize,
    pub use_hamiltonian: bool,
    pub survival_mode: bool,
    pub paths_computed: u64,
}

/// One AI competitor. Owns the only mutable cross-tick state in the core:
/// the path cache and the diagnostics bookkeeping. The Hamiltonian cycle is
/// precomputed at construction and immutable afterwards.
pub struct Agent {
    player_id: usize,
    grid_width: i32,
    grid_height: i32,
    difficulty: Difficulty,
    strategy: Strategy,
    use_hamiltonian: bool,
    cycle: HamiltonianCycle,
    path_cache: PathCache,
    last_decision_time_ms: f64,
    last_path_length: usize,
    survival_mode: bool,
    paths_computed: u64,
}

impl Agent {
    pub fn new(player_id: usize, grid_width: i32, grid_height: i32) -> Self {
        Agent {
            player_id,
            grid_width,
            grid_height,
            difficulty: Difficulty::Medium,
            strategy: Difficulty::Medium.base_strategy(),
            use_hamiltonian: false,
            cycle: HamiltonianCycle::generate(grid_width, grid_height),
            path_cache: PathCache::new(),
            last_decision_time_ms: 0.0,
            last_path_length: 0,
            survival_mode: false,
            paths_computed: 0,
        }
    }

    /// Re-derives the base strategy and re-rolls the Hamiltonian flag. The
    /// flag is configuration state from here on; `next_move` never rolls.
    pub fn set_difficulty(&mut self, difficulty: Difficulty, rng: &mut impl Rng) {
        self.difficulty = difficulty;
        self.strategy = difficulty.base_strategy();
        self.use_hamiltonian = rng.gen_bool(difficulty.hamiltonian_probability());
    }

    /// Explicit strategy override, independent of difficulty.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
    }

    pub fn player_id(&self) -> usize {
        self.player_id
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn metrics(&self) -> AgentMetrics {
        AgentMetrics {
            difficulty: self.difficulty,
            strategy: self.strategy,
            last_decision_time_ms: self.last_decision_time_ms,
            last_path_length: self.last_path_length,
            use_hamiltonian: self.use_hamiltonian,
            survival_mode: self.survival_mode,
            paths_computed: self.paths_computed,
        }
    }

    /// Between-match reset: drops the path cache and transient flags. The
    /// precomputed cycle and the configured difficulty persist.
    pub fn reset(&mut self) {
        self.path_cache.clear();
        self.survival_mode = false;
        self.last_decision_time_ms = 0.0;
        self.last_path_length = 0;
    }

    /// The single per-tick contract: always returns one of the four unit
    /// directions, even when every neighbor is blocked.
    pub fn next_move(&mut self, state: &GameState) -> Position {
        let started = Instant::now();
        let direction = self.decide(state);
        self.last_decision_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        debug!(
            player_id = self.player_id,
            strategy = ?self.strategy,
            survival_mode = self.survival_mode,
            decision_ms = self.last_decision_time_ms,
            "decided move"
        );

        direction
    }

    fn decide(&mut self, state: &GameState) -> Position {
        let me = match state.snakes.get(self.player_id) {
            Some(me) => me,
            None => return DOWN,
        };

        // Grid dimensions are fixed for the match at construction time.
        let total_cells = (self.grid_width * self.grid_height) as usize;
        let reachable = flood_fill::count_reachable(&me.head, me, state);
        let space_ratio = reachable as f64 / total_cells as f64;
        let length_ratio = me.length as f64 / total_cells as f64;
        self.survival_mode =
            space_ratio < SURVIVAL_SPACE_RATIO || length_ratio > SURVIVAL_LENGTH_RATIO;

        if self.survival_mode {
            return self.survival_move(me, state);
        }
        if self.use_hamiltonian {
            return self.cycle_move(me, state);
        }

        match self.strategy {
            Strategy::Simple => self.simple_move(me, state),
            Strategy::AStar => self.astar_move(me, state),
            Strategy::Survival => self.survival_move(me, state),
            Strategy::Hamiltonian => self.cycle_move(me, state),
        }
    }

    /// Greedy chase: step along the food axis with the larger remaining
    /// distance, then the other axis, then any safe direction.
    fn simple_move(&self, me: &SnakeState, state: &GameState) -> Position {
        let dx = state.food.x - me.head.x;
        let dy = state.food.y - me.head.y;

        let x_step = (dx != 0).then(|| Position::new(dx.signum(), 0));
        let y_step = (dy != 0).then(|| Position::new(0, dy.signum()));
        let ordered = if dx.abs() >= dy.abs() {
            [x_step, y_step]
        } else {
            [y_step, x_step]
        };

        for dir in ordered.into_iter().flatten() {
            if !state.is_occupied(&me.head.add(&dir), me) {
                return dir;
            }
        }

        state.first_safe_direction(me)
    }

    fn astar_move(&mut self, me: &SnakeState, state: &GameState) -> Position {
        let path = match self.path_cache.lookup(&me.head, &state.food) {
            Some(cached) => cached.to_vec(),
            None => {
                let path = a_star::find_path(&me.head, &state.food, me, state);
                self.paths_computed += 1;
                self.path_cache.insert(&me.head, &state.food, path.clone());
                path
            }
        };
        self.last_path_length = path.len();

        if path.len() >= 2 {
            if let Some(dir) = me.head.direction_to(&path[1]) {
                return dir;
            }
        }

        state.first_safe_direction(me)
    }

    /// Defensive play: among safe neighbors, take the one with the most
    /// reachable space behind it. Ties keep the earliest direction in the
    /// fixed enumeration order.
    fn survival_move(&self, me: &SnakeState, state: &GameState) -> Position {
        let safe: TinyVec<[Position; 4]> = DIRECTIONS
            .iter()
            .copied()
            .filter(|dir| !state.is_occupied(&me.head.add(dir), me))
            .collect();

        let mut best: Option<(Position, usize)> = None;
        for dir in safe {
            let space = flood_fill::count_reachable(&me.head.add(&dir), me, state);
            if best.map_or(true, |(_, best_space)| space > best_space) {
                best = Some((dir, space));
            }
        }

        best.map(|(dir, _)| dir).unwrap_or(DIRECTIONS[0])
    }

    fn cycle_move(&mut self, me: &SnakeState, state: &GameState) -> Position {
        if self.cycle.is_empty() {
            // Oversized grid: no cycle was generated.
            return self.survival_move(me, state);
        }

        if let Some(dir) = self.cycle.step_from(&me.head) {
            if !state.is_occupied(&me.head.add(&dir), me) {
                return dir;
            }
        }

        // Off-cycle, or the tour's next cell is blocked: chase food to
        // rejoin the tour.
        self.astar_move(me, state)
    }
}
