use clap::{Parser, ValueEnum};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use itertools::Itertools;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use serpent_agent::{Agent, Difficulty, GameState, Position, SnakeState, RIGHT};

/// Headless exhibition matches between AI agents. This is the host side of
/// the tick loop: it owns movement resolution, food respawn, and collision
/// elimination, and feeds each agent the same immutable snapshot per tick.
#[derive(Parser, Debug)]
#[command(name = "arena")]
struct Args {
    #[arg(long, default_value_t = 12)]
    width: i32,

    #[arg(long, default_value_t = 12)]
    height: i32,

    /// Number of competing agents, placed on their own starting rows.
    #[arg(long, default_value_t = 2)]
    snakes: usize,

    #[arg(long, default_value_t = 500)]
    max_ticks: u32,

    /// RNG seed for food placement and difficulty rolls. Random when unset.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = DifficultyArg::Expert)]
    difficulty: DifficultyArg,

    /// Print the board every tick.
    #[arg(long)]
    render: bool,

    /// Dump each agent's metrics as JSON after the match.
    #[arg(long)]
    dump_metrics: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
    Expert,
    Impossible,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
            DifficultyArg::Expert => Difficulty::Expert,
            DifficultyArg::Impossible => Difficulty::Impossible,
        }
    }
}

struct Match {
    state: GameState,
    agents: Vec<Agent>,
    alive: Vec<bool>,
    rng: SmallRng,
}

impl Match {
    fn new(args: &Args, mut rng: SmallRng) -> Result<Self> {
        let row_spacing = args.height / (args.snakes as i32 + 1);
        if row_spacing == 0 || args.width < 5 {
            return Err(eyre!(
                "a {}x{} board cannot seat {} snakes",
                args.width,
                args.height,
                args.snakes
            ));
        }

        let snakes: Vec<SnakeState> = (0..args.snakes)
            .map(|i| {
                let y = row_spacing * (i as i32 + 1);
                let body = vec![
                    Position::new(3, y),
                    Position::new(2, y),
                    Position::new(1, y),
                ];
                SnakeState {
                    head: body[0],
                    length: body.len(),
                    direction: RIGHT,
                    body,
                }
            })
            .collect();

        let agents = (0..args.snakes)
            .map(|player_id| {
                let mut agent = Agent::new(player_id, args.width, args.height);
                agent.set_difficulty(args.difficulty.into(), &mut rng);
                agent
            })
            .collect();

        let mut state = GameState {
            food: Position::new(0, 0),
            grid_width: args.width,
            grid_height: args.height,
            obstacles: vec![],
            snakes,
        };
        let food = spawn_food(&state, &mut rng).ok_or_else(|| eyre!("no room for food"))?;
        state.food = food;

        Ok(Match {
            alive: vec![true; args.snakes],
            state,
            agents,
            rng,
        })
    }

    /// Advances one tick. Returns false once the match is decided.
    fn tick(&mut self) -> bool {
        let Match {
            agents,
            alive,
            state,
            ..
        } = self;
        let moves: Vec<Option<Position>> = agents
            .iter_mut()
            .map(|agent| alive[agent.player_id()].then(|| agent.next_move(state)))
            .collect();

        // Resolve movement against the snapshot the agents saw.
        let mut new_heads: Vec<Option<Position>> = vec![None; self.state.snakes.len()];
        let mut ate: Vec<bool> = vec![false; self.state.snakes.len()];

        for (player_id, dir) in moves.iter().enumerate() {
            let Some(dir) = dir else { continue };
            let head = self.state.snakes[player_id].head.add(dir);
            ate[player_id] = head == self.state.food;
            new_heads[player_id] = Some(head);
        }

        // Judge every collision against the same pre-move snapshot, then
        // apply the eliminations together.
        let mut eliminated: Vec<usize> = vec![];
        for player_id in 0..self.state.snakes.len() {
            let Some(head) = new_heads[player_id] else { continue };

            let hits_body = self.state.snakes.iter().enumerate().any(|(other, snake)| {
                let body = &snake.body;
                // A tail cell is only fatal when that snake grows this tick.
                let solid = if self.alive[other] && !ate[other] && !body.is_empty() {
                    &body[..body.len() - 1]
                } else {
                    &body[..]
                };
                solid.contains(&head)
            });
            let head_on = new_heads
                .iter()
                .enumerate()
                .any(|(other, other_head)| other != player_id && *other_head == Some(head));

            if !self.state.in_bounds(&head)
                || self.state.obstacles.contains(&head)
                || hits_body
                || head_on
            {
                eliminated.push(player_id);
            }
        }
        for player_id in eliminated {
            self.eliminate(player_id);
        }

        let mut food_eaten = false;
        for player_id in 0..self.state.snakes.len() {
            if !self.alive[player_id] {
                continue;
            }
            let Some(head) = new_heads[player_id] else { continue };

            let snake = &mut self.state.snakes[player_id];
            snake.direction = Position::new(head.x - snake.head.x, head.y - snake.head.y);
            snake.body.insert(0, head);
            snake.head = head;
            if ate[player_id] {
                food_eaten = true;
            } else {
                snake.body.pop();
            }
            snake.length = snake.body.len();
        }

        if food_eaten {
            match spawn_food(&self.state, &mut self.rng) {
                Some(food) => self.state.food = food,
                // Board is full; the remaining snakes have won the grid.
                None => return false,
            }
        }

        let alive_count = self.alive.iter().filter(|alive| **alive).count();
        // Solo exhibitions run until the snake dies; matches run until one
        // snake remains.
        if self.agents.len() == 1 {
            alive_count == 1
        } else {
            alive_count > 1
        }
    }

    fn eliminate(&mut self, player_id: usize) {
        self.alive[player_id] = false;
        self.state.snakes[player_id].body.clear();
        self.state.snakes[player_id].length = 0;
        info!(player_id, "snake eliminated");
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for y in 0..self.state.grid_height {
            for x in 0..self.state.grid_width {
                let pos = Position::new(x, y);
                let cell = if pos == self.state.food {
                    '*'
                } else if self.state.obstacles.contains(&pos) {
                    '#'
                } else if let Some((player_id, snake)) = self
                    .state
                    .snakes
                    .iter()
                    .find_position(|snake| snake.body.contains(&pos))
                {
                    if pos == snake.head {
                        char::from_digit(player_id as u32, 10).unwrap_or('?')
                    } else {
                        'o'
                    }
                } else {
                    '.'
                };
                out.push(cell);
            }
            out.push('\n');
        }
        out
    }
}

fn spawn_food(state: &GameState, rng: &mut SmallRng) -> Option<Position> {
    let open: Vec<Position> = (0..state.grid_width)
        .cartesian_product(0..state.grid_height)
        .map(|(x, y)| Position::new(x, y))
        .filter(|pos| {
            !state.obstacles.contains(pos)
                && !state.snakes.iter().any(|snake| snake.body.contains(pos))
        })
        .collect();
    if open.is_empty() {
        return None;
    }
    Some(open[rng.gen_range(0..open.len())])
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(seed, "starting match");

    let mut game = Match::new(&args, SmallRng::seed_from_u64(seed))?;

    let mut ticks = 0;
    while ticks < args.max_ticks {
        if args.render {
            println!("tick {ticks}\n{}", game.render());
        }
        if !game.tick() {
            break;
        }
        ticks += 1;
    }

    for (player_id, alive) in game.alive.iter().enumerate() {
        let length = game.state.snakes[player_id].length;
        let outcome = if *alive { "alive" } else { "eliminated" };
        println!("snake {player_id}: {outcome}, length {length}");
    }

    if args.dump_metrics {
        for agent in &game.agents {
            println!(
                "{}",
                serde_json::to_string_pretty(&agent.metrics())?
            );
        }
    }

    Ok(())
}
