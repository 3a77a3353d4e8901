use criterion::{black_box, criterion_group, criterion_main, Criterion};

use serpent_agent::flood_fill::count_reachable;
use serpent_agent::{GameState, Position, SnakeState, RIGHT};

fn mid_game_board() -> (GameState, SnakeState) {
    let you_body: Vec<Position> = (0..12).map(|i| Position::new(5, 5 + i)).collect();
    let you = SnakeState {
        head: you_body[0],
        length: you_body.len(),
        direction: RIGHT,
        body: you_body,
    };
    let other_body: Vec<Position> = (0..8).map(|i| Position::new(14, 2 + i)).collect();
    let other = SnakeState {
        head: other_body[0],
        length: other_body.len(),
        direction: RIGHT,
        body: other_body,
    };
    let state = GameState {
        food: Position::new(2, 17),
        grid_width: 20,
        grid_height: 20,
        obstacles: (0..6).map(|x| Position::new(x, 10)).collect(),
        snakes: vec![you.clone(), other],
    };
    (state, you)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut g = c.benchmark_group("Flood Fill");

    g.bench_function("mid-game spread", |b| {
        let (state, you) = mid_game_board();

        b.iter(|| -> usize {
            let state = black_box(&state);
            count_reachable(&you.head, &you, state)
        })
    });

    g.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
