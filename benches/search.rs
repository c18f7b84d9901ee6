use bevy_math::uvec2;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use grid_astar::{AStar, Movement, COST_BLOCKED};
use pprof::criterion::{Output, PProfProfiler};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(50);

    let size = 1024u32;
    let mut rng = StdRng::seed_from_u64(7);
    let mut walls: Vec<bool> = (0..size * size).map(|_| rng.gen_bool(0.2)).collect();

    let start = uvec2(1, 1);
    let goal = uvec2(size - 2, size - 2);
    walls[(start.y * size + start.x) as usize] = false;
    walls[(goal.y * size + goal.x) as usize] = false;

    let mut astar = AStar::new(size, size);
    astar.set_movement(Movement::EightWay);
    astar.init_grid(uvec2(0, 0), move |x, y| {
        if walls[(y * size + x) as usize] {
            COST_BLOCKED
        } else {
            1
        }
    });

    group.bench_function("run_1024x", |b| {
        b.iter(|| {
            let status = astar.run(black_box(start), black_box(goal));
            black_box(status);
        });
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = criterion_benchmark
}
criterion_main!(benches);
