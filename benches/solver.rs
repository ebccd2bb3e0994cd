use criterion::{Criterion, criterion_group, criterion_main};
use roteiro::{
    Geography, Solver,
    scenario::{Boat, Demand, Scenario},
    shared::Time,
};
use std::hint::black_box;

fn snapshot_scenario() -> Scenario {
    Scenario {
        crew_change: false,
        crew_change_m9: 0,
        boats: vec![
            Boat::new("1905", Time::from_minutes(390)),
            Boat::new("1870", Time::from_minutes(440)),
            Boat::new("1930", Time::from_minutes(450)),
        ],
        demands: vec![
            Demand::new("PCM-06", 0, 2, 0),
            Demand::new("PCM-05", 0, 3, 0),
            Demand::new("PDO-01", 2, 13, 0),
            Demand::new("PCM-03", 1, 10, 0),
            Demand::new("PCM-07", 0, 9, 0),
            Demand::new("PCM-04", 4, 5, 0),
            Demand::new("PCM-02", 0, 15, 0),
            Demand::new("PCB-01", 0, 3, 0),
            Demand::new("PCB-04", 1, 4, 0),
            Demand::new("TMIB", 6, 0, 0),
        ],
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let geo = Geography::sergipe();
    let scenario = snapshot_scenario();

    c.bench_function("solve_snapshot_day", |b| {
        b.iter(|| {
            let plan = Solver::new(&geo).solve(black_box(&scenario));
            black_box(plan)
        })
    });

    let small = Scenario {
        demands: scenario.demands[..4].to_vec(),
        ..scenario.clone()
    };
    c.bench_function("solve_small_board", |b| {
        b.iter(|| {
            let plan = Solver::new(&geo).solve(black_box(&small));
            black_box(plan)
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
