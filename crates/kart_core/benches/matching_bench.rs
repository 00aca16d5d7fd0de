use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kart_core::{BipartiteGraph, ChampionshipSession, MatchingEngine, SessionConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn dense_graph(pilots: u32, cars: u32) -> BipartiteGraph<'static> {
    BipartiteGraph::from_edges((0..pilots).map(|p| (p, (1..=cars).filter(move |c| (c + p) % 3 != 0))))
}

fn bench_matching(c: &mut Criterion) {
    let graph = dense_graph(20, 20);
    let cars: Vec<u32> = (1..=20).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    c.bench_function("hopcroft_karp_20x20_deterministic", |b| {
        b.iter(|| {
            MatchingEngine::find_maximum_matching_with_rng(black_box(&graph), &cars, false, &mut rng)
        })
    });

    c.bench_function("hopcroft_karp_20x20_randomized", |b| {
        b.iter(|| {
            MatchingEngine::find_maximum_matching_with_rng(black_box(&graph), &cars, true, &mut rng)
        })
    });
}

fn bench_session(c: &mut Criterion) {
    c.bench_function("full_rotation_20_pilots_2_groups", |b| {
        b.iter(|| {
            let mut session = ChampionshipSession::new(SessionConfig::seeded(7));
            session.reset_session(20, &(1..=10).collect::<Vec<_>>()).unwrap();
            session.set_group_count(2).unwrap();
            for pilot in 10..20 {
                session.assign_pilot_to_group(pilot, 2).unwrap();
            }
            for _ in 0..10 {
                for group in 1..=2 {
                    let race = session.generate_race(group).unwrap();
                    session.record_race(group, race).unwrap();
                }
            }
            black_box(session.history().len())
        })
    });
}

criterion_group!(benches, bench_matching, bench_session);
criterion_main!(benches);
