use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::sync::Arc;
use tombola::{
    DrawEngine, GameStore, TombolaConfig,
    audio::SilentAnnouncer,
    catalog::{Sponsor, StaticFeed, parse_entries},
    game::SponsorRotator,
    storage::{MemoryStorage, PersistedSnapshot, PersistenceCodec},
};

fn catalog_document() -> String {
    let numbers: Vec<String> = (1..=90)
        .map(|i| format!(r#"{{"number": {i}, "italian": "numero {i}", "dialect": "nummero {i}"}}"#))
        .collect();
    format!(r#"{{"numbers": [{}]}}"#, numbers.join(","))
}

/// Benchmark parsing a full 90-number catalog
fn bench_parse_catalog(c: &mut Criterion) {
    let document = catalog_document();
    c.bench_function("parse_catalog_90", |b| {
        b.iter(|| parse_entries(std::hint::black_box(&document)).unwrap())
    });
}

/// Benchmark a complete 90-draw game, persistence included
fn bench_full_game(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let document = catalog_document();

    c.bench_function("full_game_90_draws", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = Arc::new(GameStore::new(
                    TombolaConfig::instant(),
                    Arc::new(MemoryStorage::new()),
                ));
                let engine = DrawEngine::new(store, Arc::new(SilentAnnouncer));
                engine
                    .load_catalog(&StaticFeed::new(document.clone()))
                    .await
                    .unwrap();
                for _ in 0..90 {
                    engine.draw().await;
                }
            })
        })
    });
}

/// Benchmark validating persisted snapshots of growing size
fn bench_codec_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_parse");

    for drawn in [1u32, 45, 90] {
        let codec = PersistenceCodec::new(Arc::new(MemoryStorage::new()), 90);
        codec.persist(
            "state",
            &PersistedSnapshot {
                drawn_numbers: (1..=drawn).collect(),
                history: Vec::new(),
            },
        );

        group.bench_with_input(BenchmarkId::from_parameter(drawn), &codec, |b, codec| {
            b.iter(|| codec.parse("state"))
        });
    }

    group.finish();
}

/// Benchmark sponsor rotation
fn bench_rotation(c: &mut Criterion) {
    let pool: Vec<Sponsor> = (0..20)
        .map(|i| Sponsor::new(format!("{i}.png"), format!("https://s{i}.example")))
        .collect();
    let mut rotator = SponsorRotator::new();
    rotator.set_sponsors(&pool);

    c.bench_function("rotator_next", |b| b.iter(|| rotator.next_sponsor()));
}

criterion_group!(
    benches,
    bench_parse_catalog,
    bench_full_game,
    bench_codec_parse,
    bench_rotation
);
criterion_main!(benches);
