use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use dialin_config::Ranges;
use dialin_core::history::{History, TrialRecord};
use dialin_core::optimize;
use dialin_core::ridge;
use dialin_core::types::{BrewParams, Defects, Positives, PrepFlags};
use rand::SeedableRng;
use rand::rngs::StdRng;

// Synthetic dial-in history: a slow walk toward a good shot.
fn synth_history(n: usize) -> History {
    let mut h = History::new();
    for i in 0..n {
        let t = i as f64;
        let quality = 3.0 + (t * 0.7) % 5.0;
        h.record(TrialRecord {
            timestamp: format!("2026-08-01T08:{i:02}:00Z"),
            params: BrewParams {
                grind_size: 6.5 - (t * 0.2) % 2.0,
                dose_coffee: 17.5 + (t * 0.3) % 1.5,
                time: 24.0 + (t * 1.1) % 8.0,
                tamp_pressure: 4.0 + (t * 0.5) % 2.5,
                ..BrewParams::default()
            },
            grinder: dialin_core::GrinderState::default(),
            defects: Defects {
                sour: (8.0 - quality).max(0.0),
                ..Defects::default()
            },
            positives: Positives {
                balanced: quality,
                body: quality,
                aroma: quality,
                sweetness: quality,
            },
            extras: PrepFlags::default(),
            use_measured_tds: false,
            ey: None,
            tds: None,
            result: None,
        });
    }
    h
}

pub fn bench_suggest(c: &mut Criterion) {
    let mut g = c.benchmark_group("bayes_opt");
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE")
        && let Ok(n) = ss.parse::<usize>()
    {
        g.sample_size(n.max(10));
    } else {
        g.sample_size(20);
    }

    let history = synth_history(12);
    let ranges = Ranges::default();
    let current = BrewParams::default();
    let extras = PrepFlags::default();

    g.bench_function("suggest_12_trials", |b| {
        b.iter_batched(
            || StdRng::seed_from_u64(0xC0FFEE),
            |mut rng| {
                black_box(optimize::suggest(
                    black_box(&history),
                    &ranges,
                    &current,
                    &extras,
                    &mut rng,
                ))
            },
            BatchSize::SmallInput,
        )
    });
    g.finish();
}

pub fn bench_compute_model(c: &mut Criterion) {
    let history = synth_history(50);
    c.bench_function("ridge_compute_model_50", |b| {
        b.iter(|| black_box(ridge::compute_model(black_box(&history))))
    });
}

criterion_group!(benches, bench_suggest, bench_compute_model);
criterion_main!(benches);
