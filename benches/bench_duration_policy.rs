// benches/bench_duration_policy.rs
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use signal_automation::DurationPolicy;
use std::time::Duration;

fn bench_green_duration(c: &mut Criterion) {
    let mut group = c.benchmark_group("green_duration");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(3));

    let policy = DurationPolicy::default();
    group.bench_function("full_density_sweep", |b| {
        b.iter(|| {
            let mut total = 0u32;
            for density in 0..=100u8 {
                total += policy.green_duration(black_box(density));
            }
            black_box(total)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_green_duration);
criterion_main!(benches);
