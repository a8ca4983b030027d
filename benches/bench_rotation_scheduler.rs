// benches/bench_rotation_scheduler.rs
use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, Criterion, PlotConfiguration,
};
use signal_automation::simulation_engine::intersections::{
    create_intersections_named, IntersectionId,
};
use signal_automation::{DurationPolicy, RotationScheduler};
use std::time::Duration;

// Helper to build a scheduler over `size` junctions with varied densities.
fn create_scheduler(size: usize) -> RotationScheduler {
    let names: Vec<String> = (1..=size).map(|i| format!("Junction {}", i)).collect();
    let mut scheduler =
        RotationScheduler::initialize(create_intersections_named(&names), DurationPolicy::default())
            .expect("at least two junctions");
    for i in 0..size {
        scheduler.record_density(IntersectionId(i as u32 + 1), ((i * 17) % 101) as u8);
    }
    scheduler.rotate();
    scheduler
}

fn bench_rotation_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("rotation_cycle");

    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));
    group.warm_up_time(Duration::from_secs(2));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Linear));

    // One tick per iteration, rotating whenever the green runs out.
    for &size in [4, 16, 64].iter() {
        group.bench_function(format!("tick_size_{}", size), |b| {
            let mut scheduler = create_scheduler(size);
            b.iter(|| {
                scheduler.tick();
                if scheduler.is_rotation_due() {
                    scheduler.rotate();
                }
                black_box(scheduler.active_index());
            });
        });
    }

    for &size in [4, 16, 64].iter() {
        group.bench_function(format!("snapshot_size_{}", size), |b| {
            let scheduler = create_scheduler(size);
            b.iter(|| black_box(scheduler.snapshot()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rotation_cycle);
criterion_main!(benches);
