use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use candela::composites::{AxisDirection, OrthoAxis, OrthoAxisOptions};
use candela::coords::Cartesian;
use candela::render::RenderCtx;
use candela::scale::Scale;
use candela_test_utils::MockBackend;

fn bench_linear_ticks(c: &mut Criterion) {
    let ctx: RenderCtx = MockBackend::new();
    let coords = Cartesian::new(
        Scale::linear([0.0, 1000.0], [0.0, 4096.0]),
        Scale::linear([0.0, 1.0], [0.0, 4096.0]),
    );
    c.bench_function("ortho_axis_linear_1k_ticks", |b| {
        b.iter(|| {
            let axis = OrthoAxis::new(
                &ctx,
                black_box(&coords),
                AxisDirection::X,
                OrthoAxisOptions {
                    minor_tick_count: Some(4),
                    ..Default::default()
                },
            )
            .unwrap();
            black_box(axis.info().ticks.len())
        })
    });
}

fn bench_log_ticks(c: &mut Criterion) {
    let ctx: RenderCtx = MockBackend::new();
    let coords = Cartesian::new(
        Scale::linear([0.0, 1.0], [0.0, 4096.0]),
        Scale::log(10.0, [1.0, 1e12], [0.0, 4096.0]),
    );
    c.bench_function("ortho_axis_log_decades", |b| {
        b.iter(|| {
            let axis = OrthoAxis::new(
                &ctx,
                black_box(&coords),
                AxisDirection::Y,
                OrthoAxisOptions {
                    minor_tick_count: Some(8),
                    ..Default::default()
                },
            )
            .unwrap();
            black_box(axis.info().minor_ticks.len())
        })
    });
}

criterion_group!(benches, bench_linear_ticks, bench_log_ticks);
criterion_main!(benches);
