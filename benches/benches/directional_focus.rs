// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Directional focus selection over grids of candidate regions, with and without
//! occluding overlays.

use bough_focus::{Direction, FocusRegions};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kurbo::Rect;

fn grid(side: u32) -> FocusRegions<u32> {
    let mut regions = FocusRegions::new();
    for row in 0..side {
        for col in 0..side {
            let (x, y) = (f64::from(col) * 40.0, f64::from(row) * 40.0);
            regions.push(row * side + col, Rect::new(x, y, x + 32.0, y + 32.0));
        }
    }
    regions
}

fn bench_directional(c: &mut Criterion) {
    let mut group = c.benchmark_group("bough_focus");
    let current = Rect::new(0.0, 0.0, 32.0, 32.0);

    for side in [8_u32, 32] {
        let regions = grid(side);
        for direction in [Direction::Right, Direction::DownRight] {
            group.bench_function(format!("best_in_direction({side}x{side},{direction:?})"), |b| {
                b.iter(|| black_box(regions.best_in_direction(black_box(current), direction)));
            });
        }

        group.bench_function(format!("occlude({side}x{side})"), |b| {
            b.iter(|| {
                let mut regions = grid(side);
                regions.occlude(Rect::new(20.0, 20.0, 220.0, 140.0));
                black_box(regions.regions().len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_directional);
criterion_main!(benches);
