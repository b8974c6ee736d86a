// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View tree operations on a synthetic window: attach/detach with lifecycle dispatch,
//! pointer movement and relation-scoped posting.

use bough_view::{Application, Relation, ViewId, WindowConfig};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect};

/// A window whose content holds `rows` rows of `cols` leaf views.
fn build(rows: u32, cols: u32) -> (Application, ViewId, Vec<ViewId>) {
    let mut app = Application::default();
    let window = app.create_window(WindowConfig::default());
    let content = app.content_view(window).expect("new windows have content");
    let mut panels = Vec::new();
    for row in 0..rows {
        let panel = app.create_plain_view();
        let y = f64::from(row) * 20.0;
        app.set_bounds(panel, Rect::new(0.0, y, 800.0, y + 20.0));
        for col in 0..cols {
            let leaf = app.create_plain_view();
            let x = f64::from(col) * 10.0;
            app.set_bounds(leaf, Rect::new(x, 0.0, x + 10.0, 20.0));
            app.listen::<u32>(leaf, Relation::Ancestor, |n, _| {
                black_box(n);
            });
            app.add_subview(panel, leaf);
        }
        app.add_subview(content, panel);
        panels.push(panel);
    }
    let _ = app.open_window(window);
    (app, content, panels)
}

fn bench_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("bough_view");

    group.bench_function("reattach_panel(30x60)", |b| {
        b.iter_batched(
            || build(30, 60),
            |(mut app, content, panels)| {
                app.remove_subview(content, panels[0]);
                app.add_subview(content, panels[0]);
                black_box(app.view_count())
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("mouse_movement(30x60)", |b| {
        let (mut app, content, _) = build(30, 60);
        let mut x = 0.0;
        b.iter(|| {
            x = (x + 7.0) % 600.0;
            black_box(app.dispatch_mouse_movement(content, Point::new(x, 305.0)))
        });
    });

    group.bench_function("post_to_descendants(30x60)", |b| {
        let (mut app, _, panels) = build(30, 60);
        b.iter(|| black_box(app.post(panels[3], &7_u32, Relation::Descendant)));
    });

    group.finish();
}

criterion_group!(benches, bench_tree);
criterion_main!(benches);
