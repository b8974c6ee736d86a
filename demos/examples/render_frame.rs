// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render traversal, render caching and texture downloads.
//!
//! Renders three frames of a small tree through a renderer that logs its calls. The
//! panel caches its render: it is drawn offscreen on the first frame and composited from
//! that texture afterwards. The texture it requests is filled in before the first frame.
//! A window delegate counts frames, and the panel's texture is released after it is
//! destroyed.
//!
//! Run:
//! - `cargo run -p bough_demos --example render_frame`

use std::sync::Arc;

use bough_cache::{DownloadCache, DownloadConfig, Fetch, FetchError, InlineSpawner};
use bough_demos::{Button, LogRenderer, init_logging};
use bough_view::{Application, Renderer, WindowConfig, WindowCx, WindowDelegate};
use kurbo::{Rect, Size};

/// Pretends every URL is a 1 KiB image.
struct FakeNetwork;

impl Fetch for FakeNetwork {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        tracing::info!(url, "fetching");
        Ok(vec![0xAB; 1024])
    }
}

/// Logs the window opening and counts rendered frames.
#[derive(Default)]
struct FrameCounter {
    frames: usize,
}

impl WindowDelegate for FrameCounter {
    fn did_open(&mut self, cx: &mut WindowCx<'_>) {
        tracing::info!(window = ?cx.id(), "window opened");
    }

    fn render(&mut self, _cx: &mut WindowCx<'_>, _renderer: &mut dyn Renderer) {
        self.frames += 1;
    }
}

fn main() {
    init_logging();

    let downloads =
        DownloadCache::with_spawner(Arc::new(FakeNetwork), InlineSpawner, DownloadConfig::default());
    let mut app = Application::default().with_download_cache(downloads);
    let window = app.create_window(WindowConfig {
        size: Size::new(320.0, 200.0),
        render_scale: 2.0,
        ..WindowConfig::default()
    });
    let content = app.content_view(window).expect("new windows have content");

    let panel = app.create_plain_view();
    app.set_bounds(panel, Rect::new(10.0, 10.0, 150.0, 90.0));
    app.set_caches_render(panel, true);
    let button = app.create_view(Button { label: "ok" });
    app.set_bounds(button, Rect::new(10.0, 10.0, 60.0, 40.0));
    app.add_subview(panel, button);
    app.add_subview(content, panel);
    app.set_window_delegate(window, FrameCounter::default());
    app.open_window(window).expect("headless windows open");

    let texture = app.load_view_texture_from_url(panel, "https://example.com/logo.png");

    let mut renderer = LogRenderer::default();
    for frame in 0..3 {
        println!("-- frame {frame} (panel cached: {})", app.has_cached_render(panel));
        app.render_window(window, &mut renderer);
    }
    app.destroy_view(panel).expect("panel is live");
    app.render_window(window, &mut renderer);
    let frames = app
        .window_delegate::<FrameCounter>(window)
        .map_or(0, |counter| counter.frames);
    println!("frames rendered: {frames}");
    println!(
        "views drawn: {}, logo loaded: {}, download cache holds {} bytes",
        renderer.views_drawn,
        texture.is_some_and(|t| t.is_loaded()),
        app.download_cache_size()
    );
}
