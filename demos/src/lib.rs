// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared pieces for the Bough demos: logging setup, a renderer that logs its calls, and
//! a small focusable button view.

use bough_view::{
    Focusable, HitTest, Input, Lifecycle, PixelRect, Render, RenderCx, RenderTarget,
    RenderTexture, Renderer, ViewCx, ViewId, WindowId,
};
use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// A [`Renderer`] that logs every call instead of drawing.
#[derive(Debug, Default)]
pub struct LogRenderer {
    /// Number of views drawn since creation.
    pub views_drawn: usize,
}

impl Renderer for LogRenderer {
    fn begin_frame(&mut self, window: WindowId, area: PixelRect) {
        tracing::info!(?window, ?area, "frame");
    }

    fn begin_view(
        &mut self,
        view: ViewId,
        target: RenderTarget,
        area: PixelRect,
        clip: Option<PixelRect>,
    ) {
        self.views_drawn += 1;
        tracing::info!(?view, ?target, ?area, ?clip, "draw view");
    }

    fn allocate_texture(&mut self, texture: &RenderTexture) {
        tracing::info!(
            id = texture.id(),
            width = texture.width(),
            height = texture.height(),
            "allocate texture"
        );
    }

    fn release_texture(&mut self, texture: &RenderTexture) {
        tracing::info!(id = texture.id(), "release texture");
    }

    fn clear(&mut self, target: RenderTarget) {
        tracing::debug!(?target, "clear");
    }

    fn draw_texture(&mut self, target: RenderTarget, area: PixelRect, texture: &RenderTexture) {
        tracing::info!(?target, ?area, id = texture.id(), "composite texture");
    }
}

/// A labelled view that can take focus and logs when it does.
#[derive(Debug)]
pub struct Button {
    /// Shown in logs.
    pub label: &'static str,
}

impl Focusable for Button {
    fn can_become_focus(&self) -> bool {
        true
    }

    fn focus_gained(&mut self, _cx: &mut ViewCx<'_>) {
        tracing::info!(label = self.label, "focus gained");
    }

    fn focus_lost(&mut self, _cx: &mut ViewCx<'_>) {
        tracing::info!(label = self.label, "focus lost");
    }
}

impl Lifecycle for Button {
    fn appeared(&mut self, _cx: &mut ViewCx<'_>) {
        tracing::debug!(label = self.label, "appeared");
    }
}

impl HitTest for Button {}
impl Input for Button {}

impl Render for Button {
    fn render(&mut self, cx: &mut RenderCx<'_, '_>) {
        let focused = cx.app().is_focus(cx.id());
        tracing::debug!(label = self.label, focused, area = ?cx.area(), "render button");
    }
}
