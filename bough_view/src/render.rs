// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render traversal.
//!
//! The engine walks a window's content tree back to front, turning each view's bounds and
//! scale into a pixel area, and calls [`Render::render`] with a [`RenderCx`]. Drawing itself
//! is left to a [`Renderer`].
//!
//! Views that render to a texture (or cache their render) draw their subtree into an
//! offscreen [`RenderTexture`] sized to their area, then composite it through
//! [`Render::post_render`]. A cached render is reused until
//! [`Application::invalidate_render_cache`] is called for the view or one of its visible
//! descendants.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::{Application, PixelRect, ViewFlags, ViewId, WindowId};

/// Where draw calls go.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    /// A window's surface.
    Window(WindowId),
    /// An offscreen texture, by [`RenderTexture::id`].
    Texture(u64),
}

/// An offscreen texture a view renders into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RenderTexture {
    id: u64,
    width: i32,
    height: i32,
}

static NEXT_TEXTURE: AtomicU64 = AtomicU64::new(1);

impl RenderTexture {
    fn new(width: i32, height: i32) -> Self {
        Self {
            id: NEXT_TEXTURE.fetch_add(1, Ordering::Relaxed),
            width,
            height,
        }
    }

    /// Unique identifier, also used in [`RenderTarget::Texture`].
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Width in pixels.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> i32 {
        self.height
    }
}

/// Render-cache state kept per view.
#[derive(Clone, Debug, Default)]
pub(crate) struct RenderCache {
    pub(crate) texture: Option<RenderTexture>,
    pub(crate) valid: bool,
}

/// Backend receiving the engine's draw calls.
pub trait Renderer {
    /// A frame for `window` starts; `area` covers the whole surface.
    fn begin_frame(&mut self, _window: WindowId, _area: PixelRect) {}
    /// `view` is about to draw into `area` of `target`, limited to `clip` when set.
    fn begin_view(
        &mut self,
        view: ViewId,
        target: RenderTarget,
        area: PixelRect,
        clip: Option<PixelRect>,
    );
    /// Create backing storage for `texture`.
    fn allocate_texture(&mut self, texture: &RenderTexture);
    /// Free the storage of a texture allocated earlier. It is never used again.
    fn release_texture(&mut self, texture: &RenderTexture);
    /// Clear `target` to transparent.
    fn clear(&mut self, target: RenderTarget);
    /// Draw `texture` stretched over `area` of `target`.
    fn draw_texture(&mut self, target: RenderTarget, area: PixelRect, texture: &RenderTexture);
}

/// Drawing hooks.
pub trait Render {
    /// Draw the view's own content; subviews are drawn afterwards, on top.
    fn render(&mut self, _cx: &mut RenderCx<'_, '_>) {}

    /// Composite the view's offscreen render. The default draws it unchanged.
    fn post_render(&mut self, cx: &mut RenderCx<'_, '_>, texture: &RenderTexture) {
        cx.draw_texture(texture);
    }
}

/// Context handed to [`Render`] hooks.
pub struct RenderCx<'a, 'r> {
    app: &'a Application,
    id: ViewId,
    renderer: &'a mut (dyn Renderer + 'r),
    target: RenderTarget,
    area: PixelRect,
    clip: Option<PixelRect>,
}

impl fmt::Debug for RenderCx<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCx")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("area", &self.area)
            .field("clip", &self.clip)
            .finish_non_exhaustive()
    }
}

impl<'a, 'r> RenderCx<'a, 'r> {
    /// The view being drawn.
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Read access to the application.
    pub fn app(&self) -> &'a Application {
        self.app
    }

    /// Where this view draws.
    pub fn target(&self) -> RenderTarget {
        self.target
    }

    /// The view's pixel area within the target.
    pub fn area(&self) -> PixelRect {
        self.area
    }

    /// The clip applied to this view's drawing, if any.
    pub fn clip(&self) -> Option<PixelRect> {
        self.clip
    }

    /// The backend, for custom draw calls.
    pub fn renderer(&mut self) -> &mut (dyn Renderer + 'r) {
        self.renderer
    }

    /// Draw `texture` over the view's area.
    pub fn draw_texture(&mut self, texture: &RenderTexture) {
        self.renderer.draw_texture(self.target, self.area, texture);
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "pixel coordinates are far inside i32 range"
)]
fn round_px(v: f64) -> i32 {
    v.round() as i32
}

impl Application {
    /// Discard the cached render of `id` and of each visible ancestor above it.
    pub fn invalidate_render_cache(&mut self, id: ViewId) {
        self.invalidate_render_cache_impl(id);
    }

    pub(crate) fn invalidate_render_cache_impl(&mut self, id: ViewId) {
        let mut current = Some(id);
        while let Some(view) = current {
            let Some(node) = self.views.get_mut(view) else {
                return;
            };
            node.render_cache.valid = false;
            current = if node.is_visible() { node.superview } else { None };
        }
    }

    /// Queue the render texture of `id` for release by the next frame.
    pub(crate) fn release_render_texture(&mut self, id: ViewId) {
        if let Some(texture) = self.views.get_mut(id).and_then(|n| n.render_cache.texture.take())
        {
            self.released_textures.push(texture);
        }
    }

    /// Release the render texture of `id` if it neither renders to texture nor caches.
    pub(crate) fn release_unused_render_texture(&mut self, id: ViewId) {
        if !self
            .flags(id)
            .intersects(ViewFlags::RENDERS_TO_TEXTURE | ViewFlags::CACHES_RENDER)
        {
            self.release_render_texture(id);
        }
    }

    /// Returns true if `id` holds a render that will be reused by the next frame.
    pub fn has_cached_render(&self, id: ViewId) -> bool {
        self.has_flag(id, ViewFlags::CACHES_RENDER)
            && self
                .views
                .get(id)
                .is_some_and(|n| n.render_cache.valid && n.render_cache.texture.is_some())
    }

    /// Draw a frame of `window` through `renderer`.
    ///
    /// Finished texture downloads are applied first, and render textures dropped since the
    /// last frame (by any window's views) are released through `renderer`. Closed windows
    /// draw nothing else.
    pub fn render_window(&mut self, window: WindowId, renderer: &mut dyn Renderer) {
        self.ensure_textures(window);
        for texture in self.released_textures.drain(..) {
            renderer.release_texture(&texture);
        }
        let Some(w) = self.windows.get(window).filter(|w| w.is_open) else {
            return;
        };
        let content = w.content;
        let size = self.window_render_size(window);
        let area = PixelRect::new(0, 0, round_px(size.width), round_px(size.height));

        if let Some(w) = self.windows.get_mut(window) {
            let now = Instant::now();
            if let Some(last) = w.last_render {
                let dt = now.duration_since(last).as_secs_f64();
                if dt > 0.0 {
                    let instant = 1.0 / dt;
                    w.frames_per_second = if w.frames_per_second == 0.0 {
                        instant
                    } else {
                        w.frames_per_second * 0.9 + instant * 0.1
                    };
                }
            }
            w.last_render = Some(now);
        }

        renderer.begin_frame(window, area);
        self.with_window_delegate(window, |delegate, cx| delegate.render(cx, renderer));
        self.render_view(content, renderer, RenderTarget::Window(window), area, None);
        self.flush();
    }

    fn render_view(
        &mut self,
        id: ViewId,
        renderer: &mut dyn Renderer,
        target: RenderTarget,
        area: PixelRect,
        clip: Option<PixelRect>,
    ) {
        if !self.is_visible(id) || area.is_empty() {
            return;
        }
        let flags = self.flags(id);
        if !flags.intersects(ViewFlags::RENDERS_TO_TEXTURE | ViewFlags::CACHES_RENDER) {
            self.render_contents(id, renderer, target, area, clip);
            if let Some(node) = self.views.get_mut(id) {
                node.render_cache.valid = true;
            }
            return;
        }

        let Some(node) = self.views.get_mut(id) else {
            return;
        };
        let texture = match node.render_cache.texture {
            Some(t) if t.width == area.width && t.height == area.height => t,
            old => {
                if let Some(old) = old {
                    renderer.release_texture(&old);
                }
                let texture = RenderTexture::new(area.width, area.height);
                renderer.allocate_texture(&texture);
                node.render_cache.texture = Some(texture);
                node.render_cache.valid = false;
                texture
            }
        };
        let reuse = flags.contains(ViewFlags::CACHES_RENDER) && node.render_cache.valid;
        if !reuse {
            let offscreen = RenderTarget::Texture(texture.id);
            renderer.clear(offscreen);
            let local = PixelRect::new(0, 0, area.width, area.height);
            self.render_contents(id, renderer, offscreen, local, None);
            if let Some(node) = self.views.get_mut(id) {
                node.render_cache.valid = true;
            }
        } else {
            tracing::trace!(?id, "reusing cached render");
        }

        let clip = Some(clip.map_or(area, |c| c.intersect(&area)));
        self.with_render_cx(id, renderer, target, area, clip, |view, cx| {
            view.post_render(cx, &texture);
        });
    }

    fn render_contents(
        &mut self,
        id: ViewId,
        renderer: &mut dyn Renderer,
        target: RenderTarget,
        area: PixelRect,
        clip: Option<PixelRect>,
    ) {
        let clip = if self.clips_to_bounds(id) {
            Some(clip.map_or(area, |c| c.intersect(&area)))
        } else {
            clip
        };
        renderer.begin_view(id, target, area, clip);
        self.with_render_cx(id, renderer, target, area, clip, |view, cx| view.render(cx));

        let bounds = self.bounds(id);
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return;
        }
        let xs = f64::from(area.width) / bounds.width();
        let ys = f64::from(area.height) / bounds.height();
        let subviews: Vec<ViewId> = self.subviews(id).to_vec();
        for subview in subviews {
            let sb = self.bounds(subview);
            let scale = self.scale(subview);
            let sub_area = PixelRect::new(
                round_px(f64::from(area.x) + sb.x0 * xs),
                round_px(f64::from(area.y) + sb.y0 * ys),
                round_px(sb.width() * xs * scale.x),
                round_px(sb.height() * ys * scale.y),
            );
            self.render_view(subview, renderer, target, sub_area, clip);
        }
    }

    fn with_render_cx(
        &mut self,
        id: ViewId,
        renderer: &mut dyn Renderer,
        target: RenderTarget,
        area: PixelRect,
        clip: Option<PixelRect>,
        f: impl FnOnce(&mut dyn crate::View, &mut RenderCx<'_, '_>),
    ) {
        let Some(mut behavior) = self.views.get_mut(id).and_then(|n| n.behavior.take()) else {
            return;
        };
        {
            let mut cx = RenderCx {
                app: &*self,
                id,
                renderer,
                target,
                area,
                clip,
            };
            f(behavior.as_mut(), &mut cx);
        }
        if let Some(node) = self.views.get_mut(id) {
            node.behavior = Some(behavior);
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Rect, Size, Vec2};

    use super::*;
    use crate::WindowConfig;

    #[derive(Default)]
    struct Recorder {
        views: Vec<(ViewId, RenderTarget, PixelRect)>,
        allocated: Vec<u64>,
        released: Vec<u64>,
        composited: usize,
    }

    impl Renderer for Recorder {
        fn begin_view(
            &mut self,
            view: ViewId,
            target: RenderTarget,
            area: PixelRect,
            _clip: Option<PixelRect>,
        ) {
            self.views.push((view, target, area));
        }
        fn allocate_texture(&mut self, texture: &RenderTexture) {
            self.allocated.push(texture.id());
        }
        fn release_texture(&mut self, texture: &RenderTexture) {
            self.released.push(texture.id());
        }
        fn clear(&mut self, _target: RenderTarget) {}
        fn draw_texture(&mut self, _target: RenderTarget, _area: PixelRect, _texture: &RenderTexture) {
            self.composited += 1;
        }
    }

    fn window_with_child() -> (Application, WindowId, ViewId, ViewId) {
        let mut app = Application::default();
        let w = app.create_window(WindowConfig {
            size: Size::new(200.0, 100.0),
            ..WindowConfig::default()
        });
        app.open_window(w).expect("headless open");
        let content = app.content_view(w).expect("content");
        let child = app.create_plain_view();
        app.set_bounds(child, Rect::new(10.0, 20.0, 60.0, 70.0));
        app.add_subview(content, child);
        (app, w, content, child)
    }

    #[test]
    fn areas_follow_bounds_and_render_scale() {
        let (mut app, w, content, child) = window_with_child();
        let mut r = Recorder::default();
        app.render_window(w, &mut r);
        let target = RenderTarget::Window(w);
        assert_eq!(
            r.views,
            vec![
                (content, target, PixelRect::new(0, 0, 200, 100)),
                (child, target, PixelRect::new(10, 20, 50, 50)),
            ]
        );

        app.set_render_scale(w, 2.0);
        app.set_scale(child, Vec2::new(0.5, 0.5));
        let mut r = Recorder::default();
        app.render_window(w, &mut r);
        assert_eq!(r.views[1], (child, target, PixelRect::new(20, 40, 50, 50)));
    }

    #[test]
    fn cached_renders_are_reused_until_invalidated() {
        let (mut app, w, _content, child) = window_with_child();
        app.set_caches_render(child, true);

        let mut r = Recorder::default();
        app.render_window(w, &mut r);
        assert_eq!(r.allocated.len(), 1);
        assert_eq!(r.composited, 1);
        assert!(app.has_cached_render(child));
        assert!(r.views.iter().any(|(v, t, _)| *v == child && matches!(t, RenderTarget::Texture(_))));

        let mut r = Recorder::default();
        app.render_window(w, &mut r);
        assert!(!r.views.iter().any(|(v, _, _)| *v == child), "cached child is not redrawn");
        assert_eq!(r.composited, 1);
        assert!(r.allocated.is_empty());

        app.invalidate_render_cache(child);
        let mut r = Recorder::default();
        app.render_window(w, &mut r);
        assert!(r.views.iter().any(|(v, _, _)| *v == child));
    }

    #[test]
    fn resized_textures_release_the_old_one() {
        let (mut app, w, _content, child) = window_with_child();
        app.set_renders_to_texture(child, true);
        let mut r = Recorder::default();
        app.render_window(w, &mut r);
        app.set_bounds(child, Rect::new(10.0, 20.0, 80.0, 90.0));
        app.render_window(w, &mut r);
        assert_eq!(r.allocated.len(), 2);
        assert_eq!(r.released, vec![r.allocated[0]]);

        app.render_window(w, &mut r);
        assert_eq!(r.allocated.len(), 2, "same size keeps the texture");
    }

    #[test]
    fn dropped_textures_are_released_on_the_next_frame() {
        let (mut app, w, content, child) = window_with_child();
        let other = app.create_plain_view();
        app.set_bounds(other, Rect::new(0.0, 0.0, 10.0, 10.0));
        app.add_subview(content, other);
        app.set_caches_render(child, true);
        app.set_renders_to_texture(other, true);
        let mut r = Recorder::default();
        app.render_window(w, &mut r);
        assert_eq!(r.allocated.len(), 2);

        app.set_caches_render(child, false);
        app.destroy_view(other).expect("live view");
        assert!(r.released.is_empty(), "releases wait for a renderer");
        app.render_window(w, &mut r);
        let mut released = r.released.clone();
        released.sort_unstable();
        let mut allocated = r.allocated.clone();
        allocated.sort_unstable();
        assert_eq!(released, allocated);

        app.render_window(w, &mut r);
        assert_eq!(r.released.len(), 2, "each texture is released once");
    }

    #[test]
    fn invalidation_stops_at_hidden_views() {
        let (mut app, _w, content, child) = window_with_child();
        let grandchild = app.create_plain_view();
        app.add_subview(child, grandchild);
        for v in [content, child, grandchild] {
            if let Some(node) = app.views.get_mut(v) {
                node.render_cache.valid = true;
            }
        }
        if let Some(node) = app.views.get_mut(child) {
            node.flags.remove(ViewFlags::VISIBLE);
        }
        app.invalidate_render_cache(grandchild);
        let valid = |app: &Application, v: ViewId| {
            app.views.get(v).is_some_and(|n| n.render_cache.valid)
        };
        assert!(!valid(&app, grandchild));
        assert!(!valid(&app, child));
        assert!(valid(&app, content), "hidden child does not propagate");
    }
}
