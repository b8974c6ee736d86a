// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Windows: content view ownership, open/close lifecycle, and per-window state.

use core::fmt;
use std::time::Instant;

use hashbrown::HashSet;
use kurbo::{Point, Rect, Size};

use crate::delegate::WindowDelegate;
use crate::resource::{TextureDownload, WindowCaches};
use crate::{Application, Error, ViewId, WindowId};

/// Where a window is placed when it opens.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum WindowPosition {
    /// Centered on the screen chosen by the platform.
    #[default]
    Centered,
    /// Top-left corner at the given screen position.
    At(Point),
}

/// Window creation parameters.
///
/// ```
/// use bough_view::{WindowConfig, WindowPosition};
/// use kurbo::Size;
///
/// let config = WindowConfig {
///     title: "Inspector".into(),
///     size: Size::new(320.0, 480.0),
///     ..WindowConfig::default()
/// };
/// assert_eq!(config.position, WindowPosition::Centered);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct WindowConfig {
    /// Title shown by the platform.
    pub title: String,
    /// Initial placement.
    pub position: WindowPosition,
    /// Logical size.
    pub size: Size,
    /// User-controlled scale applied to all content; 2.0 draws everything twice as large.
    pub render_scale: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Bough".into(),
            position: WindowPosition::Centered,
            size: Size::new(800.0, 600.0),
            render_scale: 1.0,
        }
    }
}

/// A window: one content view plus the focus, input and resource state around it.
///
/// Windows are owned by the [`Application`]; read them through
/// [`Application::window`] and change them through `Application` methods.
pub struct Window {
    pub(crate) config: WindowConfig,
    pub(crate) content: ViewId,
    pub(crate) is_open: bool,
    pub(crate) device_render_scale: f64,
    pub(crate) focus: Option<ViewId>,
    pub(crate) initial_focus: Option<ViewId>,
    pub(crate) dragged: Vec<ViewId>,
    pub(crate) updating: Vec<ViewId>,
    pub(crate) to_subscribe: HashSet<ViewId>,
    pub(crate) to_unsubscribe: HashSet<ViewId>,
    pub(crate) last_mouse_down: Point,
    pub(crate) caches: WindowCaches,
    pub(crate) texture_downloads: Vec<TextureDownload>,
    pub(crate) frames_per_second: f64,
    pub(crate) last_render: Option<Instant>,
    pub(crate) delegate: Option<Box<dyn WindowDelegate>>,
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("config", &self.config)
            .field("content", &self.content)
            .field("is_open", &self.is_open)
            .field("focus", &self.focus)
            .field("initial_focus", &self.initial_focus)
            .field("dragged", &self.dragged)
            .field("updating", &self.updating)
            .field("caches", &self.caches)
            .field("texture_downloads", &self.texture_downloads.len())
            .field("has_delegate", &self.delegate.is_some())
            .finish_non_exhaustive()
    }
}

impl Window {
    fn new(config: WindowConfig, content: ViewId) -> Self {
        Self {
            config,
            content,
            is_open: false,
            device_render_scale: 1.0,
            focus: None,
            initial_focus: None,
            dragged: Vec::new(),
            updating: Vec::new(),
            to_subscribe: HashSet::new(),
            to_unsubscribe: HashSet::new(),
            last_mouse_down: Point::ZERO,
            caches: WindowCaches::default(),
            texture_downloads: Vec::new(),
            frames_per_second: 0.0,
            last_render: None,
            delegate: None,
        }
    }

    /// The root view, alive as long as the window.
    pub fn content_view(&self) -> ViewId {
        self.content
    }

    /// Returns true between a successful open and the matching close.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// The window's title.
    pub fn title(&self) -> &str {
        &self.config.title
    }

    /// The window's placement.
    pub fn position(&self) -> WindowPosition {
        self.config.position
    }

    /// The window's logical size.
    pub fn size(&self) -> Size {
        self.config.size
    }

    /// User-controlled content scale.
    pub fn render_scale(&self) -> f64 {
        self.config.render_scale
    }

    /// Device pixels per logical pixel, as reported by the platform on open.
    pub fn device_render_scale(&self) -> f64 {
        self.device_render_scale
    }

    /// The view currently holding focus.
    pub fn focus(&self) -> Option<ViewId> {
        self.focus
    }

    /// The view focused by tab (or a directional move) when nothing holds focus.
    pub fn initial_focus(&self) -> Option<ViewId> {
        self.initial_focus
    }

    /// Views currently receiving drag events.
    pub fn dragged_views(&self) -> &[ViewId] {
        &self.dragged
    }

    /// Views whose update hooks run each frame.
    ///
    /// Subscription changes take effect at the start of the next update.
    pub fn updating_views(&self) -> &[ViewId] {
        &self.updating
    }

    /// Smoothed frames-per-second estimate from recent renders.
    pub fn frames_per_second(&self) -> f64 {
        self.frames_per_second
    }

    /// Shader, texture and font caches for this window.
    pub fn caches(&self) -> &WindowCaches {
        &self.caches
    }

    /// Scale from platform event coordinates to content coordinates.
    pub(crate) fn input_scale(&self) -> f64 {
        1.0 / (self.config.render_scale * self.device_render_scale)
    }

    pub(crate) fn content_bounds(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.config.size / self.config.render_scale)
    }

    /// Drop per-view state for a view leaving this window.
    pub(crate) fn forget_view(&mut self, view: ViewId) {
        self.dragged.retain(|v| *v != view);
        self.to_subscribe.remove(&view);
        if self.updating.contains(&view) {
            self.to_unsubscribe.insert(view);
        }
    }

    pub(crate) fn sweep_caches(&self) {
        self.caches.sweep();
    }
}

impl Application {
    /// Create a closed window with a fresh content view.
    pub fn create_window(&mut self, config: WindowConfig) -> WindowId {
        let content = self.create_plain_view();
        let window = Window::new(config, content);
        let bounds = window.content_bounds();
        let id = self.windows.insert(window);
        if let Some(node) = self.views.get_mut(content) {
            node.bounds = bounds;
            node.name = Some("content".into());
        }
        tracing::debug!(?id, ?content, "created window");
        id
    }

    /// The window, if `id` is live.
    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(id)
    }

    /// All live windows, in creation-slot order.
    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.ids().collect()
    }

    /// The window's content view.
    pub fn content_view(&self, id: WindowId) -> Option<ViewId> {
        self.windows.get(id).map(|w| w.content)
    }

    /// The window whose content view is `view`.
    pub(crate) fn window_with_content(&self, view: ViewId) -> Option<WindowId> {
        self.windows
            .iter()
            .find(|(_, w)| w.content == view)
            .map(|(id, _)| id)
    }

    /// Open a window.
    ///
    /// Calls the delegate's `will_open`, runs `will_appear` over the visible content, asks
    /// the platform for a native window and only then attaches the content tree to the
    /// window, runs `appeared` and calls `did_open`. If the platform fails, the appearance
    /// is cancelled with `will_disappear` and `disappeared`, the window stays closed and
    /// the error is returned; `did_open` is not called. Opening an open window does
    /// nothing.
    pub fn open_window(&mut self, id: WindowId) -> Result<(), Error> {
        let window = self.windows.get(id).ok_or(Error::UnknownWindow(id))?;
        if window.is_open {
            return Ok(());
        }
        let content = window.content;
        let appearing = self.is_visible(content);

        self.with_window_delegate(id, |delegate, cx| delegate.will_open(cx));
        if appearing {
            self.dispatch_future_visibility_change(content, true);
        }

        let opened = match self.windows.get(id) {
            Some(window) => self.platform.open_window(id, &window.config),
            None => return Err(Error::UnknownWindow(id)),
        };
        if let Err(source) = opened {
            tracing::warn!(?id, %source, "platform refused to open window");
            if appearing {
                self.dispatch_future_visibility_change(content, false);
                self.dispatch_visibility_change(content, false);
            }
            self.flush();
            return Err(Error::Platform { window: id, source });
        }

        let device_scale = self.platform.device_render_scale(id);
        if let Some(window) = self.windows.get_mut(id) {
            window.is_open = true;
            window.device_render_scale = device_scale;
        }
        self.dispatch_window_change(content, Some(id));
        self.update_content_layout(id);
        if appearing {
            self.dispatch_visibility_change(content, true);
        }
        self.with_window_delegate(id, |delegate, cx| delegate.did_open(cx));
        tracing::debug!(?id, "opened window");
        self.flush();
        Ok(())
    }

    /// Close a window.
    ///
    /// Calls the delegate's `will_close`, clears focus, runs `will_disappear`, closes the
    /// native window, detaches the content tree from the window, runs `disappeared` and
    /// calls `did_close`. Closing a closed window does nothing.
    pub fn close_window(&mut self, id: WindowId) {
        let Some(window) = self.windows.get(id) else {
            return;
        };
        if !window.is_open {
            return;
        }
        let content = window.content;
        self.with_window_delegate(id, |delegate, cx| delegate.will_close(cx));
        self.set_focus(id, None);

        let disappearing = self.is_visible(content);
        if disappearing {
            self.dispatch_future_visibility_change(content, false);
        }
        self.platform.close_window(id);
        if let Some(window) = self.windows.get_mut(id) {
            window.is_open = false;
        }
        self.dispatch_window_change(content, None);
        if disappearing {
            self.dispatch_visibility_change(content, false);
        }
        self.with_window_delegate(id, |delegate, cx| delegate.did_close(cx));
        tracing::debug!(?id, "closed window");
        self.flush();
    }

    /// Close (if needed) and destroy a window with its content view.
    ///
    /// Subviews of the content view are detached, not destroyed.
    pub fn destroy_window(&mut self, id: WindowId) -> Result<(), Error> {
        let content = self.content_view(id).ok_or(Error::UnknownWindow(id))?;
        self.close_window(id);
        self.remove_subviews_impl(content);
        self.unlink_focus_ring(content);
        self.router.unregister_view(content);
        self.windows.remove(id);
        self.views.remove(content);
        self.flush();
        Ok(())
    }

    /// Change the window's title.
    pub fn set_window_title(&mut self, id: WindowId, title: impl Into<String>) {
        if let Some(window) = self.windows.get_mut(id) {
            window.config.title = title.into();
        }
    }

    /// Change the window's placement.
    pub fn set_window_position(&mut self, id: WindowId, position: WindowPosition) {
        if let Some(window) = self.windows.get_mut(id) {
            window.config.position = position;
        }
    }

    /// Resize the window; the content view is laid out again.
    pub fn set_window_size(&mut self, id: WindowId, size: Size) {
        if let Some(window) = self.windows.get_mut(id) {
            window.config.size = size;
        }
        self.update_content_layout(id);
        self.flush();
    }

    /// Change the user render scale; the content view is laid out again.
    pub fn set_render_scale(&mut self, id: WindowId, scale: f64) {
        if scale.is_nan() || scale <= 0.0 {
            tracing::warn!(?id, scale, "ignoring non-positive render scale");
            return;
        }
        if let Some(window) = self.windows.get_mut(id) {
            window.config.render_scale = scale;
        }
        self.update_content_layout(id);
        self.flush();
    }

    /// Set the view tab focuses when nothing holds focus.
    pub fn set_initial_focus(&mut self, id: WindowId, view: Option<ViewId>) {
        if let Some(window) = self.windows.get_mut(id) {
            window.initial_focus = view;
        }
    }

    /// Render target size of the window in device pixels.
    pub fn window_render_size(&self, id: WindowId) -> Size {
        self.windows
            .get(id)
            .map_or(Size::ZERO, |w| self.platform.render_size(id, w.config.size))
    }

    fn update_content_layout(&mut self, id: WindowId) {
        let Some(window) = self.windows.get(id) else {
            return;
        };
        let (content, bounds) = (window.content, window.content_bounds());
        self.set_bounds_impl(content, bounds);
        self.with_window_delegate(id, |delegate, cx| delegate.layout(cx));
    }

    /// Deliver drag events to `view` until the mouse button is released.
    pub fn begin_dragging(&mut self, view: ViewId) {
        let Some(window) = self.window_of(view) else {
            return;
        };
        if let Some(window) = self.windows.get_mut(window)
            && !window.dragged.contains(&view)
        {
            window.dragged.push(view);
        }
    }

    /// Stop delivering drag events to `view`.
    pub fn end_dragging(&mut self, view: ViewId) {
        if let Some(window) = self.window_of(view).and_then(|w| self.windows.get_mut(w)) {
            window.dragged.retain(|v| *v != view);
        }
    }
}
