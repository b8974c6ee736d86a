// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window delegates: application hooks for a whole window.
//!
//! A delegate sees its window open and close around the content view's lifecycle:
//! `will_open` runs before any view's `will_appear`, `did_open` after every `appeared`,
//! and the close hooks mirror that. Once per frame it gets `update` before the views' update
//! hooks and `render` before the content tree draws. `layout` follows every content
//! resize.

use core::any::Any;
use core::fmt;
use core::time::Duration;

use crate::render::Renderer;
use crate::view::Deferred;
use crate::{Application, ViewId, WindowId};

/// Hooks a window calls on its owner. Every method defaults to doing nothing.
pub trait WindowDelegate: Any {
    /// The window is about to open; no view has been told yet.
    fn will_open(&mut self, _cx: &mut WindowCx<'_>) {}
    /// The window is open and its content has appeared.
    fn did_open(&mut self, _cx: &mut WindowCx<'_>) {}
    /// The window is about to close; focus is still in place.
    fn will_close(&mut self, _cx: &mut WindowCx<'_>) {}
    /// The window is closed and its content has disappeared.
    fn did_close(&mut self, _cx: &mut WindowCx<'_>) {}
    /// Runs once per frame, before any view's update hooks.
    fn update(&mut self, _cx: &mut WindowCx<'_>, _elapsed: Duration) {}
    /// The content view was resized to fill the window.
    fn layout(&mut self, _cx: &mut WindowCx<'_>) {}
    /// Runs once per frame, before the content tree is drawn.
    fn render(&mut self, _cx: &mut WindowCx<'_>, _renderer: &mut dyn Renderer) {}
}

/// Context handed to [`WindowDelegate`] hooks.
///
/// Like [`ViewCx`](crate::ViewCx), mutations are queued and applied after the hook
/// returns.
pub struct WindowCx<'a> {
    app: &'a Application,
    id: WindowId,
    deferred: &'a mut Vec<Deferred>,
}

impl fmt::Debug for WindowCx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowCx")
            .field("id", &self.id)
            .field("deferred", &self.deferred.len())
            .finish_non_exhaustive()
    }
}

impl<'a> WindowCx<'a> {
    /// The window whose hook is running.
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Read access to the application.
    pub fn app(&self) -> &'a Application {
        self.app
    }

    /// The window's content view.
    pub fn content_view(&self) -> Option<ViewId> {
        self.app.content_view(self.id)
    }

    /// Queue an arbitrary mutation of the application.
    pub fn defer(&mut self, f: impl FnOnce(&mut Application) + 'static) {
        self.deferred.push(Box::new(f));
    }
}

impl Application {
    /// Install `delegate` on window `id`, replacing any previous one.
    pub fn set_window_delegate(&mut self, id: WindowId, delegate: impl WindowDelegate) {
        if let Some(window) = self.windows.get_mut(id) {
            window.delegate = Some(Box::new(delegate));
        }
    }

    /// The delegate of window `id`, if it has type `T`.
    ///
    /// Returns `None` while one of the delegate's own hooks is running.
    pub fn window_delegate<T: Any>(&self, id: WindowId) -> Option<&T> {
        let delegate: &dyn WindowDelegate = self.windows.get(id)?.delegate.as_deref()?;
        let any: &dyn Any = delegate;
        any.downcast_ref::<T>()
    }

    /// Mutable access to the delegate of window `id`, if it has type `T`.
    pub fn window_delegate_mut<T: Any>(&mut self, id: WindowId) -> Option<&mut T> {
        let delegate: &mut dyn WindowDelegate =
            self.windows.get_mut(id)?.delegate.as_deref_mut()?;
        let any: &mut dyn Any = delegate;
        any.downcast_mut::<T>()
    }

    /// Run `f` with the delegate of `id` taken out of its slot. Queued mutations join the
    /// deferred queue.
    pub(crate) fn with_window_delegate(
        &mut self,
        id: WindowId,
        f: impl FnOnce(&mut dyn WindowDelegate, &mut WindowCx<'_>),
    ) {
        let Some(mut delegate) = self.windows.get_mut(id).and_then(|w| w.delegate.take()) else {
            return;
        };
        let mut queued = Vec::new();
        {
            let mut cx = WindowCx {
                app: &*self,
                id,
                deferred: &mut queued,
            };
            f(delegate.as_mut(), &mut cx);
        }
        if let Some(window) = self.windows.get_mut(id)
            && window.delegate.is_none()
        {
            window.delegate = Some(delegate);
        }
        self.enqueue(queued);
    }
}
