// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-view behavior: capability traits and the context passed to their hooks.
//!
//! A view's behavior is a boxed value implementing [`View`], which is the union of the
//! capability traits [`Lifecycle`], [`Focusable`], [`HitTest`], [`Input`] and
//! [`Render`](crate::Render). Every hook has a default, so a behavior only overrides what
//! it needs:
//!
//! ```
//! use bough_view::{Focusable, HitTest, Input, Lifecycle, Render, ViewCx};
//!
//! #[derive(Default)]
//! struct Button {
//!     focused: bool,
//! }
//!
//! impl Focusable for Button {
//!     fn can_become_focus(&self) -> bool {
//!         true
//!     }
//!     fn focus_gained(&mut self, _cx: &mut ViewCx<'_>) {
//!         self.focused = true;
//!     }
//!     fn focus_lost(&mut self, _cx: &mut ViewCx<'_>) {
//!         self.focused = false;
//!     }
//! }
//! impl Lifecycle for Button {}
//! impl HitTest for Button {}
//! impl Input for Button {}
//! impl Render for Button {}
//! ```
//!
//! Hooks receive a [`ViewCx`] with read access to the whole application. Mutations
//! requested from a hook (focus changes, posts, tree edits) are queued and applied once
//! the hook returns.

use core::any::Any;
use core::fmt;

use kurbo::{Point, Rect, Size, Vec2};

use crate::render::Render;
use crate::{Application, Key, Modifiers, MouseButton, Relation, ViewId, WindowId};

/// A mutation queued by a hook, applied after the hook returns.
pub(crate) type Deferred = Box<dyn FnOnce(&mut Application)>;

/// Whether an input hook consumed its event.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Outcome {
    /// The event was consumed.
    Handled,
    /// The event was not consumed; default handling and bubbling continue.
    #[default]
    Ignored,
}

impl Outcome {
    /// Returns true for [`Outcome::Handled`].
    pub const fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}

/// Visibility, attachment and layout notifications.
///
/// `will_*` hooks run before the change is applied, the others after. Both phases walk
/// the affected subtree top-down, skipping subtrees hidden by their own flag.
pub trait Lifecycle {
    /// The view is about to become effectively visible.
    fn will_appear(&mut self, _cx: &mut ViewCx<'_>) {}
    /// The view became effectively visible.
    fn appeared(&mut self, _cx: &mut ViewCx<'_>) {}
    /// The view is about to stop being effectively visible.
    fn will_disappear(&mut self, _cx: &mut ViewCx<'_>) {}
    /// The view stopped being effectively visible.
    fn disappeared(&mut self, _cx: &mut ViewCx<'_>) {}
    /// The view was attached to, or detached from, a window.
    fn window_changed(&mut self, _cx: &mut ViewCx<'_>) {}
    /// The view's size changed.
    fn layout(&mut self, _cx: &mut ViewCx<'_>) {}
}

/// Focus eligibility and notifications.
pub trait Focusable {
    /// Whether the view may hold focus.
    ///
    /// Views with a preferred focus are always eligible, since focusing them redirects.
    fn can_become_focus(&self) -> bool {
        false
    }
    /// The focus entered this view's subtree.
    fn focus_gained(&mut self, _cx: &mut ViewCx<'_>) {}
    /// The focus left this view's subtree.
    fn focus_lost(&mut self, _cx: &mut ViewCx<'_>) {}
    /// Follows every `focus_gained` and `focus_lost`.
    fn focus_changed(&mut self, _cx: &mut ViewCx<'_>) {}
}

/// Point containment for pointer dispatch.
pub trait HitTest {
    /// Whether `point`, in local coordinates, hits a view of the given `size`.
    fn hit_test(&self, point: Point, size: Size) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x < size.width && point.y < size.height
    }
}

/// Pointer and keyboard hooks.
///
/// Points are in the view's local coordinates. An [`Outcome::Ignored`] pointer event is
/// forwarded to the superview when the superview intercepts interactions; an ignored key
/// event gets default focus handling (tab and arrows) and then bubbles up the responder
/// chain.
pub trait Input {
    /// A button was pressed over the view.
    fn mouse_down(
        &mut self,
        _cx: &mut ViewCx<'_>,
        _button: MouseButton,
        _point: Point,
    ) -> Outcome {
        Outcome::Ignored
    }
    /// A button was released over the view; `start` is where it was pressed.
    fn mouse_up(
        &mut self,
        _cx: &mut ViewCx<'_>,
        _button: MouseButton,
        _start: Point,
        _point: Point,
    ) -> Outcome {
        Outcome::Ignored
    }
    /// The wheel moved over the view.
    fn mouse_wheel(&mut self, _cx: &mut ViewCx<'_>, _point: Point, _delta: Vec2) -> Outcome {
        Outcome::Ignored
    }
    /// The pointer moved over the view.
    fn mouse_movement(&mut self, _cx: &mut ViewCx<'_>, _point: Point) -> Outcome {
        Outcome::Ignored
    }
    /// The pointer entered the view.
    fn mouse_enter(&mut self, _cx: &mut ViewCx<'_>) {}
    /// The pointer left the view.
    fn mouse_exit(&mut self, _cx: &mut ViewCx<'_>) {}
    /// The pointer moved while the view is drag-tracked.
    fn mouse_drag(&mut self, _cx: &mut ViewCx<'_>, _start: Point, _point: Point) {}
    /// A key was pressed while the view is on the responder chain.
    fn key_down(
        &mut self,
        _cx: &mut ViewCx<'_>,
        _key: Key,
        _modifiers: Modifiers,
        _repeat: bool,
    ) -> Outcome {
        Outcome::Ignored
    }
    /// A key was released while the view is on the responder chain.
    fn key_up(
        &mut self,
        _cx: &mut ViewCx<'_>,
        _key: Key,
        _modifiers: Modifiers,
        _repeat: bool,
    ) -> Outcome {
        Outcome::Ignored
    }
    /// Text was entered while the view is on the responder chain.
    fn text_input(&mut self, _cx: &mut ViewCx<'_>, _text: &str) -> Outcome {
        Outcome::Ignored
    }
}

/// A view behavior: every capability the engine calls into.
///
/// Implemented automatically for any `'static` type implementing all capability traits.
pub trait View: Lifecycle + Focusable + HitTest + Input + Render + Any {}

impl<T: Lifecycle + Focusable + HitTest + Input + Render + Any> View for T {}

/// A view with default behavior everywhere; used for content views and containers.
#[derive(Copy, Clone, Debug, Default)]
pub struct PlainView;

impl Lifecycle for PlainView {}
impl Focusable for PlainView {}
impl HitTest for PlainView {}
impl Input for PlainView {}
impl Render for PlainView {}

/// Context handed to view hooks.
///
/// Gives read access to the application and queues mutations, which are applied in order
/// after the hook returns.
pub struct ViewCx<'a> {
    app: &'a Application,
    id: ViewId,
    deferred: &'a mut Vec<Deferred>,
}

impl fmt::Debug for ViewCx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewCx")
            .field("id", &self.id)
            .field("deferred", &self.deferred.len())
            .finish_non_exhaustive()
    }
}

impl<'a> ViewCx<'a> {
    pub(crate) fn new(app: &'a Application, id: ViewId, deferred: &'a mut Vec<Deferred>) -> Self {
        Self { app, id, deferred }
    }

    /// The view whose hook is running.
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Read access to the application.
    pub fn app(&self) -> &'a Application {
        self.app
    }

    /// The window this view is attached to.
    pub fn window(&self) -> Option<WindowId> {
        self.app.window_of(self.id)
    }

    /// The view's bounds in its superview's coordinates.
    pub fn bounds(&self) -> Rect {
        self.app.bounds(self.id)
    }

    /// The view's superview.
    pub fn superview(&self) -> Option<ViewId> {
        self.app.superview(self.id)
    }

    /// Returns true if the view or one of its descendants holds focus.
    pub fn is_focus(&self) -> bool {
        self.app.is_focus(self.id)
    }

    /// Look up a provision of type `T` from this view's ancestors.
    pub fn inherit<T: Any>(&self) -> Option<&'a T> {
        self.app.inherit::<T>(self.id)
    }

    /// Look up a provision of type `T` within `relation` of this view.
    pub fn find<T: Any>(&self, relation: Relation) -> Option<&'a T> {
        self.app.find::<T>(self.id, relation)
    }

    /// Queue an arbitrary mutation of the application.
    pub fn defer(&mut self, f: impl FnOnce(&mut Application) + 'static) {
        self.deferred.push(Box::new(f));
    }

    /// Make this view the focus.
    pub fn focus(&mut self) {
        let id = self.id;
        self.defer(move |app| app.focus(id));
    }

    /// Clear focus if this view or a descendant holds it.
    pub fn unfocus(&mut self) {
        let id = self.id;
        self.defer(move |app| app.unfocus(id));
    }

    /// Move focus to the nearest focusable ancestor.
    pub fn focus_ancestor(&mut self) {
        let id = self.id;
        self.defer(move |app| app.focus_ancestor(id));
    }

    /// Post `message` to listeners within `relation` of this view.
    pub fn post<M: Any>(&mut self, message: M, relation: Relation) {
        let id = self.id;
        self.defer(move |app| {
            app.post(id, &message, relation);
        });
    }

    /// Discard this view's cached render and those of its visible ancestors.
    pub fn invalidate_render_cache(&mut self) {
        let id = self.id;
        self.defer(move |app| app.invalidate_render_cache(id));
    }

    /// Deliver drag events to this view until the mouse button is released.
    pub fn begin_dragging(&mut self) {
        let id = self.id;
        self.defer(move |app| app.begin_dragging(id));
    }

    /// Stop delivering drag events to this view.
    pub fn end_dragging(&mut self) {
        let id = self.id;
        self.defer(move |app| app.end_dragging(id));
    }
}
