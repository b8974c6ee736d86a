// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer and keyboard dispatch.
//!
//! Pointer events enter a subtree at a view, in that view's local coordinates, and travel
//! front to back: subviews are offered the event first when their parent lets children
//! intercept, then the view itself if it intercepts and is hit. A subview that does not
//! clip to bounds is offered points outside its own bounds, so its children can catch them.
//!
//! The `window_*` entry points take platform coordinates, scale them into content space and
//! add window-level behavior: focus clearing, drag tracking, and tab/arrow navigation.

use bough_focus::Direction;
use kurbo::{Point, Vec2};
use smallvec::SmallVec;

use crate::view::Outcome;
use crate::{Application, Key, Modifiers, MouseButton, ViewFlags, ViewId, WindowId};

type Subviews = SmallVec<[ViewId; 8]>;

impl Application {
    /// Whether `point`, in `id`'s local coordinates, hits the view.
    pub fn hit_test_view(&self, id: ViewId, point: Point) -> bool {
        let Some(node) = self.views.get(id) else {
            return false;
        };
        let size = node.bounds.size();
        match node.behavior.as_deref() {
            Some(behavior) => behavior.hit_test(point, size),
            None => point.x >= 0.0 && point.y >= 0.0 && point.x < size.width && point.y < size.height,
        }
    }

    /// Subviews of `id` that may be offered pointer events, front to back.
    fn pointer_targets(&self, id: ViewId) -> Subviews {
        if !self.has_flag(id, ViewFlags::CHILDREN_INTERCEPT) {
            return Subviews::new();
        }
        self.subviews(id).iter().rev().copied().collect()
    }

    fn offers_point(&self, id: ViewId, point: Point) -> bool {
        !self.has_flag(id, ViewFlags::CLIPS_TO_BOUNDS) || self.hit_test_view(id, point)
    }

    fn takes_point(&self, id: ViewId, point: Point) -> bool {
        self.has_flag(id, ViewFlags::INTERCEPTS) && self.hit_test_view(id, point)
    }

    /// Offer an ignored pointer event to intercepting ancestors, nearest first.
    ///
    /// Returns the views that were offered the event.
    fn bubble_pointer(
        &mut self,
        id: ViewId,
        point: Point,
        mut hook: impl FnMut(&mut Self, ViewId, Point) -> Outcome,
    ) -> Subviews {
        let mut offered = Subviews::new();
        let (mut current, mut point) = (id, point);
        while let Some(superview) = self.superview(current) {
            if !self.has_flag(superview, ViewFlags::INTERCEPTS) {
                break;
            }
            point = self.local_to_superview(current, point);
            offered.push(superview);
            if hook(self, superview, point).is_handled() {
                break;
            }
            current = superview;
        }
        offered
    }

    // --- Subtree dispatch ---

    /// Dispatch a button press at `point`, in `id`'s local coordinates.
    ///
    /// Returns true if some view took the event.
    pub fn dispatch_mouse_down(&mut self, id: ViewId, button: MouseButton, point: Point) -> bool {
        let taken = self.mouse_down_impl(id, button, point);
        self.flush();
        taken
    }

    fn mouse_down_impl(&mut self, id: ViewId, button: MouseButton, point: Point) -> bool {
        if !self.is_visible(id) {
            return false;
        }
        for subview in self.pointer_targets(id) {
            let local = self.superview_to_local(subview, point);
            if self.offers_point(subview, local) && self.mouse_down_impl(subview, button, local) {
                return true;
            }
        }
        if !self.takes_point(id, point) {
            return false;
        }

        if let Some(window) = self.window_of(id)
            && let Some(focus) = self.window_focus(window)
            && focus != id
            && !self.is_descendant_of(id, focus)
        {
            self.set_focus(window, None);
        }

        let outcome = self
            .with_view(id, |view, cx| view.mouse_down(cx, button, point))
            .unwrap_or_default();
        if !outcome.is_handled() {
            let offered = self.bubble_pointer(id, point, |app, v, p| {
                app.with_view(v, |view, cx| view.mouse_down(cx, button, p))
                    .unwrap_or_default()
            });
            for v in offered {
                self.begin_dragging(v);
            }
        }
        self.begin_dragging(id);
        true
    }

    /// Dispatch a button release at `point`; `start` is where the button was pressed. Both
    /// are in `id`'s local coordinates.
    pub fn dispatch_mouse_up(
        &mut self,
        id: ViewId,
        button: MouseButton,
        start: Point,
        point: Point,
    ) -> bool {
        let taken = self.mouse_up_impl(id, button, start, point);
        self.flush();
        taken
    }

    fn mouse_up_impl(&mut self, id: ViewId, button: MouseButton, start: Point, point: Point) -> bool {
        if !self.is_visible(id) {
            return false;
        }
        for subview in self.pointer_targets(id) {
            let local_start = self.superview_to_local(subview, start);
            let local = self.superview_to_local(subview, point);
            if self.offers_point(subview, local)
                && self.mouse_up_impl(subview, button, local_start, local)
            {
                return true;
            }
        }
        if !self.takes_point(id, point) {
            return false;
        }
        let outcome = self
            .with_view(id, |view, cx| view.mouse_up(cx, button, start, point))
            .unwrap_or_default();
        if !outcome.is_handled() {
            let mut start = start;
            let mut current = id;
            self.bubble_pointer(id, point, |app, v, p| {
                start = app.local_to_superview(current, start);
                current = v;
                app.with_view(v, |view, cx| view.mouse_up(cx, button, start, p))
                    .unwrap_or_default()
            });
        }
        true
    }

    /// Dispatch wheel movement at `point`, in `id`'s local coordinates.
    pub fn dispatch_mouse_wheel(&mut self, id: ViewId, point: Point, delta: Vec2) -> bool {
        let taken = self.mouse_wheel_impl(id, point, delta);
        self.flush();
        taken
    }

    fn mouse_wheel_impl(&mut self, id: ViewId, point: Point, delta: Vec2) -> bool {
        if !self.is_visible(id) {
            return false;
        }
        for subview in self.pointer_targets(id) {
            let local = self.superview_to_local(subview, point);
            if self.offers_point(subview, local) && self.mouse_wheel_impl(subview, local, delta) {
                return true;
            }
        }
        if !self.takes_point(id, point) {
            return false;
        }
        let outcome = self
            .with_view(id, |view, cx| view.mouse_wheel(cx, point, delta))
            .unwrap_or_default();
        if !outcome.is_handled() {
            self.bubble_pointer(id, point, |app, v, p| {
                app.with_view(v, |view, cx| view.mouse_wheel(cx, p, delta))
                    .unwrap_or_default()
            });
        }
        true
    }

    /// Dispatch pointer movement at `point`, in `id`'s local coordinates.
    ///
    /// Tracks which subview holds the pointer at every level and sends `mouse_enter` and
    /// `mouse_exit` as that changes.
    pub fn dispatch_mouse_movement(&mut self, id: ViewId, point: Point) -> bool {
        let taken = self.mouse_movement_impl(id, point);
        self.flush();
        taken
    }

    fn mouse_movement_impl(&mut self, id: ViewId, point: Point) -> bool {
        if !self.is_visible(id) {
            return false;
        }
        let mut with_mouse = None;
        for subview in self.pointer_targets(id) {
            let local = self.superview_to_local(subview, point);
            if self.offers_point(subview, local) && self.mouse_movement_impl(subview, local) {
                with_mouse = Some(subview);
                break;
            }
        }

        let previous = self.views.get(id).and_then(|n| n.subview_with_mouse);
        if with_mouse != previous {
            if let Some(previous) = previous {
                self.mouse_exit_impl(previous);
            }
            if let Some(node) = self.views.get_mut(id) {
                node.subview_with_mouse = with_mouse;
            }
            if let Some(entered) = with_mouse {
                self.with_view(entered, |view, cx| view.mouse_enter(cx));
            }
        }
        if with_mouse.is_some() {
            return true;
        }

        if self.takes_point(id, point) {
            self.with_view(id, |view, cx| view.mouse_movement(cx, point));
            return true;
        }
        false
    }

    /// Send `mouse_exit` to `id`, and down the chain of views holding the pointer when `id`
    /// clips (the pointer cannot still be over clipped children).
    fn mouse_exit_impl(&mut self, id: ViewId) {
        let inner = self.views.get(id).and_then(|n| n.subview_with_mouse);
        if let Some(inner) = inner
            && self.has_flag(id, ViewFlags::CLIPS_TO_BOUNDS)
        {
            self.mouse_exit_impl(inner);
            if let Some(node) = self.views.get_mut(id) {
                node.subview_with_mouse = None;
            }
        }
        self.with_view(id, |view, cx| view.mouse_exit(cx));
    }

    /// Returns true if the pointer is over `id` as far as its superview knows.
    pub fn has_mouse(&self, id: ViewId) -> bool {
        self.superview(id)
            .and_then(|s| self.views.get(s))
            .is_some_and(|n| n.subview_with_mouse == Some(id))
    }

    // --- Window entry points ---

    fn to_content_space(&self, window: WindowId, point: Point) -> Option<(ViewId, Point)> {
        let w = self.windows.get(window).filter(|w| w.is_open)?;
        Some((w.content, (point.to_vec2() * w.input_scale()).to_point()))
    }

    /// A button was pressed at `point` in platform window coordinates.
    pub fn window_mouse_down(&mut self, window: WindowId, button: MouseButton, point: Point) -> bool {
        let Some((content, point)) = self.to_content_space(window, point) else {
            return false;
        };
        if let Some(w) = self.windows.get_mut(window) {
            w.last_mouse_down = point;
        }
        self.dispatch_mouse_down(content, button, point)
    }

    /// A button was released at `point` in platform window coordinates.
    ///
    /// Ends every drag in the window.
    pub fn window_mouse_up(&mut self, window: WindowId, button: MouseButton, point: Point) -> bool {
        let Some((content, point)) = self.to_content_space(window, point) else {
            return false;
        };
        let start = self.windows.get(window).map_or(point, |w| w.last_mouse_down);
        let taken = self.dispatch_mouse_up(content, button, start, point);
        if let Some(w) = self.windows.get_mut(window) {
            w.dragged.clear();
        }
        taken
    }

    /// The pointer moved to `point` in platform window coordinates.
    ///
    /// Drag-tracked views get `mouse_drag` after normal movement dispatch.
    pub fn window_mouse_movement(&mut self, window: WindowId, point: Point) -> bool {
        let Some((content, point)) = self.to_content_space(window, point) else {
            return false;
        };
        let taken = self.dispatch_mouse_movement(content, point);

        let (start, dragged) = match self.windows.get(window) {
            Some(w) => (w.last_mouse_down, w.dragged.clone()),
            None => return taken,
        };
        for view in dragged {
            let local_start = self.window_to_local(view, start);
            let local = self.window_to_local(view, point);
            self.with_view(view, |v, cx| v.mouse_drag(cx, local_start, local));
        }
        self.flush();
        taken
    }

    /// The wheel moved at `point` in platform window coordinates.
    pub fn window_mouse_wheel(&mut self, window: WindowId, point: Point, delta: Vec2) -> bool {
        let Some((content, point)) = self.to_content_space(window, point) else {
            return false;
        };
        self.dispatch_mouse_wheel(content, point, delta)
    }

    /// The responder chain: the focus view and its ancestors, innermost first.
    fn responder_chain(&self, window: WindowId) -> Subviews {
        let Some(focus) = self.window_focus(window) else {
            return Subviews::new();
        };
        core::iter::once(focus).chain(self.ancestors(focus)).collect()
    }

    /// A key was pressed.
    ///
    /// The focus view and then each ancestor get `key_down`; a view that ignores it gets
    /// default handling: tab and shift-tab follow the focus ring from the first view with
    /// a link, and arrows move focus directionally (tried once per event). A window with
    /// no focus handles tab through its initial focus.
    pub fn window_key_down(
        &mut self,
        window: WindowId,
        key: Key,
        modifiers: Modifiers,
        repeat: bool,
    ) -> bool {
        if !self.windows.get(window).is_some_and(|w| w.is_open) {
            return false;
        }
        let mut handled = false;
        let mut tried_move = false;
        for view in self.responder_chain(window) {
            let outcome = self
                .with_view(view, |v, cx| v.key_down(cx, key, modifiers, repeat))
                .unwrap_or_default();
            if outcome.is_handled() {
                handled = true;
                break;
            }
            if self.default_key_down(window, view, key, modifiers, &mut tried_move) {
                handled = true;
                break;
            }
        }
        if !handled {
            handled = self.window_default_key_down(window, key, modifiers, tried_move);
        }
        self.flush();
        handled
    }

    fn default_key_down(
        &mut self,
        window: WindowId,
        view: ViewId,
        key: Key,
        modifiers: Modifiers,
        tried_move: &mut bool,
    ) -> bool {
        match key {
            Key::Tab if modifiers.contains(Modifiers::SHIFT) => {
                if self.previous_focus(view).is_none() {
                    return false;
                }
                if let Some(previous) = self.previous_available_focus(view) {
                    self.focus_impl(previous);
                }
                true
            }
            Key::Tab => {
                if self.next_focus(view).is_none() {
                    return false;
                }
                if let Some(next) = self.next_available_focus(view) {
                    self.focus_impl(next);
                }
                true
            }
            _ => match arrow_direction(key) {
                Some(direction) if !*tried_move => {
                    *tried_move = true;
                    self.move_focus_impl(window, direction)
                }
                _ => false,
            },
        }
    }

    fn window_default_key_down(
        &mut self,
        window: WindowId,
        key: Key,
        modifiers: Modifiers,
        tried_move: bool,
    ) -> bool {
        let Some(w) = self.windows.get(window) else {
            return false;
        };
        let (focus, initial) = (w.focus, w.initial_focus);
        match key {
            Key::Tab if focus.is_none() => {
                let Some(initial) = initial else {
                    return false;
                };
                let target = if modifiers.contains(Modifiers::SHIFT) {
                    self.previous_available_focus(initial)
                } else if self.has_flag(initial, ViewFlags::VISIBLE)
                    && self.ancestors_are_visible(initial)
                    && self.can_become_focus(initial)
                {
                    Some(initial)
                } else {
                    self.next_available_focus(initial)
                };
                target.is_some_and(|t| self.focus_impl(t))
            }
            _ => match arrow_direction(key) {
                Some(direction) if !tried_move => self.move_focus_impl(window, direction),
                _ => false,
            },
        }
    }

    /// A key was released; `key_up` travels the responder chain until handled.
    pub fn window_key_up(
        &mut self,
        window: WindowId,
        key: Key,
        modifiers: Modifiers,
        repeat: bool,
    ) -> bool {
        let mut handled = false;
        for view in self.responder_chain(window) {
            let outcome = self
                .with_view(view, |v, cx| v.key_up(cx, key, modifiers, repeat))
                .unwrap_or_default();
            if outcome.is_handled() {
                handled = true;
                break;
            }
        }
        self.flush();
        handled
    }

    /// Text was entered; `text_input` travels the responder chain until handled.
    pub fn window_text_input(&mut self, window: WindowId, text: &str) -> bool {
        let mut handled = false;
        for view in self.responder_chain(window) {
            let outcome = self
                .with_view(view, |v, cx| v.text_input(cx, text))
                .unwrap_or_default();
            if outcome.is_handled() {
                handled = true;
                break;
            }
        }
        self.flush();
        handled
    }
}

fn arrow_direction(key: Key) -> Option<Direction> {
    match key {
        Key::Left => Some(Direction::Left),
        Key::Right => Some(Direction::Right),
        Key::Up => Some(Direction::Up),
        Key::Down => Some(Direction::Down),
        _ => None,
    }
}
