// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree structure: attaching and detaching views, relations, and coordinate transforms.

use kurbo::{Point, Rect};

use crate::{Application, Relation, ViewId, WindowId};

impl Application {
    /// The view's superview.
    pub fn superview(&self, id: ViewId) -> Option<ViewId> {
        self.views.get(id)?.superview
    }

    /// The view's subviews, back to front.
    pub fn subviews(&self, id: ViewId) -> &[ViewId] {
        self.views.get(id).map_or(&[], |n| n.subviews.as_slice())
    }

    /// The window the view is attached to, through its root.
    pub fn window_of(&self, id: ViewId) -> Option<WindowId> {
        self.views.get(id)?.window
    }

    /// The topmost ancestor of `id`, or `id` itself if it has no superview.
    pub fn root_of(&self, id: ViewId) -> ViewId {
        let mut root = id;
        while let Some(superview) = self.superview(root) {
            root = superview;
        }
        root
    }

    /// Iterate `id`'s strict ancestors, nearest first.
    pub fn ancestors(&self, id: ViewId) -> impl Iterator<Item = ViewId> + '_ {
        core::iter::successors(self.superview(id), move |&v| self.superview(v))
    }

    /// Returns true if `id` is a strict descendant of `ancestor`.
    pub fn is_descendant_of(&self, id: ViewId, ancestor: ViewId) -> bool {
        self.ancestors(id).any(|v| v == ancestor)
    }

    fn depth(&self, id: ViewId) -> usize {
        self.ancestors(id).count()
    }

    /// Returns true if `a` is `relation` of `b` ("a is an ancestor of b").
    ///
    /// Stale ids have no relations.
    pub fn has_relation(&self, a: ViewId, relation: Relation, b: ViewId) -> bool {
        if !self.views.contains(a) || !self.views.contains(b) {
            return false;
        }
        match relation {
            Relation::Self_ => a == b,
            Relation::Ancestor => self.is_descendant_of(b, a),
            Relation::Descendant => self.is_descendant_of(a, b),
            Relation::Sibling => {
                a != b && self.superview(a).is_some() && self.superview(a) == self.superview(b)
            }
            Relation::Hierarchy => self.root_of(a) == self.root_of(b),
            Relation::Any => {
                self.root_of(a) == self.root_of(b)
                    || (self.window_of(a).is_some() && self.window_of(b).is_some())
            }
        }
    }

    /// The lowest view that is an ancestor of, or equal to, both `a` and `b`.
    pub fn common_view(&self, a: ViewId, b: ViewId) -> Option<ViewId> {
        if !self.views.contains(a) || !self.views.contains(b) {
            return None;
        }
        let (mut a, mut b) = (a, b);
        let (mut da, mut db) = (self.depth(a), self.depth(b));
        while da > db {
            a = self.superview(a)?;
            da -= 1;
        }
        while db > da {
            b = self.superview(b)?;
            db -= 1;
        }
        while a != b {
            a = self.superview(a)?;
            b = self.superview(b)?;
        }
        Some(a)
    }

    /// Visit `id` and its descendants in pre-order, back to front.
    pub(crate) fn subtree(&self, id: ViewId) -> Vec<ViewId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(v) = stack.pop() {
            if !self.views.contains(v) {
                continue;
            }
            out.push(v);
            stack.extend(self.subviews(v).iter().rev().copied());
        }
        out
    }

    // --- Attaching and detaching ---

    /// Attach `view` as the frontmost subview of `parent`.
    ///
    /// Does nothing if `view` already is a subview of `parent`, or if the attachment would
    /// create a cycle. A view with a different superview is detached from it first. Window
    /// attachment and visibility hooks fire for whatever changed.
    pub fn add_subview(&mut self, parent: ViewId, view: ViewId) {
        self.add_subview_impl(parent, view);
        self.flush();
    }

    /// Hide `view`, then attach it to `parent`.
    pub fn add_hidden_subview(&mut self, parent: ViewId, view: ViewId) {
        self.set_visible_impl(view, false);
        self.add_subview_impl(parent, view);
        self.flush();
    }

    pub(crate) fn add_subview_impl(&mut self, parent: ViewId, view: ViewId) {
        if parent == view || !self.views.contains(parent) || !self.views.contains(view) {
            return;
        }
        if self.superview(view) == Some(parent) {
            return;
        }
        if self.window_with_content(view).is_some() {
            tracing::warn!(?parent, ?view, "refusing to attach a window content view");
            return;
        }
        if self.is_descendant_of(parent, view) {
            tracing::warn!(?parent, ?view, "refusing to attach a view to its own descendant");
            return;
        }

        let was_visible = self.is_visible_in_open_window(view);
        let will_be_visible = self.is_visible(view) && self.is_visible_in_open_window(parent);
        let transition = (was_visible != will_be_visible).then_some(will_be_visible);
        if let Some(visible) = transition {
            self.dispatch_future_visibility_change(view, visible);
        }

        if let Some(old) = self.superview(view) {
            self.unfocus_impl(view);
            self.detach(old, view);
        }

        if let Some(node) = self.views.get_mut(view) {
            node.superview = Some(parent);
        }
        if let Some(node) = self.views.get_mut(parent) {
            node.subviews.push(view);
        }

        let window = self.window_of(parent);
        if self.window_of(view) != window {
            self.dispatch_window_change(view, window);
        }
        if let Some(visible) = transition {
            self.dispatch_visibility_change(view, visible);
        }
        self.invalidate_render_cache_impl(parent);
    }

    /// Unlink `view` from `old` without lifecycle notifications.
    fn detach(&mut self, old: ViewId, view: ViewId) {
        if let Some(node) = self.views.get_mut(old) {
            node.subviews.retain(|v| *v != view);
            if node.subview_with_mouse == Some(view) {
                node.subview_with_mouse = None;
            }
        }
        if let Some(node) = self.views.get_mut(view) {
            node.superview = None;
        }
    }

    /// Detach `view` from `parent`.
    ///
    /// Does nothing unless `parent` is `view`'s superview. Focus is cleared from the
    /// subtree first, drag tracking and update subscriptions are cancelled, and visibility
    /// and window attachment hooks fire.
    pub fn remove_subview(&mut self, parent: ViewId, view: ViewId) {
        self.remove_subview_impl(parent, view);
        self.flush();
    }

    /// Detach every subview of `parent`.
    pub fn remove_subviews(&mut self, parent: ViewId) {
        self.remove_subviews_impl(parent);
        self.flush();
    }

    /// Detach `view` from its superview, if it has one.
    pub fn remove_from_superview(&mut self, view: ViewId) {
        if let Some(parent) = self.superview(view) {
            self.remove_subview(parent, view);
        }
    }

    pub(crate) fn remove_subviews_impl(&mut self, parent: ViewId) {
        while let Some(&last) = self.subviews(parent).last() {
            self.remove_subview_impl(parent, last);
        }
    }

    pub(crate) fn remove_subview_impl(&mut self, parent: ViewId, view: ViewId) {
        if self.superview(view) != Some(parent) {
            return;
        }
        self.unfocus_impl(view);

        let disappearing = self.is_visible_in_open_window(view);
        if disappearing {
            self.dispatch_future_visibility_change(view, false);
        }

        self.detach(parent, view);
        if self.window_of(view).is_some() {
            self.dispatch_window_change(view, None);
        }

        if disappearing {
            self.dispatch_visibility_change(view, false);
        }
        self.invalidate_render_cache_impl(parent);
    }

    /// Move `view` in front of its siblings.
    pub fn bring_to_front(&mut self, view: ViewId) {
        self.reorder(view, true);
    }

    /// Move `view` behind its siblings.
    pub fn send_to_back(&mut self, view: ViewId) {
        self.reorder(view, false);
    }

    fn reorder(&mut self, view: ViewId, front: bool) {
        let Some(parent) = self.superview(view) else {
            return;
        };
        if let Some(node) = self.views.get_mut(parent) {
            node.subviews.retain(|v| *v != view);
            if front {
                node.subviews.push(view);
            } else {
                node.subviews.insert(0, view);
            }
        }
        if self.is_visible(view) {
            self.invalidate_render_cache(parent);
        }
    }

    // --- Geometry ---

    /// Set the view's bounds in its superview's coordinates.
    ///
    /// A size change runs the `layout` hook and invalidates the view's render cache; any
    /// change invalidates the superview's render cache.
    pub fn set_bounds(&mut self, id: ViewId, bounds: Rect) {
        self.set_bounds_impl(id, bounds);
        self.flush();
    }

    pub(crate) fn set_bounds_impl(&mut self, id: ViewId, bounds: Rect) {
        let Some(node) = self.views.get_mut(id) else {
            return;
        };
        let old = node.bounds;
        if old == bounds {
            return;
        }
        node.bounds = bounds;
        let resized = old.size() != bounds.size();
        if resized {
            self.with_view(id, |view, cx| view.layout(cx));
            self.invalidate_render_cache_impl(id);
        }
        if self.is_visible(id)
            && let Some(superview) = self.superview(id)
        {
            self.invalidate_render_cache_impl(superview);
        }
    }

    /// Set the view's bounds as fractions of its superview's size.
    ///
    /// Does nothing for views without a superview.
    pub fn set_bounds_relative(&mut self, id: ViewId, fractions: Rect) {
        let Some(superview) = self.superview(id) else {
            return;
        };
        let size = self.bounds(superview).size();
        let bounds = Rect::new(
            fractions.x0 * size.width,
            fractions.y0 * size.height,
            fractions.x1 * size.width,
            fractions.y1 * size.height,
        );
        self.set_bounds(id, bounds);
    }

    /// Convert a point from `id`'s coordinates to its superview's.
    pub fn local_to_superview(&self, id: ViewId, point: Point) -> Point {
        point + self.bounds(id).origin().to_vec2()
    }

    /// Convert a point from `id`'s superview's coordinates to `id`'s.
    pub fn superview_to_local(&self, id: ViewId, point: Point) -> Point {
        point - self.bounds(id).origin().to_vec2()
    }

    /// Convert a point from `id`'s coordinates to its root's (window) coordinates.
    pub fn local_to_window(&self, id: ViewId, point: Point) -> Point {
        let mut point = self.local_to_superview(id, point);
        for ancestor in self.ancestors(id) {
            point = self.local_to_superview(ancestor, point);
        }
        point
    }

    /// Convert a point from `id`'s coordinates to `ancestor`'s.
    ///
    /// If `ancestor` is not an ancestor of `id`, the result is in `id`'s root coordinates.
    pub fn local_to_ancestor(&self, id: ViewId, point: Point, ancestor: ViewId) -> Point {
        let mut point = point;
        let mut current = id;
        while current != ancestor {
            point = self.local_to_superview(current, point);
            match self.superview(current) {
                Some(superview) => current = superview,
                None => break,
            }
        }
        point
    }

    /// Convert a point from window coordinates to `id`'s coordinates.
    pub fn window_to_local(&self, id: ViewId, point: Point) -> Point {
        let origin = self.local_to_window(id, Point::ZERO);
        point - origin.to_vec2()
    }

    /// Convert a point from `from`'s coordinates to `to`'s, through window space.
    pub fn convert_point(&self, from: ViewId, point: Point, to: ViewId) -> Point {
        self.window_to_local(to, self.local_to_window(from, point))
    }

    /// The view's bounds in window coordinates.
    pub fn window_bounds(&self, id: ViewId) -> Rect {
        let min = self.local_to_window(id, Point::ZERO);
        Rect::from_origin_size(min, self.bounds(id).size())
    }
}
