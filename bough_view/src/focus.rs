// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus: the per-window focus view, the explicit focus ring, and directional moves.
//!
//! Each window holds at most one focus view. A view "is focus" when it is the focus view
//! or one of its ancestors, so focus notifications travel along the root→focus path and
//! skip nodes that stay on it.

use bough_focus::{Direction, FocusEvent, FocusRegions, walk_ring};
use smallvec::SmallVec;

use crate::{Application, ViewFlags, ViewId, WindowId};

type FocusPath = SmallVec<[ViewId; 8]>;

impl Application {
    /// Whether `id` may hold focus: its behavior says so, or it redirects to a preferred
    /// focus.
    ///
    /// Returns false while one of the view's own hooks is running.
    pub fn can_become_focus(&self, id: ViewId) -> bool {
        self.views.get(id).is_some_and(|node| {
            node.preferred_focus.is_some()
                || node
                    .behavior
                    .as_deref()
                    .is_some_and(|behavior| behavior.can_become_focus())
        })
    }

    /// The view focus is redirected to when `id` is focused.
    pub fn preferred_focus(&self, id: ViewId) -> Option<ViewId> {
        self.views.get(id)?.preferred_focus
    }

    /// Redirect focus requests for `id` to `preferred`.
    pub fn set_preferred_focus(&mut self, id: ViewId, preferred: Option<ViewId>) {
        if let Some(node) = self.views.get_mut(id) {
            node.preferred_focus = preferred.filter(|p| *p != id);
        }
    }

    /// Follow preferred-focus redirects from `id` to the end of the chain.
    ///
    /// Returns `None` if the chain loops back on itself.
    fn resolve_preferred_focus(&self, id: ViewId) -> Option<ViewId> {
        let mut target = id;
        for _ in 0..=self.views.len() {
            match self.preferred_focus(target) {
                Some(next) => target = next,
                None => return Some(target),
            }
        }
        None
    }

    /// Make `id` (or the view it redirects to) the focus of its window.
    ///
    /// Redirects are always followed to the end of the chain. Does nothing if the final
    /// target is not attached to a window, cannot become focus or already is the focus
    /// view, or if the redirects form a cycle.
    pub fn focus(&mut self, id: ViewId) {
        self.focus_impl(id);
        self.flush();
    }

    pub(crate) fn focus_impl(&mut self, id: ViewId) -> bool {
        let Some(target) = self.resolve_preferred_focus(id) else {
            tracing::trace!(?id, "preferred focus redirects form a cycle");
            return false;
        };
        let Some(window) = self.window_of(target) else {
            return false;
        };
        if !self.can_become_focus(target) {
            tracing::trace!(?target, "view cannot become focus");
            return false;
        }
        if self.window_focus(window) == Some(target) {
            return false;
        }
        self.set_focus(window, Some(target));
        true
    }

    /// The root→`id` path, outermost first.
    fn focus_path(&self, id: ViewId) -> FocusPath {
        let mut path: FocusPath = self.ancestors(id).collect();
        path.reverse();
        path.push(id);
        path
    }

    /// Replace `window`'s focus without eligibility checks and notify both paths.
    pub(crate) fn set_focus(&mut self, window: WindowId, target: Option<ViewId>) {
        let Some(old) = self.windows.get(window).map(|w| w.focus) else {
            return;
        };
        if old == target {
            return;
        }
        let old_path = old.map(|v| self.focus_path(v)).unwrap_or_default();
        let new_path = target.map(|v| self.focus_path(v)).unwrap_or_default();
        if let Some(w) = self.windows.get_mut(window) {
            w.focus = target;
        }
        tracing::debug!(?window, ?old, new = ?target, "focus changed");

        for event in FocusEvent::between(&old_path, &new_path) {
            match event {
                FocusEvent::Lost(v) => self.with_view(v, |view, cx| {
                    view.focus_lost(cx);
                    view.focus_changed(cx);
                }),
                FocusEvent::Gained(v) => self.with_view(v, |view, cx| {
                    view.focus_gained(cx);
                    view.focus_changed(cx);
                }),
            };
        }
    }

    /// Clear focus if `id` or one of its descendants holds it.
    pub fn unfocus(&mut self, id: ViewId) {
        self.unfocus_impl(id);
        self.flush();
    }

    pub(crate) fn unfocus_impl(&mut self, id: ViewId) {
        if self.is_focus(id)
            && let Some(window) = self.window_of(id)
        {
            self.set_focus(window, None);
        }
    }

    /// Focus the nearest ancestor of `id` that can become focus and does not redirect
    /// back into `id`'s subtree. Clears focus from `id`'s subtree if there is none.
    pub fn focus_ancestor(&mut self, id: ViewId) {
        let ancestor = self.ancestors(id).find(|&a| {
            self.resolve_preferred_focus(a).is_some_and(|target| {
                target != id && !self.is_descendant_of(target, id) && self.can_become_focus(target)
            })
        });
        match ancestor {
            Some(ancestor) => {
                self.focus_impl(ancestor);
            }
            None => self.unfocus_impl(id),
        }
        self.flush();
    }

    /// Returns true if `id` is its window's focus view or an ancestor of it.
    pub fn is_focus(&self, id: ViewId) -> bool {
        self.window_of(id)
            .and_then(|w| self.window_focus(w))
            .is_some_and(|focus| focus == id || self.is_descendant_of(focus, id))
    }

    /// The window's focus view.
    pub fn window_focus(&self, window: WindowId) -> Option<ViewId> {
        self.windows.get(window)?.focus
    }

    // --- Focus ring ---

    /// The view after `id` in the focus ring.
    pub fn next_focus(&self, id: ViewId) -> Option<ViewId> {
        self.views.get(id)?.next_focus
    }

    /// The view before `id` in the focus ring.
    pub fn previous_focus(&self, id: ViewId) -> Option<ViewId> {
        self.views.get(id)?.previous_focus
    }

    /// Link `next` after `id` in the focus ring.
    ///
    /// Links stay symmetric: `id`'s old successor loses its back link, and `next`'s old
    /// predecessor loses its forward link.
    pub fn set_next_focus(&mut self, id: ViewId, next: Option<ViewId>) {
        if !self.views.contains(id) || next.is_some_and(|n| !self.views.contains(n)) {
            return;
        }
        if self.next_focus(id) == next {
            return;
        }
        if let Some(old_next) = self.next_focus(id)
            && let Some(node) = self.views.get_mut(old_next)
        {
            node.previous_focus = None;
        }
        if let Some(next) = next {
            if let Some(old_previous) = self.previous_focus(next)
                && let Some(node) = self.views.get_mut(old_previous)
            {
                node.next_focus = None;
            }
            if let Some(node) = self.views.get_mut(next) {
                node.previous_focus = Some(id);
            }
        }
        if let Some(node) = self.views.get_mut(id) {
            node.next_focus = next;
        }
    }

    /// Link `views` into a closed ring, in order.
    pub fn link_focus_ring(&mut self, views: &[ViewId]) {
        for (i, &view) in views.iter().enumerate() {
            let next = views[(i + 1) % views.len()];
            self.set_next_focus(view, Some(next));
        }
    }

    /// Splice `id` out of the focus ring, joining its neighbours.
    pub(crate) fn unlink_focus_ring(&mut self, id: ViewId) {
        let (previous, next) = (self.previous_focus(id), self.next_focus(id));
        if let Some(node) = self.views.get_mut(id) {
            node.previous_focus = None;
            node.next_focus = None;
        }
        match (previous, next) {
            (Some(p), Some(n)) if p != id && n != id && p != n => {
                if let Some(node) = self.views.get_mut(p) {
                    node.next_focus = Some(n);
                }
                if let Some(node) = self.views.get_mut(n) {
                    node.previous_focus = Some(p);
                }
            }
            _ => {
                for neighbour in previous.into_iter().chain(next) {
                    if let Some(node) = self.views.get_mut(neighbour) {
                        if node.next_focus == Some(id) {
                            node.next_focus = None;
                        }
                        if node.previous_focus == Some(id) {
                            node.previous_focus = None;
                        }
                    }
                }
            }
        }
    }

    fn ring_candidate(&self, id: ViewId) -> bool {
        self.has_flag(id, ViewFlags::VISIBLE)
            && self.ancestors_are_visible(id)
            && self.can_become_focus(id)
    }

    /// The first visible, focusable view after `id` in the focus ring.
    ///
    /// Returns `None` if the walk comes back to `id`, reaches an open end, or has visited
    /// every view.
    pub fn next_available_focus(&self, id: ViewId) -> Option<ViewId> {
        walk_ring(
            id,
            |v| self.next_focus(v),
            |v| self.ring_candidate(v),
            self.views.len(),
        )
    }

    /// The first visible, focusable view before `id` in the focus ring.
    pub fn previous_available_focus(&self, id: ViewId) -> Option<ViewId> {
        walk_ring(
            id,
            |v| self.previous_focus(v),
            |v| self.ring_candidate(v),
            self.views.len(),
        )
    }

    // --- Directional navigation ---

    /// Move `window`'s focus to the best focusable view in `direction`.
    ///
    /// With no focus, the window's initial focus is focused if it is visible and eligible.
    /// Returns true if focus moved.
    pub fn move_focus(&mut self, window: WindowId, direction: Direction) -> bool {
        let moved = self.move_focus_impl(window, direction);
        self.flush();
        moved
    }

    pub(crate) fn move_focus_impl(&mut self, window: WindowId, direction: Direction) -> bool {
        let Some(w) = self.windows.get(window) else {
            return false;
        };
        let (content, focus, initial) = (w.content, w.focus, w.initial_focus);

        let Some(focus) = focus else {
            return match initial {
                Some(initial) if self.ring_candidate(initial) => self.focus_impl(initial),
                _ => false,
            };
        };

        let mut regions = FocusRegions::new();
        self.collect_focus_regions(content, focus, &mut regions);
        let current = self.window_bounds(focus);
        match regions.best_in_direction(current, direction) {
            Some(next) => {
                tracing::trace!(?window, ?direction, ?next, "directional focus move");
                self.focus_impl(next)
            }
            None => false,
        }
    }

    /// Collect the visible parts of focusable views in `id`'s subtree, in window space.
    ///
    /// Views are visited in pre-order, back to front. An intercepting view occludes the
    /// regions collected before it. Views related to `focus` by ancestry are not
    /// candidates; a candidate that clips to bounds hides its subviews.
    fn collect_focus_regions(&self, id: ViewId, focus: ViewId, regions: &mut FocusRegions<ViewId>) {
        let flags = self.flags(id);
        if !flags.contains(ViewFlags::VISIBLE) || self.window_of(id).is_none() {
            return;
        }
        if flags.contains(ViewFlags::INTERCEPTS) {
            let bounds = self.window_bounds(id);
            regions.occlude(bounds);
            let related =
                id == focus || self.is_descendant_of(id, focus) || self.is_descendant_of(focus, id);
            if self.can_become_focus(id) && !related {
                regions.push(id, bounds);
                if flags.contains(ViewFlags::CLIPS_TO_BOUNDS) {
                    return;
                }
            }
        }
        if flags.contains(ViewFlags::CHILDREN_INTERCEPT) {
            for &subview in self.subviews(id) {
                self.collect_focus_regions(subview, focus, regions);
            }
        }
    }
}
