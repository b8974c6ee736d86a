// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Effective visibility and the appear/disappear protocol.
//!
//! A view is effectively visible when its own flag and every ancestor's flag are set and
//! it is attached to an open window. The engine never stores this; it computes it when
//! asked and fires transition hooks at the moments it would change:
//!
//! 1. `will_appear`/`will_disappear` top-down over the affected subtree,
//! 2. the structural change itself,
//! 3. `appeared`/`disappeared` top-down over the same subtree.
//!
//! Subtrees hidden by their own flag are skipped in both phases since their effective
//! visibility does not change.

use crate::{Application, ViewFlags, ViewId, WindowId};

impl Application {
    /// Set the view's own visibility flag.
    ///
    /// Hooks fire only when the change is observable, that is when the view's container
    /// (its superview, or the window it is the content of) is effectively visible. Hiding
    /// a view clears focus from its subtree.
    pub fn set_visible(&mut self, id: ViewId, visible: bool) {
        self.set_visible_impl(id, visible);
        self.flush();
    }

    pub(crate) fn set_visible_impl(&mut self, id: ViewId, visible: bool) {
        if !self.views.contains(id) || self.is_visible(id) == visible {
            return;
        }
        let observable = match self.superview(id) {
            Some(superview) => self.is_visible_in_open_window(superview),
            None => self
                .window_with_content(id)
                .and_then(|w| self.windows.get(w))
                .is_some_and(|w| w.is_open),
        };

        if observable {
            self.dispatch_future_visibility_change(id, visible);
        }
        if !visible {
            self.unfocus_impl(id);
        }
        if let Some(node) = self.views.get_mut(id) {
            node.flags.set(ViewFlags::VISIBLE, visible);
        }
        if observable {
            self.dispatch_visibility_change(id, visible);
        }
        if let Some(superview) = self.superview(id) {
            self.invalidate_render_cache_impl(superview);
        }
    }

    /// Returns true if the view, and every ancestor, is visible and attached to an open
    /// window.
    pub fn is_visible_in_open_window(&self, id: ViewId) -> bool {
        self.window_of(id).is_some() && self.is_visible(id) && self.ancestors_are_visible(id)
    }

    /// Returns true if every ancestor's own visibility flag is set.
    pub fn ancestors_are_visible(&self, id: ViewId) -> bool {
        self.ancestors(id).all(|a| self.is_visible(a))
    }

    /// `id` and its descendants in pre-order, skipping subtrees hidden by their own flag.
    ///
    /// `id` itself is always included.
    fn visible_subtree(&self, id: ViewId) -> Vec<ViewId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(v) = stack.pop() {
            out.push(v);
            stack.extend(
                self.subviews(v)
                    .iter()
                    .rev()
                    .copied()
                    .filter(|s| self.is_visible(*s)),
            );
        }
        out
    }

    /// Run the will-phase of a visibility transition over `id`'s subtree.
    pub(crate) fn dispatch_future_visibility_change(&mut self, id: ViewId, visible: bool) {
        tracing::trace!(?id, visible, "visibility will change");
        for v in self.visible_subtree(id) {
            self.with_view(v, |view, cx| {
                if visible {
                    view.will_appear(cx);
                } else {
                    view.will_disappear(cx);
                }
            });
        }
    }

    /// Run the did-phase of a visibility transition over `id`'s subtree.
    pub(crate) fn dispatch_visibility_change(&mut self, id: ViewId, visible: bool) {
        tracing::trace!(?id, visible, "visibility changed");
        for v in self.visible_subtree(id) {
            self.with_view(v, |view, cx| {
                if visible {
                    view.appeared(cx);
                } else {
                    view.disappeared(cx);
                }
            });
            self.check_update_subscription(v);
        }
    }

    /// Point `id`'s subtree at `window`, re-indexing listeners and notifying behaviors.
    pub(crate) fn dispatch_window_change(&mut self, id: ViewId, window: Option<WindowId>) {
        for v in self.subtree(id) {
            let Some(node) = self.views.get_mut(v) else {
                continue;
            };
            let old = core::mem::replace(&mut node.window, window);
            node.subview_with_mouse = None;
            let types = node.listener_types();

            if let Some(old) = old.and_then(|w| self.windows.get_mut(w)) {
                old.forget_view(v);
            }
            self.router.unregister_view(v);
            if window.is_some() {
                self.router.register_view(v, &types);
            }
            self.with_view(v, |view, cx| view.window_changed(cx));
            self.check_update_subscription(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::{
        Application, Focusable, HitTest, Input, Lifecycle, Render, ViewCx, ViewId, WindowConfig,
    };

    type Log = Rc<RefCell<Vec<(&'static str, &'static str)>>>;

    struct Probe {
        name: &'static str,
        log: Log,
    }

    impl Probe {
        fn push(&self, event: &'static str) {
            self.log.borrow_mut().push((self.name, event));
        }
    }

    impl Lifecycle for Probe {
        fn will_appear(&mut self, _cx: &mut ViewCx<'_>) {
            self.push("will_appear");
        }
        fn appeared(&mut self, _cx: &mut ViewCx<'_>) {
            self.push("appeared");
        }
        fn will_disappear(&mut self, _cx: &mut ViewCx<'_>) {
            self.push("will_disappear");
        }
        fn disappeared(&mut self, _cx: &mut ViewCx<'_>) {
            self.push("disappeared");
        }
    }
    impl Focusable for Probe {}
    impl HitTest for Probe {}
    impl Input for Probe {}
    impl Render for Probe {}

    fn probe(app: &mut Application, name: &'static str, log: &Log) -> ViewId {
        app.create_view(Probe {
            name,
            log: Rc::clone(log),
        })
    }

    #[test]
    fn hidden_subtrees_are_skipped() {
        let log = Log::default();
        let mut app = Application::default();
        let w = app.create_window(WindowConfig::default());
        app.open_window(w).expect("headless open");
        let content = app.content_view(w).expect("content");

        let a = probe(&mut app, "a", &log);
        let b = probe(&mut app, "b", &log);
        let c = probe(&mut app, "c", &log);
        app.add_subview(a, b);
        app.add_hidden_subview(a, c);
        app.add_subview(content, a);

        assert_eq!(
            *log.borrow(),
            vec![
                ("a", "will_appear"),
                ("b", "will_appear"),
                ("a", "appeared"),
                ("b", "appeared"),
            ]
        );
        assert!(app.is_visible_in_open_window(b));
        assert!(!app.is_visible_in_open_window(c));
    }

    #[test]
    fn set_visible_only_fires_when_observable() {
        let log = Log::default();
        let mut app = Application::default();
        let a = probe(&mut app, "a", &log);
        app.set_visible(a, false);
        app.set_visible(a, true);
        assert!(log.borrow().is_empty(), "detached views have nothing to observe");

        let w = app.create_window(WindowConfig::default());
        let content = app.content_view(w).expect("content");
        app.add_subview(content, a);
        app.open_window(w).expect("headless open");
        log.borrow_mut().clear();

        app.set_visible(a, false);
        assert_eq!(
            *log.borrow(),
            vec![("a", "will_disappear"), ("a", "disappeared")]
        );
    }

    #[test]
    fn moving_between_visible_parents_fires_nothing() {
        let log = Log::default();
        let mut app = Application::default();
        let w = app.create_window(WindowConfig::default());
        app.open_window(w).expect("headless open");
        let content = app.content_view(w).expect("content");
        let p1 = app.create_plain_view();
        let p2 = app.create_plain_view();
        app.add_subview(content, p1);
        app.add_subview(content, p2);
        let a = probe(&mut app, "a", &log);
        app.add_subview(p1, a);
        log.borrow_mut().clear();

        app.add_subview(p2, a);
        assert!(log.borrow().is_empty());
        assert_eq!(app.superview(a), Some(p2));
    }

    #[test]
    fn closing_the_window_disappears_everything() {
        let log = Log::default();
        let mut app = Application::default();
        let w = app.create_window(WindowConfig::default());
        let content = app.content_view(w).expect("content");
        let a = probe(&mut app, "a", &log);
        app.add_subview(content, a);
        app.open_window(w).expect("headless open");
        assert_eq!(
            *log.borrow(),
            vec![("a", "will_appear"), ("a", "appeared")]
        );
        log.borrow_mut().clear();
        app.close_window(w);
        assert_eq!(
            *log.borrow(),
            vec![("a", "will_disappear"), ("a", "disappeared")]
        );
    }
}
