// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame update hooks.
//!
//! A view with at least one hook is subscribed to its window's updates while it is
//! effectively visible. Subscription changes are collected as they happen and applied at
//! the start of the next [`Application::update_window`], so a frame always runs over a
//! stable set of views.

use core::time::Duration;

use crate::view::ViewCx;
use crate::{Application, ViewId, WindowId};

impl Application {
    /// Run `hook` on every frame while `view` is effectively visible.
    ///
    /// A hook with the same name replaces the existing one.
    pub fn add_update_hook(
        &mut self,
        view: ViewId,
        name: impl Into<String>,
        hook: impl FnMut(&mut ViewCx<'_>, Duration) + 'static,
    ) {
        let name = name.into();
        let Some(node) = self.views.get_mut(view) else {
            return;
        };
        node.update_hooks.retain(|(n, _)| *n != name);
        node.update_hooks.push((name, Box::new(hook)));
        self.check_update_subscription(view);
    }

    /// Remove the update hook called `name`.
    pub fn remove_update_hook(&mut self, view: ViewId, name: &str) {
        let Some(node) = self.views.get_mut(view) else {
            return;
        };
        node.update_hooks.retain(|(n, _)| n != name);
        self.check_update_subscription(view);
    }

    /// Returns true if `view` has any update hooks.
    pub fn has_update_hooks(&self, view: ViewId) -> bool {
        self.views
            .get(view)
            .is_some_and(|n| !n.update_hooks.is_empty())
    }

    /// Queue a subscription change if `view`'s need for updates changed.
    pub(crate) fn check_update_subscription(&mut self, view: ViewId) {
        let Some(window) = self.window_of(view) else {
            return;
        };
        let wanted = self.has_update_hooks(view) && self.is_visible_in_open_window(view);
        let Some(w) = self.windows.get_mut(window) else {
            return;
        };
        let active = w.updating.contains(&view);
        let subscribed = (active && !w.to_unsubscribe.contains(&view)) || w.to_subscribe.contains(&view);
        if wanted == subscribed {
            return;
        }
        if wanted {
            w.to_unsubscribe.remove(&view);
            if !active {
                w.to_subscribe.insert(view);
            }
        } else {
            w.to_subscribe.remove(&view);
            if active {
                w.to_unsubscribe.insert(view);
            }
        }
    }

    /// Call the window delegate's `update`, apply pending subscription changes, then run
    /// every subscribed view's hooks.
    pub fn update_window(&mut self, window: WindowId, elapsed: Duration) {
        self.with_window_delegate(window, |delegate, cx| delegate.update(cx, elapsed));
        let Some(w) = self.windows.get_mut(window) else {
            return;
        };
        let leaving: Vec<ViewId> = w.to_unsubscribe.drain().collect();
        w.updating.retain(|v| !leaving.contains(v));
        let mut joining: Vec<ViewId> = w.to_subscribe.drain().collect();
        joining.sort_unstable();
        for view in joining {
            if !w.updating.contains(&view) {
                w.updating.push(view);
            }
        }
        let views = w.updating.clone();

        for view in views {
            if self.is_visible_in_open_window(view) {
                self.run_update_hooks(view, elapsed);
            }
        }
        self.flush();
    }

    /// Update every open window.
    pub fn update(&mut self, elapsed: Duration) {
        let open: Vec<WindowId> = self
            .windows
            .iter()
            .filter(|(_, w)| w.is_open)
            .map(|(id, _)| id)
            .collect();
        for window in open {
            self.update_window(window, elapsed);
        }
    }

    fn run_update_hooks(&mut self, view: ViewId, elapsed: Duration) {
        let Some(node) = self.views.get_mut(view) else {
            return;
        };
        let mut hooks = core::mem::take(&mut node.update_hooks);
        let mut queued = Vec::new();
        {
            let mut cx = ViewCx::new(&*self, view, &mut queued);
            for (_, hook) in &mut hooks {
                hook(&mut cx, elapsed);
            }
        }
        if let Some(node) = self.views.get_mut(view) {
            node.update_hooks = hooks;
        }
        self.enqueue(queued);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::WindowConfig;

    fn counting_hook(counter: &Rc<Cell<u32>>) -> impl FnMut(&mut ViewCx<'_>, Duration) + 'static {
        let counter = Rc::clone(counter);
        move |_, _| counter.set(counter.get() + 1)
    }

    #[test]
    fn hooks_run_only_while_visible_in_an_open_window() {
        let mut app = Application::default();
        let w = app.create_window(WindowConfig::default());
        let content = app.content_view(w).expect("content");
        let v = app.create_plain_view();
        let runs = Rc::new(Cell::new(0));
        app.add_update_hook(v, "tick", counting_hook(&runs));
        app.add_subview(content, v);

        app.update_window(w, Duration::from_millis(16));
        assert_eq!(runs.get(), 0, "window is closed");

        app.open_window(w).expect("headless open");
        app.update_window(w, Duration::from_millis(16));
        assert_eq!(runs.get(), 1);
        assert_eq!(app.window(w).map(|w| w.updating_views().to_vec()), Some(vec![v]));

        app.set_visible(v, false);
        app.update_window(w, Duration::from_millis(16));
        assert_eq!(runs.get(), 1);
        assert!(app.window(w).is_some_and(|w| w.updating_views().is_empty()));
    }

    #[test]
    fn replacing_and_removing_hooks() {
        let mut app = Application::default();
        let w = app.create_window(WindowConfig::default());
        app.open_window(w).expect("headless open");
        let content = app.content_view(w).expect("content");
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        app.add_update_hook(content, "tick", counting_hook(&first));
        app.add_update_hook(content, "tick", counting_hook(&second));
        app.update(Duration::from_millis(16));
        assert_eq!((first.get(), second.get()), (0, 1));

        app.remove_update_hook(content, "tick");
        assert!(!app.has_update_hooks(content));
        app.update(Duration::from_millis(16));
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn hooks_can_queue_mutations() {
        let mut app = Application::default();
        let w = app.create_window(WindowConfig::default());
        app.open_window(w).expect("headless open");
        let content = app.content_view(w).expect("content");
        app.add_update_hook(content, "once", |cx, _| {
            let id = cx.id();
            cx.defer(move |app| app.remove_update_hook(id, "once"));
        });
        app.update(Duration::from_millis(16));
        assert!(!app.has_update_hooks(content));
    }
}
