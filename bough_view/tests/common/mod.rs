// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures for the integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::cell::RefCell;
use std::rc::Rc;

use bough_view::{
    Application, Focusable, HitTest, Input, Lifecycle, Render, ViewCx, ViewId, WindowConfig,
    WindowId,
};
use kurbo::{Point, Rect, Size};

/// Events recorded by [`Probe`] views, as `(view name, event)`.
pub type Log = Rc<RefCell<Vec<(&'static str, &'static str)>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Drain the log.
pub fn take(log: &Log) -> Vec<(&'static str, &'static str)> {
    core::mem::take(&mut *log.borrow_mut())
}

/// A view that records its hook calls.
pub struct Probe {
    pub name: &'static str,
    pub log: Log,
    pub focusable: bool,
}

impl Probe {
    pub fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: Rc::clone(log),
            focusable: false,
        }
    }

    pub fn focusable(name: &'static str, log: &Log) -> Self {
        Self {
            focusable: true,
            ..Self::new(name, log)
        }
    }

    fn record(&self, event: &'static str) {
        self.log.borrow_mut().push((self.name, event));
    }
}

impl Lifecycle for Probe {
    fn will_appear(&mut self, _cx: &mut ViewCx<'_>) {
        self.record("will_appear");
    }
    fn appeared(&mut self, _cx: &mut ViewCx<'_>) {
        self.record("appeared");
    }
    fn will_disappear(&mut self, _cx: &mut ViewCx<'_>) {
        self.record("will_disappear");
    }
    fn disappeared(&mut self, _cx: &mut ViewCx<'_>) {
        self.record("disappeared");
    }
    fn window_changed(&mut self, _cx: &mut ViewCx<'_>) {
        self.record("window_changed");
    }
}

impl Focusable for Probe {
    fn can_become_focus(&self) -> bool {
        self.focusable
    }
    fn focus_gained(&mut self, _cx: &mut ViewCx<'_>) {
        self.record("focus_gained");
    }
    fn focus_lost(&mut self, _cx: &mut ViewCx<'_>) {
        self.record("focus_lost");
    }
}

impl HitTest for Probe {}

impl Input for Probe {
    fn mouse_drag(&mut self, _cx: &mut ViewCx<'_>, _start: Point, _point: Point) {
        self.record("mouse_drag");
    }
}

impl Render for Probe {}

/// An open 100x100 window and its content view.
pub fn open_window(app: &mut Application) -> (WindowId, ViewId) {
    let window = app.create_window(WindowConfig {
        size: Size::new(100.0, 100.0),
        ..WindowConfig::default()
    });
    app.open_window(window).expect("headless windows open");
    let content = app.content_view(window).expect("every window has content");
    (window, content)
}

/// Create a probe view with `bounds`.
pub fn probe(app: &mut Application, probe: Probe, bounds: Rect) -> ViewId {
    let id = app.create_view(probe);
    app.set_bounds(id, bounds);
    id
}
