// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard focus navigation.
//!
//! Lays out a 3x3 grid of buttons with a focus ring through them, then drives it with
//! Tab and arrow keys on a headless window.
//!
//! Run:
//! - `cargo run -p bough_demos --example focus_navigation`
//! - `RUST_LOG=bough_view=debug cargo run -p bough_demos --example focus_navigation`

use bough_demos::{Button, init_logging};
use bough_view::{Application, Key, Modifiers, WindowConfig};
use kurbo::{Rect, Size};

const LABELS: [&str; 9] = ["nw", "n", "ne", "w", "c", "e", "sw", "s", "se"];

fn main() {
    init_logging();

    let mut app = Application::default();
    let window = app.create_window(WindowConfig {
        title: "focus navigation".into(),
        size: Size::new(300.0, 300.0),
        ..WindowConfig::default()
    });
    let content = app.content_view(window).expect("new windows have content");

    let mut buttons = Vec::new();
    for (i, label) in LABELS.into_iter().enumerate() {
        let (col, row) = ((i % 3) as f64, (i / 3) as f64);
        let button = app.create_view(Button { label });
        app.set_name(button, label);
        app.set_bounds(
            button,
            Rect::new(col * 100.0 + 10.0, row * 100.0 + 10.0, col * 100.0 + 90.0, row * 100.0 + 90.0),
        );
        app.add_subview(content, button);
        buttons.push(button);
    }
    app.link_focus_ring(&buttons);
    app.set_initial_focus(window, buttons.first().copied());
    app.open_window(window).expect("headless windows open");

    let keys = [
        (Key::Tab, Modifiers::empty()),
        (Key::Tab, Modifiers::empty()),
        (Key::Down, Modifiers::empty()),
        (Key::Right, Modifiers::empty()),
        (Key::Right, Modifiers::empty()),
        (Key::Tab, Modifiers::SHIFT),
    ];
    for (key, modifiers) in keys {
        let handled = app.window_key_down(window, key, modifiers, false);
        let focus = app
            .window_focus(window)
            .and_then(|v| app.name(v))
            .unwrap_or("none");
        println!("{key:?} {modifiers:?} -> handled: {handled}, focus: {focus}");
    }
}
