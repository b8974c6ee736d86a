// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relation-scoped messages and provisions.
//!
//! A toolbar posts `Command`s to its ancestors; the document view listens for them and
//! looks up a shared `Theme` provided at the window root.
//!
//! Run:
//! - `cargo run -p bough_demos --example messaging`

use std::cell::RefCell;
use std::rc::Rc;

use bough_demos::init_logging;
use bough_view::{Application, Relation, WindowConfig};

#[derive(Debug)]
enum Command {
    Save,
    Close,
}

#[derive(Debug)]
struct Theme {
    name: &'static str,
}

fn main() {
    init_logging();

    let mut app = Application::default();
    let window = app.create_window(WindowConfig::default());
    let content = app.content_view(window).expect("new windows have content");
    let document = app.create_plain_view();
    let toolbar = app.create_plain_view();
    app.add_subview(content, document);
    app.add_subview(document, toolbar);
    app.open_window(window).expect("headless windows open");

    app.provide(content, Theme { name: "dusk" });
    app.set_global(Theme { name: "default" });

    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    app.listen::<Command>(document, Relation::Descendant, move |command, sender| {
        sink.borrow_mut().push(format!("{command:?} from {sender:?}"));
    });

    for command in [Command::Save, Command::Close] {
        let delivered = app.post(toolbar, &command, Relation::Ancestor);
        println!("posted {command:?} to {delivered} listener(s)");
    }
    // Siblings of the toolbar are not its ancestors, so this reaches nobody.
    println!(
        "sibling post reached {} listener(s)",
        app.post(toolbar, &Command::Save, Relation::Sibling)
    );
    for line in log.borrow().iter() {
        println!("document received {line}");
    }

    let theme = app.inherit::<Theme>(toolbar).map_or("none", |t| t.name);
    println!("toolbar inherits theme {theme}");
    let detached = app.create_plain_view();
    let theme = app.inherit::<Theme>(detached).map_or("none", |t| t.name);
    println!("a detached view falls back to theme {theme}");
}
