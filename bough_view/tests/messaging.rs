// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relation-scoped messages and provisions.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use bough_view::{Application, Relation, ViewId};
use common::open_window;

type Received = Rc<RefCell<Vec<(ViewId, i32, Option<ViewId>)>>>;

fn record(received: &Received, me: ViewId) -> impl FnMut(&i32, Option<ViewId>) + 'static {
    let received = Rc::clone(received);
    move |message, sender| received.borrow_mut().push((me, *message, sender))
}

#[test]
fn posts_reach_listeners_in_both_relations() {
    let mut app = Application::default();
    let a = app.create_plain_view();
    let b = app.create_plain_view();
    let c = app.create_plain_view();
    let received = Received::default();

    // Registered while detached; delivery starts once attached.
    app.listen::<i32>(b, Relation::Ancestor, record(&received, b));
    app.listen::<i32>(c, Relation::Ancestor, record(&received, c));

    let (_, content) = open_window(&mut app);
    app.add_subview(content, a);
    app.add_subview(a, b);
    app.add_subview(a, c);

    assert_eq!(app.post(a, &7, Relation::Descendant), 2);
    assert_eq!(
        *received.borrow(),
        vec![(b, 7, Some(a)), (c, 7, Some(a))]
    );
    received.borrow_mut().clear();

    app.listen::<i32>(a, Relation::Descendant, record(&received, a));
    assert_eq!(app.post(b, &5, Relation::Ancestor), 1);
    assert_eq!(*received.borrow(), vec![(a, 5, Some(b))]);
    received.borrow_mut().clear();

    // c listens to ancestors only, so a sibling post reaches nobody.
    assert_eq!(app.post(b, &3, Relation::Sibling), 0);
    assert!(received.borrow().is_empty());
}

#[test]
fn broadcasts_ignore_relations() {
    let mut app = Application::default();
    let (_, content) = open_window(&mut app);
    let a = app.create_plain_view();
    let b = app.create_plain_view();
    app.add_subview(content, a);
    app.add_subview(a, b);
    let received = Received::default();
    app.listen::<i32>(b, Relation::Sibling, record(&received, b));

    assert_eq!(app.broadcast(&7), 1);
    assert_eq!(*received.borrow(), vec![(b, 7, None)]);
}

#[test]
fn detached_views_neither_send_nor_receive() {
    let mut app = Application::default();
    let (_, content) = open_window(&mut app);
    let attached = app.create_plain_view();
    let loose = app.create_plain_view();
    app.add_subview(content, attached);
    let received = Received::default();
    app.listen::<i32>(attached, Relation::Any, record(&received, attached));
    app.listen::<i32>(loose, Relation::Any, record(&received, loose));

    assert_eq!(app.post(loose, &1, Relation::Any), 0);
    assert_eq!(app.post(content, &2, Relation::Any), 1);
    assert_eq!(*received.borrow(), vec![(attached, 2, Some(content))]);

    app.remove_from_superview(attached);
    assert_eq!(app.broadcast(&3), 0);
}

#[test]
fn any_reaches_other_open_windows() {
    let mut app = Application::default();
    let (_, first) = open_window(&mut app);
    let (second_window, second) = open_window(&mut app);
    let received = Received::default();
    app.listen::<i32>(second, Relation::Any, record(&received, second));

    assert_eq!(app.post(first, &9, Relation::Any), 1);
    assert_eq!(app.post(first, &9, Relation::Hierarchy), 0);

    app.close_window(second_window);
    assert_eq!(app.post(first, &9, Relation::Any), 0);
}

#[derive(Debug, PartialEq)]
struct State {
    x: i32,
}

#[test]
fn provisions_are_inherited_and_mutable() {
    let mut app = Application::default();
    let a = app.create_plain_view();
    let b = app.create_plain_view();
    let c = app.create_plain_view();
    app.provide(a, 0_i32);
    app.add_subview(a, b);
    app.add_subview(b, c);

    assert_eq!(app.get::<i32>(a), Some(&0));
    assert_eq!(app.inherit::<i32>(b), Some(&0));
    assert_eq!(app.inherit::<i32>(c), Some(&0));
    assert_eq!(app.get::<i32>(c), None);

    app.provide(a, State { x: 7 });
    if let Some(state) = app.get_mut::<State>(a) {
        state.x = 8;
    }
    assert_eq!(app.get::<State>(a), Some(&State { x: 8 }));
}

#[test]
fn nearer_and_newer_provisions_shadow() {
    let mut app = Application::default();
    let a = app.create_plain_view();
    let b = app.create_plain_view();
    let c = app.create_plain_view();
    app.add_subview(a, b);
    app.add_subview(b, c);
    app.set_global("app");
    assert_eq!(app.inherit::<&str>(c), Some(&"app"), "falls back to the application");

    app.provide(a, "a");
    assert_eq!(app.inherit::<&str>(c), Some(&"a"));
    app.provide(b, "b");
    assert_eq!(app.inherit::<&str>(c), Some(&"b"));
    app.provide(b, "b2");
    assert_eq!(app.inherit::<&str>(c), Some(&"b2"));

    // Scoped to siblings, so descendants of the provider cannot see it.
    app.provide_scoped(c, 1_u8, Relation::Sibling);
    let d = app.create_plain_view();
    app.add_subview(b, d);
    assert_eq!(app.find::<u8>(d, Relation::Sibling), Some(&1));
    assert_eq!(app.find::<u8>(b, Relation::Descendant), None);
}
