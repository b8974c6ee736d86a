// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relation-scoped messaging and provisions.
//!
//! ## Messages
//!
//! A view listens for messages of a type `M` from senders standing in some [`Relation`] to
//! it. A post names the relation the sender wants to reach. A listener receives the
//! message only when both hold: the listener is in the posted relation to the sender, and
//! the sender is in the listener's relation to the listener.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use bough_view::{Application, Relation, WindowConfig};
//!
//! let mut app = Application::default();
//! let window = app.create_window(WindowConfig::default());
//! app.open_window(window).unwrap();
//! let content = app.content_view(window).unwrap();
//!
//! let parent = app.create_plain_view();
//! let child = app.create_plain_view();
//! app.add_subview(content, parent);
//! app.add_subview(parent, child);
//!
//! let seen = Rc::new(Cell::new(0));
//! let sink = Rc::clone(&seen);
//! app.listen::<u32>(child, Relation::Ancestor, move |n, _sender| sink.set(*n));
//!
//! assert_eq!(app.post(parent, &7_u32, Relation::Descendant), 1);
//! assert_eq!(seen.get(), 7);
//! ```
//!
//! Only views attached to an open window take part; listeners registered while detached
//! start receiving once the view is attached.
//!
//! ## Provisions
//!
//! A view can provide a value to the views within a relation of it. Lookups walk the
//! views in that relation of the finder, nearest first, and fall back to the
//! application-wide store for [`Relation::Hierarchy`], [`Relation::Any`] and
//! [`Relation::Ancestor`].

use core::any::{Any, TypeId};

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::node::{Listener, Provision};
use crate::{Application, Relation, ViewId};

/// Index from message type to the window-attached views listening for it.
#[derive(Debug, Default)]
pub(crate) struct Router {
    by_type: HashMap<TypeId, SmallVec<[ViewId; 4]>>,
}

impl Router {
    pub(crate) fn register_view(&mut self, view: ViewId, types: &[TypeId]) {
        for type_id in types {
            let views = self.by_type.entry(*type_id).or_default();
            if !views.contains(&view) {
                views.push(view);
            }
        }
    }

    pub(crate) fn unregister_view(&mut self, view: ViewId) {
        self.by_type.retain(|_, views| {
            views.retain(|v| *v != view);
            !views.is_empty()
        });
    }

    fn listeners(&self, type_id: TypeId) -> SmallVec<[ViewId; 4]> {
        self.by_type.get(&type_id).cloned().unwrap_or_default()
    }
}

impl Application {
    /// Listen on `view` for messages of type `M` from senders that are `relation` of it.
    ///
    /// The handler gets the message and its sender, which is `None` for
    /// [`Application::broadcast`].
    pub fn listen<M: Any>(
        &mut self,
        view: ViewId,
        relation: Relation,
        mut handler: impl FnMut(&M, Option<ViewId>) + 'static,
    ) {
        let Some(node) = self.views.get_mut(view) else {
            return;
        };
        let type_id = TypeId::of::<M>();
        node.listeners.push(Listener {
            type_id,
            relation,
            handler: Box::new(move |message, sender| {
                if let Some(message) = message.downcast_ref::<M>() {
                    handler(message, sender);
                }
            }),
        });
        if node.window.is_some() {
            self.router.register_view(view, &[type_id]);
        }
    }

    /// Drop every listener on `view`.
    pub fn remove_listeners(&mut self, view: ViewId) {
        if let Some(node) = self.views.get_mut(view) {
            node.listeners.clear();
        }
        self.router.unregister_view(view);
    }

    /// Send `message` from `sender` to listeners that are `relation` of it.
    ///
    /// Returns the number of handlers called. Senders not attached to an open window reach
    /// nobody.
    pub fn post<M: Any>(&mut self, sender: ViewId, message: &M, relation: Relation) -> usize {
        if self.window_of(sender).is_none() {
            tracing::trace!(?sender, "post from a view without a window");
            return 0;
        }
        let type_id = TypeId::of::<M>();
        let mut deliveries: SmallVec<[(ViewId, usize); 8]> = SmallVec::new();
        for listener_view in self.router.listeners(type_id) {
            if !self.has_relation(listener_view, relation, sender) {
                continue;
            }
            let Some(node) = self.views.get(listener_view) else {
                continue;
            };
            for (i, listener) in node.listeners.iter().enumerate() {
                if listener.type_id == type_id
                    && self.has_relation(sender, listener.relation, listener_view)
                {
                    deliveries.push((listener_view, i));
                }
            }
        }
        self.deliver(message, Some(sender), &deliveries)
    }

    /// Send `message` to every listener of its type, regardless of relation.
    ///
    /// Handlers see `None` as the sender.
    pub fn broadcast<M: Any>(&mut self, message: &M) -> usize {
        let type_id = TypeId::of::<M>();
        let mut deliveries: SmallVec<[(ViewId, usize); 8]> = SmallVec::new();
        for listener_view in self.router.listeners(type_id) {
            let Some(node) = self.views.get(listener_view) else {
                continue;
            };
            deliveries.extend(
                node.listeners
                    .iter()
                    .enumerate()
                    .filter(|(_, l)| l.type_id == type_id)
                    .map(|(i, _)| (listener_view, i)),
            );
        }
        self.deliver(message, None, &deliveries)
    }

    fn deliver(
        &mut self,
        message: &dyn Any,
        sender: Option<ViewId>,
        deliveries: &[(ViewId, usize)],
    ) -> usize {
        let mut delivered = 0;
        for &(view, index) in deliveries {
            if let Some(listener) = self
                .views
                .get_mut(view)
                .and_then(|node| node.listeners.get_mut(index))
            {
                (listener.handler)(message, sender);
                delivered += 1;
            }
        }
        delivered
    }

    // --- Provisions ---

    /// Provide `value` from `view` to every view in the same hierarchy.
    pub fn provide<T: Any>(&mut self, view: ViewId, value: T) {
        self.provide_scoped(view, value, Relation::Hierarchy);
    }

    /// Provide `value` from `view` to views that are `relation` of it.
    ///
    /// Newer provisions of the same type shadow older ones.
    pub fn provide_scoped<T: Any>(&mut self, view: ViewId, value: T, relation: Relation) {
        if let Some(node) = self.views.get_mut(view) {
            node.provisions.insert(
                0,
                Provision {
                    type_id: TypeId::of::<T>(),
                    relation,
                    value: Box::new(value),
                },
            );
        }
    }

    /// The value of type `T` provided by `view` itself.
    pub fn get<T: Any>(&self, view: ViewId) -> Option<&T> {
        self.find(view, Relation::Self_)
    }

    /// Mutable access to the value of type `T` provided by `view` itself.
    pub fn get_mut<T: Any>(&mut self, view: ViewId) -> Option<&mut T> {
        self.find_mut(view, Relation::Self_)
    }

    /// The nearest value of type `T` provided by an ancestor of `view`, or by the
    /// application.
    pub fn inherit<T: Any>(&self, view: ViewId) -> Option<&T> {
        self.find(view, Relation::Ancestor)
    }

    /// The first value of type `T` provided within `relation` of `view`.
    pub fn find<T: Any>(&self, view: ViewId, relation: Relation) -> Option<&T> {
        match self.locate_provision::<T>(view, relation) {
            Some((provider, index)) => self
                .views
                .get(provider)?
                .provisions
                .get(index)?
                .value
                .downcast_ref(),
            None if relation.falls_back_to_application() => self.global(),
            None => None,
        }
    }

    /// Mutable access to the first value of type `T` provided within `relation` of `view`.
    pub fn find_mut<T: Any>(&mut self, view: ViewId, relation: Relation) -> Option<&mut T> {
        match self.locate_provision::<T>(view, relation) {
            Some((provider, index)) => self
                .views
                .get_mut(provider)?
                .provisions
                .get_mut(index)?
                .value
                .downcast_mut(),
            None if relation.falls_back_to_application() => self.global_mut(),
            None => None,
        }
    }

    fn locate_provision<T: Any>(&self, finder: ViewId, relation: Relation) -> Option<(ViewId, usize)> {
        let type_id = TypeId::of::<T>();
        self.relation_scope(finder, relation)
            .into_iter()
            .find_map(|provider| {
                let node = self.views.get(provider)?;
                node.provisions
                    .iter()
                    .position(|p| {
                        p.type_id == type_id && self.has_relation(finder, p.relation, provider)
                    })
                    .map(|index| (provider, index))
            })
    }

    /// The views standing in `relation` to `id`, nearest first.
    fn relation_scope(&self, id: ViewId, relation: Relation) -> Vec<ViewId> {
        if !self.views.contains(id) {
            return Vec::new();
        }
        match relation {
            Relation::Self_ => vec![id],
            Relation::Ancestor => self.ancestors(id).collect(),
            Relation::Descendant => self.subtree(id).into_iter().skip(1).collect(),
            Relation::Sibling => match self.superview(id) {
                Some(superview) => self
                    .subviews(superview)
                    .iter()
                    .copied()
                    .filter(|v| *v != id)
                    .collect(),
                None => Vec::new(),
            },
            Relation::Hierarchy => self.subtree(self.root_of(id)),
            Relation::Any => {
                let own = self.root_of(id);
                let mut views = self.subtree(own);
                for (_, window) in self.windows.iter() {
                    if window.is_open && window.content != own {
                        views.extend(self.subtree(window.content));
                    }
                }
                views
            }
        }
    }

    /// Store `value` application-wide, shadowing older values of the same type.
    pub fn set_global<T: Any>(&mut self, value: T) {
        self.provisions.insert(
            0,
            Provision {
                type_id: TypeId::of::<T>(),
                relation: Relation::Any,
                value: Box::new(value),
            },
        );
    }

    /// The newest application-wide value of type `T`.
    pub fn global<T: Any>(&self) -> Option<&T> {
        self.provisions
            .iter()
            .find_map(|p| p.value.downcast_ref::<T>())
    }

    /// Mutable access to the newest application-wide value of type `T`.
    pub fn global_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.provisions
            .iter_mut()
            .find_map(|p| p.value.downcast_mut::<T>())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::WindowConfig;

    #[test]
    fn both_relations_must_hold() {
        let mut app = Application::default();
        let w = app.create_window(WindowConfig::default());
        app.open_window(w).expect("headless open");
        let content = app.content_view(w).expect("content");
        let a = app.create_plain_view();
        let b = app.create_plain_view();
        let c = app.create_plain_view();

        let log = Rc::new(RefCell::new(Vec::new()));
        let (lb, lc) = (Rc::clone(&log), Rc::clone(&log));
        app.listen::<i32>(b, Relation::Ancestor, move |m, sender| {
            lb.borrow_mut().push(("b", *m, sender));
        });
        app.listen::<i32>(c, Relation::Ancestor, move |m, sender| {
            lc.borrow_mut().push(("c", *m, sender));
        });

        app.add_subview(content, a);
        app.add_subview(a, b);
        app.add_subview(a, c);

        assert_eq!(app.post(a, &7, Relation::Descendant), 2);
        assert_eq!(
            *log.borrow(),
            vec![("b", 7, Some(a)), ("c", 7, Some(a))]
        );

        log.borrow_mut().clear();
        // b is a sibling of c, but c only listens to ancestors.
        assert_eq!(app.post(b, &5, Relation::Sibling), 0);

        let la = Rc::clone(&log);
        app.listen::<i32>(a, Relation::Descendant, move |m, sender| {
            la.borrow_mut().push(("a", *m, sender));
        });
        assert_eq!(app.post(b, &5, Relation::Ancestor), 1);
        assert_eq!(*log.borrow(), vec![("a", 5, Some(b))]);
    }

    #[test]
    fn messages_are_keyed_by_type() {
        let mut app = Application::default();
        let w = app.create_window(WindowConfig::default());
        app.open_window(w).expect("headless open");
        let content = app.content_view(w).expect("content");
        let a = app.create_plain_view();
        app.add_subview(content, a);
        app.listen::<String>(a, Relation::Any, |_, _| {});
        assert_eq!(app.post(content, &1_u8, Relation::Any), 0);
        assert_eq!(app.post(content, &String::from("hi"), Relation::Any), 1);
        assert_eq!(app.broadcast(&String::from("all")), 1);
    }

    #[test]
    fn detached_views_neither_send_nor_receive() {
        let mut app = Application::default();
        let a = app.create_plain_view();
        let b = app.create_plain_view();
        app.add_subview(a, b);
        app.listen::<i32>(b, Relation::Any, |_, _| {});
        assert_eq!(app.post(a, &1, Relation::Any), 0);
        assert_eq!(app.broadcast(&1), 0);
    }

    #[test]
    fn provisions_resolve_nearest_first() {
        struct State {
            x: i32,
        }

        let mut app = Application::default();
        let a = app.create_plain_view();
        let b = app.create_plain_view();
        let c = app.create_plain_view();
        app.provide(a, 0_i32);
        app.add_subview(a, b);
        app.add_subview(b, c);

        assert!(app.get::<i32>(a).is_some());
        assert!(app.get::<i32>(b).is_none());
        assert!(app.inherit::<i32>(b).is_some());
        assert!(app.inherit::<i32>(c).is_some());

        app.provide(b, 1_i32);
        assert_eq!(app.inherit::<i32>(c), Some(&1));

        app.provide(a, State { x: 7 });
        if let Some(state) = app.get_mut::<State>(a) {
            state.x = 8;
        }
        assert_eq!(app.get::<State>(a).map(|s| s.x), Some(8));
    }

    #[test]
    fn scoped_provisions_respect_their_relation() {
        let mut app = Application::default();
        let a = app.create_plain_view();
        let b = app.create_plain_view();
        let c = app.create_plain_view();
        app.add_subview(a, b);
        app.add_subview(a, c);
        app.provide_scoped(b, "sibling only", Relation::Sibling);

        assert_eq!(app.find::<&str>(c, Relation::Sibling), Some(&"sibling only"));
        assert_eq!(app.find::<&str>(a, Relation::Descendant), None);
    }

    #[test]
    fn application_store_is_the_fallback() {
        let mut app = Application::default();
        let a = app.create_plain_view();
        app.set_global(42_u64);
        assert_eq!(app.inherit::<u64>(a), Some(&42));
        assert_eq!(app.find::<u64>(a, Relation::Hierarchy), Some(&42));
        assert_eq!(app.get::<u64>(a), None);
        assert_eq!(app.find::<u64>(a, Relation::Sibling), None);

        app.provide(a, 1_u64);
        assert_eq!(app.find::<u64>(a, Relation::Hierarchy), Some(&1));
    }
}
