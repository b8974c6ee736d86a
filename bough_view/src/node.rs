// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-view storage held in the application's view arena.

use core::any::{Any, TypeId};
use core::fmt;
use core::time::Duration;

use kurbo::{Rect, Vec2};
use smallvec::SmallVec;

use crate::render::RenderCache;
use crate::view::{View, ViewCx};
use crate::{Relation, ViewFlags, ViewId, WindowId};

/// A type-erased message handler; the sender is `None` for application broadcasts.
pub(crate) struct Listener {
    pub(crate) type_id: TypeId,
    pub(crate) relation: Relation,
    pub(crate) handler: Box<dyn FnMut(&dyn Any, Option<ViewId>)>,
}

/// An object provided to views within `relation` of its provider.
pub(crate) struct Provision {
    pub(crate) type_id: TypeId,
    pub(crate) relation: Relation,
    pub(crate) value: Box<dyn Any>,
}

pub(crate) type UpdateHook = Box<dyn FnMut(&mut ViewCx<'_>, Duration)>;

pub(crate) struct ViewNode {
    pub(crate) name: Option<String>,
    pub(crate) flags: ViewFlags,
    pub(crate) bounds: Rect,
    pub(crate) scale: Vec2,
    pub(crate) superview: Option<ViewId>,
    /// Back to front; the last element is frontmost.
    pub(crate) subviews: SmallVec<[ViewId; 4]>,
    pub(crate) window: Option<WindowId>,
    pub(crate) preferred_focus: Option<ViewId>,
    pub(crate) next_focus: Option<ViewId>,
    pub(crate) previous_focus: Option<ViewId>,
    pub(crate) subview_with_mouse: Option<ViewId>,
    pub(crate) listeners: Vec<Listener>,
    /// Newest first.
    pub(crate) provisions: Vec<Provision>,
    pub(crate) update_hooks: Vec<(String, UpdateHook)>,
    pub(crate) render_cache: RenderCache,
    /// Taken out while one of its hooks runs.
    pub(crate) behavior: Option<Box<dyn View>>,
}

impl ViewNode {
    pub(crate) fn new(behavior: Box<dyn View>) -> Self {
        Self {
            name: None,
            flags: ViewFlags::default(),
            bounds: Rect::ZERO,
            scale: Vec2::new(1.0, 1.0),
            superview: None,
            subviews: SmallVec::new(),
            window: None,
            preferred_focus: None,
            next_focus: None,
            previous_focus: None,
            subview_with_mouse: None,
            listeners: Vec::new(),
            provisions: Vec::new(),
            update_hooks: Vec::new(),
            render_cache: RenderCache::default(),
            behavior: Some(behavior),
        }
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.flags.contains(ViewFlags::VISIBLE)
    }

    pub(crate) fn listener_types(&self) -> SmallVec<[TypeId; 4]> {
        let mut types: SmallVec<[TypeId; 4]> = SmallVec::new();
        for listener in &self.listeners {
            if !types.contains(&listener.type_id) {
                types.push(listener.type_id);
            }
        }
        types
    }
}

impl fmt::Debug for ViewNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewNode")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("bounds", &self.bounds)
            .field("superview", &self.superview)
            .field("subviews", &self.subviews)
            .field("window", &self.window)
            .field("listeners", &self.listeners.len())
            .field("provisions", &self.provisions.len())
            .finish_non_exhaustive()
    }
}
