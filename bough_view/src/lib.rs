// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bough View: a retained-mode view-tree engine.
//!
//! An [`Application`] owns every view and window. Views are addressed by [`ViewId`]
//! handles and arranged into trees; a tree whose root is a window's content view is
//! attached to that window. On top of the tree the engine provides:
//!
//! - Visibility lifecycle: [`Lifecycle`] hooks fire in will/did pairs whenever a view's
//!   effective visibility in an open window changes.
//! - Focus: one focused view per window, explicit focus rings, preferred-focus
//!   redirects and directional navigation with occlusion (see [`Direction`]).
//! - Relation-scoped messaging: typed listeners, posts filtered by [`Relation`] and
//!   provisions that descendants (or any view) can look up by type.
//! - Input dispatch: pointer events routed by hit testing, key events along the
//!   responder chain with default focus navigation.
//! - Per-frame update hooks and a render traversal with optional texture caching.
//! - Window delegates ([`WindowDelegate`]) notified around open, close, layout, update
//!   and render.
//! - Per-window resource caches and the shared download cache from [`bough_cache`].
//!
//! Everything runs on the thread that owns the application. Hooks receive a [`ViewCx`];
//! mutations they request are queued and applied when the hook returns.
//!
//! ## Example
//!
//! ```
//! use bough_view::{Application, Relation, WindowConfig};
//! use kurbo::Rect;
//!
//! let mut app = Application::default();
//! let window = app.create_window(WindowConfig::default());
//! let content = app.content_view(window).expect("window has content");
//!
//! let panel = app.create_plain_view();
//! app.set_bounds(panel, Rect::new(0.0, 0.0, 200.0, 100.0));
//! app.add_subview(content, panel);
//! app.open_window(window).expect("headless windows always open");
//!
//! assert_eq!(app.window_of(panel), Some(window));
//! assert!(app.is_visible_in_open_window(panel));
//!
//! // Provisions flow down the hierarchy.
//! app.provide(content, 42_u32);
//! assert_eq!(app.inherit::<u32>(panel), Some(&42));
//! assert!(app.has_relation(content, Relation::Ancestor, panel));
//! ```
//!
//! Stale ids are harmless: operations given a destroyed view or window do nothing, and
//! queries return empty values.

mod application;
mod arena;
mod delegate;
mod error;
mod focus;
mod input;
mod lifecycle;
mod message;
mod node;
mod platform;
mod relation;
mod render;
mod resource;
mod tree;
mod types;
mod update;
mod view;
mod window;

pub use bough_focus::Direction;

pub use application::{Application, ApplicationConfig};
pub use delegate::{WindowCx, WindowDelegate};
pub use error::Error;
pub use platform::{HeadlessPlatform, Platform, PlatformError};
pub use relation::Relation;
pub use render::{Render, RenderCx, RenderTarget, RenderTexture, Renderer};
pub use resource::{
    BitmapFont, FileResourceManager, ResourceManager, Texture, TextureSource, WindowCaches,
};
pub use types::{Key, Modifiers, MouseButton, PixelRect, ViewFlags, ViewId, WindowId};
pub use view::{Focusable, HitTest, Input, Lifecycle, Outcome, PlainView, View, ViewCx};
pub use window::{Window, WindowConfig, WindowPosition};
