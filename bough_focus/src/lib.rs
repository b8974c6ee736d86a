// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bough Focus: focus primitives independent of any particular view tree.
//!
//! This crate provides the pieces a view engine composes into focus management:
//!
//! - [`Direction`] and [`FocusRegions`]: collect window-space candidate regions (with
//!   occlusion by later regions) and choose the best candidate in a direction.
//! - [`FocusEvent::between`]: lost/gained transitions between two root→target focus
//!   paths, skipping nodes that stay on both.
//! - [`walk_ring`]: a bounded walk over an explicit, possibly cyclic, focus ring.
//!
//! It is `no_std` and uses `alloc`. Geometry comes from [`kurbo`].
//!
//! ## Directional selection
//!
//! ```
//! use bough_focus::{Direction, FocusRegions};
//! use kurbo::Rect;
//!
//! let mut regions = FocusRegions::new();
//! regions.push(1_u32, Rect::new(50.0, 0.0, 60.0, 10.0));
//! regions.push(2_u32, Rect::new(50.0, 50.0, 60.0, 60.0));
//!
//! let current = Rect::new(0.0, 0.0, 10.0, 10.0);
//! assert_eq!(regions.best_in_direction(current, Direction::Right), Some(1));
//! assert_eq!(regions.best_in_direction(current, Direction::DownRight), Some(2));
//! ```
//!
//! ## Focus rings
//!
//! ```
//! use bough_focus::walk_ring;
//!
//! // 0 -> 1 -> 2 -> 0, only 1 is eligible.
//! let next = |k: usize| Some((k + 1) % 3);
//! assert_eq!(walk_ring(2, next, |k| k == 1, 3), Some(1));
//! assert_eq!(walk_ring(1, next, |k| k == 1, 3), None);
//! ```

#![no_std]

extern crate alloc;

mod direction;
mod ring;
mod transition;

pub use direction::{Direction, FocusRegion, FocusRegions, subtract_rect};
pub use ring::walk_ring;
pub use transition::FocusEvent;
