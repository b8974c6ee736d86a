// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: view and window identifiers, view flags, input values, and pixel areas.

use crate::arena::ArenaId;

/// Identifier for a view owned by an [`Application`](crate::Application).
///
/// This is a small, copyable handle made of a slot index and a generation counter.
///
/// - Creating a view allocates a slot; destroying it frees the slot.
/// - A reused slot gets a higher generation, so a stale `ViewId` never aliases a different
///   live view. Operations given a stale id do nothing.
/// - Use [`Application::is_alive`](crate::Application::is_alive) to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ViewId(u32, u32);

/// Identifier for a window owned by an [`Application`](crate::Application).
///
/// Same semantics as [`ViewId`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct WindowId(u32, u32);

impl ArenaId for ViewId {
    fn from_parts(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    fn idx(self) -> usize {
        self.0 as usize
    }

    fn generation(self) -> u32 {
        self.1
    }
}

impl ArenaId for WindowId {
    fn from_parts(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    fn idx(self) -> usize {
        self.0 as usize
    }

    fn generation(self) -> u32 {
        self.1
    }
}

bitflags::bitflags! {
    /// Per-view flags controlling visibility, input interception and render caching.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ViewFlags: u16 {
        /// The view's own visibility flag.
        const VISIBLE              = 1 << 0;
        /// The view receives pointer input that hits it.
        const INTERCEPTS           = 1 << 1;
        /// Subviews are offered pointer input before this view.
        const CHILDREN_INTERCEPT   = 1 << 2;
        /// Rendering and hit testing of subviews is limited to this view's bounds.
        const CLIPS_TO_BOUNDS      = 1 << 3;
        /// The view renders into its own texture, composited by `post_render`.
        const RENDERS_TO_TEXTURE   = 1 << 4;
        /// The view keeps its rendered texture until the render cache is invalidated.
        const CACHES_RENDER        = 1 << 5;
    }
}

impl Default for ViewFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::INTERCEPTS | Self::CHILDREN_INTERCEPT | Self::CLIPS_TO_BOUNDS
    }
}

/// A mouse button.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (usually left) button.
    Left,
    /// Middle button or wheel press.
    Middle,
    /// Secondary (usually right) button.
    Right,
    /// Any other button, by platform index.
    Other(u8),
}

/// A key on the keyboard, as far as the engine cares about it.
///
/// Keys the engine never interprets are passed through as [`Key::Other`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Tab; moves along the focus ring.
    Tab,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Return / Enter.
    Enter,
    /// Escape.
    Escape,
    /// A printable character.
    Char(char),
    /// A platform key code with no dedicated variant.
    Other(u32),
}

bitflags::bitflags! {
    /// Keyboard modifiers held during a key event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Either shift key.
        const SHIFT = 1 << 0;
        /// Either control key.
        const CTRL  = 1 << 1;
        /// Either alt / option key.
        const ALT   = 1 << 2;
        /// Either super / command key.
        const SUPER = 1 << 3;
    }
}

/// An integer pixel rectangle in render-target space, with a top-left origin.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl PixelRect {
    /// Create a pixel rectangle.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true if the rectangle covers no pixels.
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Right edge (exclusive).
    pub const fn max_x(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    pub const fn max_y(&self) -> i32 {
        self.y + self.height
    }

    /// The overlapping part of two rectangles; empty rectangles have zero size.
    pub fn intersect(&self, other: &Self) -> Self {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let max_x = self.max_x().min(other.max_x());
        let max_y = self.max_y().min(other.max_y());
        Self::new(x, y, (max_x - x).max(0), (max_y - y).max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags_match_a_plain_view() {
        let flags = ViewFlags::default();
        assert!(flags.contains(ViewFlags::VISIBLE | ViewFlags::INTERCEPTS));
        assert!(!flags.contains(ViewFlags::RENDERS_TO_TEXTURE));
    }

    #[test]
    fn pixel_rect_intersection() {
        let a = PixelRect::new(0, 0, 10, 10);
        let b = PixelRect::new(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), PixelRect::new(5, 5, 5, 5));
        let c = PixelRect::new(20, 20, 5, 5);
        assert!(a.intersect(&c).is_empty());
    }
}
