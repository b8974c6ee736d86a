// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The boundary to the native windowing layer.

use hashbrown::HashSet;
use kurbo::Size;

use crate::{WindowConfig, WindowId};

/// Errors reported by a [`Platform`].
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// Native window creation failed.
    #[error("native window creation failed: {0}")]
    Creation(String),
    /// No display is available to open windows on.
    #[error("no display available")]
    NoDisplay,
}

/// Native windowing services the engine calls into.
///
/// Event pumps live on the other side of this boundary: they feed input into
/// [`Application`](crate::Application) dispatch methods.
pub trait Platform {
    /// Create and show the native window for `window`.
    fn open_window(&mut self, window: WindowId, config: &WindowConfig)
    -> Result<(), PlatformError>;

    /// Destroy the native window for `window`.
    fn close_window(&mut self, window: WindowId);

    /// Render target size in device pixels for a window of logical `size`.
    fn render_size(&self, _window: WindowId, size: Size) -> Size {
        size
    }

    /// Ratio of device pixels to logical pixels for `window`.
    fn device_render_scale(&self, _window: WindowId) -> f64 {
        1.0
    }
}

/// A platform with no native windows, for tests and offscreen use.
#[derive(Debug, Clone)]
pub struct HeadlessPlatform {
    pub(crate) open: HashSet<WindowId>,
    /// When true, every `open_window` call fails with [`PlatformError::NoDisplay`].
    pub refuse_open: bool,
    /// Value reported by [`Platform::device_render_scale`].
    pub device_scale: f64,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self {
            open: HashSet::new(),
            refuse_open: false,
            device_scale: 1.0,
        }
    }
}

impl HeadlessPlatform {
    /// Create a headless platform that opens every window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of native windows currently open.
    pub fn open_windows(&self) -> usize {
        self.open.len()
    }
}

impl Platform for HeadlessPlatform {
    fn open_window(
        &mut self,
        window: WindowId,
        _config: &WindowConfig,
    ) -> Result<(), PlatformError> {
        if self.refuse_open {
            return Err(PlatformError::NoDisplay);
        }
        self.open.insert(window);
        Ok(())
    }

    fn close_window(&mut self, window: WindowId) {
        self.open.remove(&window);
    }

    fn render_size(&self, _window: WindowId, size: Size) -> Size {
        size * self.device_scale
    }

    fn device_render_scale(&self, _window: WindowId) -> f64 {
        self.device_scale
    }
}
