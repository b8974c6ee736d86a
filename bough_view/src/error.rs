// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{ViewId, WindowId};

/// Errors returned by fallible [`Application`](crate::Application) operations.
///
/// Most tree and focus operations never fail: requests that do not apply (stale ids,
/// ineligible focus targets, removing a view from a view that is not its superview) are
/// silent no-ops.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The view id is stale.
    #[error("view {0:?} does not exist")]
    UnknownView(ViewId),
    /// The window id is stale.
    #[error("window {0:?} does not exist")]
    UnknownWindow(WindowId),
    /// A window's content view lives exactly as long as its window.
    #[error("view {0:?} is the content view of a window and cannot be destroyed directly")]
    ContentView(ViewId),
    /// The platform layer refused to open the native window.
    #[error("platform failed to open window {window:?}")]
    Platform {
        /// The window that stayed closed.
        window: WindowId,
        /// What the platform reported.
        #[source]
        source: crate::PlatformError,
    },
}
