// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus transitions between root→target paths.
//!
//! ```
//! use bough_focus::FocusEvent;
//! assert_eq!(
//!     FocusEvent::between(&[1_u32, 2], &[1, 3]),
//!     vec![FocusEvent::Lost(2), FocusEvent::Gained(3)]
//! );
//! ```

use alloc::vec::Vec;

/// A focus transition for one node on a focus path.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FocusEvent<K> {
    /// The node no longer contains the focus (emitted inner→outer).
    Lost(K),
    /// The node now contains the focus (emitted outer→inner).
    Gained(K),
}

impl<K: Copy + Eq> FocusEvent<K> {
    /// Transitions from `old` to `new`, both root→target paths.
    ///
    /// Nodes in the shared prefix stay focused and get no event. The rest of `old` loses
    /// focus, innermost first; the rest of `new` gains it, outermost first.
    pub fn between(old: &[K], new: &[K]) -> Vec<Self> {
        let shared = old
            .iter()
            .zip(new.iter())
            .take_while(|(a, b)| a == b)
            .count();
        let mut out = Vec::with_capacity(old.len() + new.len() - 2 * shared);
        out.extend(old[shared..].iter().rev().map(|&k| Self::Lost(k)));
        out.extend(new[shared..].iter().map(|&k| Self::Gained(k)));
        out
    }
}
