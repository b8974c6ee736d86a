// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational slot storage behind [`ViewId`](crate::ViewId) and
//! [`WindowId`](crate::WindowId).

use core::fmt;
use core::marker::PhantomData;

/// An identifier made of a slot index and a generation.
pub(crate) trait ArenaId: Copy + Eq {
    fn from_parts(idx: u32, generation: u32) -> Self;
    fn idx(self) -> usize;
    fn generation(self) -> u32;
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage where freed slots are reused with a bumped generation.
pub(crate) struct Arena<I, T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
    _id: PhantomData<fn() -> I>,
}

impl<I, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            _id: PhantomData,
        }
    }
}

impl<I, T> fmt::Debug for Arena<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("live", &self.live)
            .field("slots", &self.slots.len())
            .finish_non_exhaustive()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    pub(crate) fn insert(&mut self, value: T) -> I {
        self.live += 1;
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.value = Some(value);
            return I::from_parts(idx, slot.generation);
        }
        let idx = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 1,
            value: Some(value),
        });
        I::from_parts(idx, 1)
    }

    /// The id the next [`Arena::insert`] will return.
    pub(crate) fn next_id(&self) -> I {
        match self.free.last() {
            Some(&idx) => {
                I::from_parts(idx, self.slots[idx as usize].generation.wrapping_add(1))
            }
            None => I::from_parts(u32::try_from(self.slots.len()).unwrap_or(u32::MAX), 1),
        }
    }

    pub(crate) fn remove(&mut self, id: I) -> Option<T> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        let value = slot.value.take()?;
        self.live -= 1;
        if let Ok(idx) = u32::try_from(id.idx()) {
            self.free.push(idx);
        }
        Some(value)
    }

    pub(crate) fn get(&self, id: I) -> Option<&T> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.value.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: I) -> Option<&mut T> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.value.as_mut()
    }

    pub(crate) fn contains(&self, id: I) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            let value = slot.value.as_ref()?;
            let idx = u32::try_from(idx).ok()?;
            Some((I::from_parts(idx, slot.generation), value))
        })
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = I> + '_ {
        self.iter().map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ViewId;

    #[test]
    fn stale_ids_never_alias() {
        let mut arena: Arena<ViewId, &str> = Arena::default();
        let a = arena.insert("a");
        assert_eq!(arena.remove(a), Some("a"));
        let b = arena.insert("b");
        assert_ne!(a, b, "reused slot must have a new generation");
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn next_id_predicts_insert() {
        let mut arena: Arena<ViewId, u8> = Arena::default();
        let predicted = arena.next_id();
        assert_eq!(arena.insert(1), predicted);
        let first = arena.insert(2);
        arena.remove(first);
        let predicted = arena.next_id();
        assert_eq!(arena.insert(3), predicted);
    }
}
