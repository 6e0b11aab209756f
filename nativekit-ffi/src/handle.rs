//! Generation-checked handle arenas.
//!
//! A handle is a 64-bit token laid out as `[kind:8 | generation:24 | slot:32]`.
//! The slot field stores `index + 1`, so the all-zero token is never produced
//! and serves as the null handle. Releasing a slot bumps its generation, which
//! turns every outstanding copy of the old token into a detectable mismatch.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};

/// Opaque handle passed across the boundary. `0` is the null handle.
pub type NkHandle = u64;

/// The null handle.
pub const NK_NULL_HANDLE: NkHandle = 0;

const SLOT_BITS: u32 = 32;
const GENERATION_BITS: u32 = 24;
const GENERATION_MASK: u64 = (1 << GENERATION_BITS) - 1;
const MAX_GENERATION: u32 = (1 << GENERATION_BITS) - 1;

/// Resource kind encoded in the top byte of every handle.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Sequence = 1,
    Text = 2,
    Matrix = 3,
    Buffer = 4,
    Function = 5,
    Iterator = 6,
}

impl Kind {
    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Sequence),
            2 => Some(Self::Text),
            3 => Some(Self::Matrix),
            4 => Some(Self::Buffer),
            5 => Some(Self::Function),
            6 => Some(Self::Iterator),
            _ => None,
        }
    }

    /// Kind tag of a token, if it carries a known one.
    #[must_use]
    pub fn of(handle: NkHandle) -> Option<Self> {
        Self::from_tag((handle >> (SLOT_BITS + GENERATION_BITS)) as u8)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sequence => "vector",
            Self::Text => "string",
            Self::Matrix => "matrix",
            Self::Buffer => "buffer",
            Self::Function => "function",
            Self::Iterator => "iterator",
        })
    }
}

fn encode(kind: Kind, generation: u32, index: u32) -> NkHandle {
    (u64::from(kind as u8) << (SLOT_BITS + GENERATION_BITS))
        | ((u64::from(generation) & GENERATION_MASK) << SLOT_BITS)
        | (u64::from(index) + 1)
}

/// Split a token into `(generation, index)` for the expected kind.
fn decode(kind: Kind, handle: NkHandle) -> Option<(u32, usize)> {
    if Kind::of(handle) != Some(kind) {
        return None;
    }
    let slot = (handle & u64::from(u32::MAX)) as u32;
    let generation = ((handle >> SLOT_BITS) & GENERATION_MASK) as u32;
    slot.checked_sub(1).map(|index| (generation, index as usize))
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slots for one resource kind plus the free list of released indices.
pub(crate) struct Arena<T> {
    kind: Kind,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new(kind: Kind) -> Self {
        Self {
            kind,
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Store a value and return its handle.
    pub(crate) fn insert(&mut self, value: T) -> Result<NkHandle> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let index = u32::try_from(self.slots.len())
                    .ok()
                    .filter(|&i| i < u32::MAX)
                    .ok_or_else(|| Error::Memory(format!("{} arena is full", self.kind)))?;
                self.slots.try_reserve(1)?;
                self.slots.push(Slot {
                    generation: 1,
                    value: None,
                });
                index
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.value = Some(value);
        self.live += 1;
        Ok(encode(self.kind, slot.generation, index))
    }

    fn slot_index(&self, handle: NkHandle) -> Result<usize> {
        if handle == NK_NULL_HANDLE {
            return Err(Error::NullHandle);
        }
        let stale = || Error::StaleHandle {
            kind: self.kind,
            handle,
        };
        let (generation, index) = decode(self.kind, handle).ok_or_else(stale)?;
        match self.slots.get(index) {
            Some(slot) if slot.generation == generation && slot.value.is_some() => Ok(index),
            _ => Err(stale()),
        }
    }

    pub(crate) fn get(&self, handle: NkHandle) -> Result<&T> {
        let index = self.slot_index(handle)?;
        self.slots[index]
            .value
            .as_ref()
            .ok_or(Error::StaleHandle {
                kind: self.kind,
                handle,
            })
    }

    pub(crate) fn get_mut(&mut self, handle: NkHandle) -> Result<&mut T> {
        let index = self.slot_index(handle)?;
        let kind = self.kind;
        self.slots[index]
            .value
            .as_mut()
            .ok_or(Error::StaleHandle { kind, handle })
    }

    /// Take the value out and retire the token.
    pub(crate) fn remove(&mut self, handle: NkHandle) -> Result<T> {
        let index = self.slot_index(handle)?;
        let slot = &mut self.slots[index];
        let value = slot.value.take().ok_or(Error::StaleHandle {
            kind: self.kind,
            handle,
        })?;
        self.live -= 1;
        // A slot whose generation is exhausted is never handed out again.
        if slot.generation < MAX_GENERATION {
            slot.generation += 1;
            self.free.push(index as u32);
        }
        Ok(value)
    }

    pub(crate) fn contains(&self, handle: NkHandle) -> bool {
        self.slot_index(handle).is_ok()
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }
}

/// A process-wide arena behind a mutex, one per resource kind.
pub(crate) struct Registry<T> {
    arena: Mutex<Arena<T>>,
}

impl<T> Registry<T> {
    pub(crate) const fn new(kind: Kind) -> Self {
        Self {
            arena: Mutex::new(Arena::new(kind)),
        }
    }

    /// Lock the arena. A poisoned lock is recovered: every mutation leaves the
    /// arena consistent before anything that may panic runs.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Arena<T>> {
        self.arena.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn insert(&self, value: T) -> Result<NkHandle> {
        let mut arena = self.lock();
        let handle = arena.insert(value)?;
        tracing::debug!(kind = %arena.kind, handle, live = arena.len(), "created");
        Ok(handle)
    }

    pub(crate) fn remove(&self, handle: NkHandle) -> Result<T> {
        let mut arena = self.lock();
        let value = arena.remove(handle)?;
        tracing::debug!(kind = %arena.kind, handle, live = arena.len(), "destroyed");
        Ok(value)
    }

    /// Run `f` against the resource behind `handle`.
    pub(crate) fn with<R>(&self, handle: NkHandle, f: impl FnOnce(&T) -> Result<R>) -> Result<R> {
        f(self.lock().get(handle)?)
    }

    /// Run `f` against the resource behind `handle`, mutably.
    pub(crate) fn with_mut<R>(
        &self,
        handle: NkHandle,
        f: impl FnOnce(&mut T) -> Result<R>,
    ) -> Result<R> {
        f(self.lock().get_mut(handle)?)
    }

    pub(crate) fn contains(&self, handle: NkHandle) -> bool {
        self.lock().contains(handle)
    }
}
