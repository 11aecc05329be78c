//! # Linear Arena
//!
//! A bump allocator over a fixed byte region. Nothing is ever freed
//! individually; the only reclamation is rolling the cursor back to a
//! [`Checkpoint`].
//!
//! Allocations are handed out as [`Block`]s, offsets into the region the
//! root arena was created for. A sub-arena carved from a parent covers a
//! slice of the parent's region, so every block from any arena in the tree
//! shares one address space and blocks from disjoint arenas never overlap.

use std::mem::{align_of, size_of};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{ArenaError, ArenaResult};

/// A range handed out by [`Arena::allocate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    offset: usize,
    len: usize,
}

impl Block {
    /// Absolute offset of the first byte.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last byte.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Saved cursor of an arena.
///
/// Not `Clone`: a checkpoint is closed exactly once, by value.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a checkpoint that is never closed never releases its records"]
pub struct Checkpoint {
    arena: u64,
    saved: usize,
}

impl Checkpoint {
    /// Cursor captured when the checkpoint was opened.
    pub fn saved_used(&self) -> usize {
        self.saved
    }
}

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(0);

fn next_arena_id() -> u64 {
    NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed)
}

/// A linear allocator over `[base, base + capacity)`.
///
/// `used` only grows between checkpoints and never exceeds `capacity`.
#[derive(Debug)]
pub struct Arena {
    id: u64,
    base: usize,
    capacity: usize,
    used: usize,
    /// Lowest cursor a rollback may reach. Raised by every carve.
    floor: usize,
}

impl Arena {
    /// Creates a root arena over a region of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            id: next_arena_id(),
            base: 0,
            capacity,
            used: 0,
            floor: 0,
        }
    }

    #[inline]
    pub fn base(&self) -> usize {
        self.base
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn used(&self) -> usize {
        self.used
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.used
    }

    /// Bump-allocates `size` bytes with no alignment requirement.
    pub fn allocate(&mut self, size: usize) -> ArenaResult<Block> {
        self.allocate_aligned(size, 1)
    }

    /// Bump-allocates `size` bytes starting at an absolute offset that is a
    /// multiple of `align`.
    ///
    /// On failure `used` is left untouched.
    pub fn allocate_aligned(&mut self, size: usize, align: usize) -> ArenaResult<Block> {
        if align == 0 || !align.is_power_of_two() {
            return Err(ArenaError::InvalidAlignment(align));
        }

        let start = self.base + self.used;
        let padding = start.wrapping_neg() & (align - 1);
        let requested = padding.saturating_add(size);

        if requested > self.remaining() {
            return Err(ArenaError::OutOfMemory {
                requested,
                used: self.used,
                capacity: self.capacity,
            });
        }

        self.used += requested;
        Ok(Block {
            offset: start + padding,
            len: size,
        })
    }

    /// Reserves room for one `T`.
    pub fn push<T>(&mut self) -> ArenaResult<Block> {
        self.allocate_aligned(size_of::<T>(), align_of::<T>())
    }

    /// Reserves room for `count` contiguous `T`s.
    pub fn push_array<T>(&mut self, count: usize) -> ArenaResult<Block> {
        let size = size_of::<T>()
            .checked_mul(count)
            .ok_or(ArenaError::OutOfMemory {
                requested: usize::MAX,
                used: self.used,
                capacity: self.capacity,
            })?;
        self.allocate_aligned(size, align_of::<T>())
    }

    /// Carves an independent arena of `size` bytes out of the unused space.
    ///
    /// The parent's cursor moves past the carved region for good: no later
    /// checkpoint rollback on the parent may reach back into it.
    pub fn carve(&mut self, size: usize) -> ArenaResult<Arena> {
        self.carve_aligned(size, 1)
    }

    /// Like [`carve`](Self::carve), with the sub-arena's base aligned to `align`.
    pub fn carve_aligned(&mut self, size: usize, align: usize) -> ArenaResult<Arena> {
        let block = self.allocate_aligned(size, align)?;
        self.floor = self.used;

        Ok(Arena {
            id: next_arena_id(),
            base: block.offset,
            capacity: block.len,
            used: 0,
            floor: 0,
        })
    }

    /// Carves a sub-arena sized for exactly `count` values of `T`.
    pub fn carve_for<T>(&mut self, count: usize) -> ArenaResult<Arena> {
        let size = size_of::<T>()
            .checked_mul(count)
            .ok_or(ArenaError::OutOfMemory {
                requested: usize::MAX,
                used: self.used,
                capacity: self.capacity,
            })?;
        self.carve_aligned(size, align_of::<T>())
    }

    /// Opens a temporary-memory transaction by capturing the cursor.
    pub fn begin_temporary(&self) -> Checkpoint {
        Checkpoint {
            arena: self.id,
            saved: self.used,
        }
    }

    /// Closes a transaction, releasing every block allocated since it opened.
    ///
    /// Blocks handed out after `checkpoint` was opened are invalid afterwards.
    pub fn end_temporary(&mut self, checkpoint: Checkpoint) -> ArenaResult<()> {
        if checkpoint.arena != self.id {
            return Err(ArenaError::ForeignCheckpoint {
                expected: checkpoint.arena,
                actual: self.id,
            });
        }
        if checkpoint.saved < self.floor {
            return Err(ArenaError::BelowCarveBoundary {
                saved: checkpoint.saved,
                floor: self.floor,
            });
        }
        if checkpoint.saved > self.used {
            return Err(ArenaError::StaleCheckpoint {
                saved: checkpoint.saved,
                used: self.used,
            });
        }

        self.used = checkpoint.saved;
        Ok(())
    }
}
