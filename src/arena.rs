// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0

//! A bump allocator that short-lived parser strings are carved from, freed
//! in one pass when the arena is dropped.
//!
//! This is a sibling object to [`crate::Builder`] rather than a field owned by it,
//! so that the builder's node and reference records can borrow arena-owned text
//! without the builder being self-referential.

use bumpalo::Bump;

/// Hint for the arena's initial block size; not a contract.
pub const INITIAL_BLOCK_SIZE: usize = 20 * 1024 * 1024;

/// A bump allocator for attribute text and character data extracted while
/// consuming parser events. Every string and byte slice returned by this type
/// lives exactly as long as the arena does.
#[derive(Default)]
pub struct CharArena {
    bump: Bump,
}

impl CharArena {
    /// Create a new, empty arena with the hinted initial capacity.
    pub fn new() -> Self {
        Self {
            bump: Bump::with_capacity(INITIAL_BLOCK_SIZE),
        }
    }

    /// Copy `s` into the arena and return a reference with the arena's lifetime.
    pub fn alloc_str<'a>(&'a self, s: &str) -> &'a str {
        self.bump.alloc_str(s)
    }

    /// Copy `bytes` into the arena and return a reference with the arena's lifetime.
    pub fn alloc_bytes<'a>(&'a self, bytes: &[u8]) -> &'a [u8] {
        self.bump.alloc_slice_copy(bytes)
    }

    /// Total bytes currently allocated from this arena across all chunks.
    /// Dropping the arena and creating a fresh one for the next load returns
    /// this to a stable baseline rather than growing unbounded across loads.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}
