//! Non-owning allocator handles onto an [`Arena`].

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::allocator::{array_size, Allocator};
use crate::arena::Arena;
use crate::error::AllocError;

/// A copyable handle that allocates `T` storage from a borrowed [`Arena`].
///
/// `deallocate` is a no-op: the arena only reclaims memory when it is
/// dropped, and the borrow keeps every container built on this handle from
/// outliving it. Handles on the same arena compare equal regardless of
/// their value type.
pub struct ArenaAllocator<'a, T> {
    arena: &'a Arena,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T> ArenaAllocator<'a, T> {
    /// A handle onto `arena`.
    pub fn new(arena: &'a Arena) -> Self {
        Self {
            arena,
            _marker: PhantomData,
        }
    }

    /// The arena this handle allocates from.
    pub fn arena(&self) -> &'a Arena {
        self.arena
    }
}

impl<'a, T> From<&'a Arena> for ArenaAllocator<'a, T> {
    fn from(arena: &'a Arena) -> Self {
        Self::new(arena)
    }
}

impl<T> Clone for ArenaAllocator<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ArenaAllocator<'_, T> {}

impl<'a, T, U> PartialEq<ArenaAllocator<'a, U>> for ArenaAllocator<'a, T> {
    fn eq(&self, other: &ArenaAllocator<'a, U>) -> bool {
        std::ptr::eq(self.arena, other.arena)
    }
}

impl<T> Eq for ArenaAllocator<'_, T> {}

impl<T> fmt::Debug for ArenaAllocator<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaAllocator")
            .field("arena", &(self.arena as *const Arena))
            .field("value", &std::any::type_name::<T>())
            .finish()
    }
}

// SAFETY: `Arena::reserve` returns disjoint, in-bounds ranges aligned as
// requested, and the arena buffer stays allocated for `'a`. Equal handles
// share one arena, so either may "free" the other's storage (a no-op).
unsafe impl<'a, T> Allocator for ArenaAllocator<'a, T> {
    type Value = T;
    type Rebind<U> = ArenaAllocator<'a, U>;

    fn allocate(&self, count: usize) -> Result<NonNull<T>, AllocError> {
        let size = array_size::<T>(count)?;
        self.arena
            .reserve(size, std::mem::align_of::<T>())
            .map(NonNull::cast)
    }

    unsafe fn deallocate(&self, _ptr: NonNull<T>, _count: usize) {}

    fn rebind<U>(&self) -> ArenaAllocator<'a, U> {
        ArenaAllocator::new(self.arena)
    }
}
