//! The allocator contract used by stackring containers.
//!
//! An [`Allocator`] is a typed, cloneable handle that hands out raw,
//! uninitialised storage for `count` values of its [`Value`] type.
//! Containers separate this raw acquisition from value construction, so
//! an allocator never runs constructors or destructors.
//!
//! Besides allocate/deallocate, the contract carries:
//!
//! - **Rebinding** ([`Allocator::rebind`]): an equivalent allocator for a
//!   different value type, backed by the same resource. Containers use this
//!   to allocate their internal node type from a user-facing element
//!   allocator.
//! - **Equality** (`PartialEq`): two handles compare equal iff each can free
//!   what the other allocated.
//! - **Propagation policies**: compile-time flags consulted by containers on
//!   copy-assignment and swap, plus [`Allocator::select_on_copy`] for copy
//!   construction.
//!
//! [`Value`]: Allocator::Value

use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::error::AllocError;

/// A typed source of raw storage.
///
/// # Safety
///
/// Implementors must guarantee that a successful `allocate(count)` returns
/// a pointer that is aligned for `Self::Value`, valid for reads and writes
/// of `count * size_of::<Self::Value>()` bytes, and not aliased by any
/// other live allocation, until it is passed to `deallocate` on an
/// allocator that compares equal (or the backing resource is dropped).
/// Rebound allocators must share the backing resource, and `==` must only
/// return `true` for handles that can free each other's allocations.
pub unsafe trait Allocator: Clone + PartialEq {
    /// The type this allocator hands out storage for.
    type Value;

    /// This allocator, re-parameterised on another value type.
    type Rebind<U>: Allocator<Value = U>;

    /// Whether copy-assigning a container also copies the source's allocator.
    const PROPAGATE_ON_COPY_ASSIGNMENT: bool = false;

    /// Whether swapping two containers also swaps their allocators.
    const PROPAGATE_ON_SWAP: bool = false;

    /// Allocate uninitialised storage for `count` values.
    fn allocate(&self, count: usize) -> Result<NonNull<Self::Value>, AllocError>;

    /// Return storage obtained from `allocate`. Must not fail.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate(count)` on this allocator
    /// or one that compares equal, and must not have been deallocated since.
    /// Any values stored there must already have been dropped or moved out.
    unsafe fn deallocate(&self, ptr: NonNull<Self::Value>, count: usize);

    /// An allocator for `U` backed by the same resource.
    fn rebind<U>(&self) -> Self::Rebind<U>;

    /// The allocator a copy-constructed container should use.
    ///
    /// Defaults to a clone of `self`.
    fn select_on_copy(&self) -> Self {
        self.clone()
    }
}

/// Byte size of `count` values of `T`, or [`AllocError::SizeOverflow`].
pub fn array_size<T>(count: usize) -> Result<usize, AllocError> {
    let elem_size = std::mem::size_of::<T>();
    elem_size
        .checked_mul(count)
        .ok_or(AllocError::SizeOverflow { count, elem_size })
}

/// The global heap, as an [`Allocator`].
///
/// Stateless: all instances compare equal, and nothing propagates because
/// there is nothing to propagate.
pub struct Global<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Global<T> {
    /// A handle to the global heap.
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Global<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Global<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Global<T> {}

impl<T, U> PartialEq<Global<U>> for Global<T> {
    fn eq(&self, _other: &Global<U>) -> bool {
        true
    }
}

impl<T> Eq for Global<T> {}

impl<T> fmt::Debug for Global<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Global")
    }
}

// SAFETY: storage comes from `std::alloc` with `Layout::array::<T>`, which
// is aligned and sized for `count` values; zero-sized requests get a
// dangling, well-aligned pointer and are never passed back to the heap.
unsafe impl<T> Allocator for Global<T> {
    type Value = T;
    type Rebind<U> = Global<U>;

    fn allocate(&self, count: usize) -> Result<NonNull<T>, AllocError> {
        let layout = Layout::array::<T>(count).map_err(|_| AllocError::SizeOverflow {
            count,
            elem_size: std::mem::size_of::<T>(),
        })?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }
        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        NonNull::new(raw.cast::<T>()).ok_or(AllocError::OutOfMemory {
            requested: layout.size(),
        })
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, count: usize) {
        let Ok(layout) = Layout::array::<T>(count) else {
            return;
        };
        if layout.size() != 0 {
            // SAFETY: the caller guarantees ptr came from `allocate(count)`,
            // which used this same layout.
            unsafe { alloc::dealloc(ptr.as_ptr().cast::<u8>(), layout) }
        }
    }

    fn rebind<U>(&self) -> Global<U> {
        Global::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_allocates_aligned_storage() {
        let heap = Global::<u64>::new();
        let p = heap.allocate(4).unwrap();
        assert_eq!(p.as_ptr() as usize % std::mem::align_of::<u64>(), 0);
        unsafe {
            for i in 0..4 {
                p.as_ptr().add(i).write(i as u64 * 10);
            }
            assert_eq!(*p.as_ptr().add(3), 30);
            heap.deallocate(p, 4);
        }
    }

    #[test]
    fn global_zero_sized_requests_are_dangling() {
        let heap = Global::<u32>::new();
        let p = heap.allocate(0).unwrap();
        assert_eq!(p, NonNull::dangling());
        unsafe { heap.deallocate(p, 0) };

        let unit = Global::<()>::new();
        assert!(unit.allocate(1000).is_ok());
    }

    #[test]
    fn global_rejects_overflowing_counts() {
        let heap = Global::<u64>::new();
        assert!(matches!(
            heap.allocate(usize::MAX),
            Err(AllocError::SizeOverflow { elem_size: 8, .. })
        ));
    }

    #[test]
    fn global_instances_are_always_equal() {
        let a = Global::<u8>::new();
        let b: Global<String> = a.rebind();
        assert!(a == b);
        assert!(a == a.select_on_copy());
        assert!(!<Global<u8> as Allocator>::PROPAGATE_ON_SWAP);
        assert!(!<Global<u8> as Allocator>::PROPAGATE_ON_COPY_ASSIGNMENT);
    }

    #[test]
    fn array_size_detects_overflow() {
        assert_eq!(array_size::<u32>(4), Ok(16));
        assert_eq!(
            array_size::<u32>(usize::MAX),
            Err(AllocError::SizeOverflow {
                count: usize::MAX,
                elem_size: 4,
            })
        );
    }
}
