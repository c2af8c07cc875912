//! The allocator-aware doubly-linked list.

use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use stackring_arena::{AllocError, Allocator, Global};

use crate::build::{release_ring, RingBuilder};
use crate::cursor::{Cursor, CursorMut, ListCursor};
use crate::error::ListError;
use crate::iter::{IntoIter, Iter, IterMut};
use crate::node::{allocate_node, next, prev, value_ptr, Link, NodeAlloc};

/// A circular, sentinel-terminated, doubly-linked list generic over its
/// allocator.
///
/// `A` is the user-facing element allocator. The list rebinds it to its
/// internal node type once, at construction, and routes every node
/// allocation (the sentinel included) through that rebound instance.
///
/// Every operation that creates nodes reports allocation failure instead
/// of aborting, and bulk constructors roll back completely on failure: no
/// node stays allocated and no constructed element is leaked.
///
/// The list is not thread-safe.
pub struct List<T, A: Allocator<Value = T> = Global<T>> {
    pub(crate) sentinel: NonNull<Link>,
    pub(crate) len: usize,
    pub(crate) alloc: A,
    pub(crate) nodes: NodeAlloc<T, A>,
    _marker: PhantomData<T>,
}

impl<T, A: Allocator<Value = T> + Default> List<T, A> {
    /// An empty list using a default-constructed allocator.
    ///
    /// Even an empty list owns a sentinel node, so this can fail.
    pub fn new() -> Result<Self, AllocError> {
        Self::new_in(A::default())
    }
}

impl<T, A: Allocator<Value = T>> List<T, A> {
    /// An empty list allocating from `alloc`.
    pub fn new_in(alloc: A) -> Result<Self, AllocError> {
        let nodes: NodeAlloc<T, A> = alloc.rebind();
        let sentinel = allocate_node::<T, NodeAlloc<T, A>>(&nodes)?;
        Ok(Self {
            sentinel,
            len: 0,
            alloc,
            nodes,
            _marker: PhantomData,
        })
    }

    /// A list of `len` default-constructed elements.
    ///
    /// All nodes are allocated before the first element is constructed. If
    /// `T::default()` panics, everything built so far is released before
    /// the panic continues.
    pub fn with_len_in(len: usize, alloc: A) -> Result<Self, AllocError>
    where
        T: Default,
    {
        Self::with_len_of(len, |_| Ok::<T, Infallible>(T::default()), alloc)
            .map_err(AllocError::from)
    }

    /// A list of `len` clones of `value`.
    pub fn from_elem_in(len: usize, value: &T, alloc: A) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        Self::with_len_of(len, |_| Ok::<T, Infallible>(value.clone()), alloc)
            .map_err(AllocError::from)
    }

    /// A list of `len` elements built by `make(index)`.
    ///
    /// All `len` nodes are allocated and linked first; then `make` runs once
    /// per node in order. If `make` returns `Err`, the elements already
    /// built are dropped, every node is deallocated, and the error comes
    /// back as [`ListError::Construct`].
    pub fn try_from_fn_in<E, F>(len: usize, make: F, alloc: A) -> Result<Self, ListError<E>>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        Self::with_len_of(len, make, alloc)
    }

    /// A list holding the items of `iter`, in order.
    ///
    /// Items are appended one at a time. If a node allocation fails, the
    /// partial list is dropped and the error returned.
    pub fn from_iter_in<I>(iter: I, alloc: A) -> Result<Self, AllocError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut list = Self::new_in(alloc)?;
        for value in iter {
            list.push_back(value)?;
        }
        Ok(list)
    }

    fn with_len_of<E, F>(len: usize, make: F, alloc: A) -> Result<Self, ListError<E>>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        let nodes: NodeAlloc<T, A> = alloc.rebind();
        let sentinel = RingBuilder::<T, NodeAlloc<T, A>>::allocate(&nodes, len)?
            .construct(make)
            .map_err(ListError::Construct)?;
        Ok(Self {
            sentinel,
            len,
            alloc,
            nodes,
            _marker: PhantomData,
        })
    }

    // ── Copying ─────────────────────────────────────────────────────

    /// A deep copy, using the allocator chosen by
    /// [`Allocator::select_on_copy`].
    pub fn try_clone(&self) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        self.try_clone_with(|value| Ok::<T, Infallible>(value.clone()))
            .map_err(AllocError::from)
    }

    /// A deep copy made with a fallible per-element copier.
    ///
    /// Same two-phase protocol as [`try_from_fn_in`](Self::try_from_fn_in):
    /// if `copy` fails part way, the partial copy is rolled back and the
    /// error returned. `self` is never modified.
    pub fn try_clone_with<E, F>(&self, copy: F) -> Result<Self, ListError<E>>
    where
        F: FnMut(&T) -> Result<T, E>,
    {
        self.try_clone_in(self.alloc.select_on_copy(), copy)
    }

    /// A deep copy into an explicitly chosen allocator.
    pub fn try_clone_in<E, F>(&self, alloc: A, mut copy: F) -> Result<Self, ListError<E>>
    where
        F: FnMut(&T) -> Result<T, E>,
    {
        // SAFETY: self.sentinel anchors a live ring.
        let mut source = unsafe { next(self.sentinel) };
        Self::with_len_of(
            self.len,
            |_| {
                // SAFETY: the copy has exactly self.len nodes, so this runs
                // self.len times and `source` is always a live value node of
                // self, which stays borrowed for the whole build.
                let value = unsafe {
                    let value = &*value_ptr::<T>(source);
                    source = next(source);
                    value
                };
                copy(value)
            },
            alloc,
        )
    }

    /// Copy-assign from `source`.
    ///
    /// Builds a complete copy first and only then swaps it in, so on
    /// failure `self` is untouched. The copy is built with `source`'s
    /// allocator when `A::PROPAGATE_ON_COPY_ASSIGNMENT` is set, otherwise
    /// with a clone of `self`'s own; either way that allocator ends up
    /// owning the new contents.
    pub fn try_clone_from(&mut self, source: &Self) -> Result<(), AllocError>
    where
        T: Clone,
    {
        self.try_clone_from_with(source, |value| Ok::<T, Infallible>(value.clone()))
            .map_err(AllocError::from)
    }

    /// Copy-assign from `source` with a fallible per-element copier.
    pub fn try_clone_from_with<E, F>(&mut self, source: &Self, copy: F) -> Result<(), ListError<E>>
    where
        F: FnMut(&T) -> Result<T, E>,
    {
        let alloc = if A::PROPAGATE_ON_COPY_ASSIGNMENT {
            source.alloc.clone()
        } else {
            self.alloc.clone()
        };
        let mut replacement = source.try_clone_in(alloc, copy)?;
        self.swap_contents(&mut replacement);
        std::mem::swap(&mut self.alloc, &mut replacement.alloc);
        Ok(())
    }

    // ── Swapping ────────────────────────────────────────────────────

    /// Exchange the contents of two lists. Never fails.
    ///
    /// Allocators travel with the contents when `A::PROPAGATE_ON_SWAP` is
    /// set. Otherwise each list keeps its own allocator. Nodes are always
    /// released through the node allocator that travelled with them, so
    /// unequal non-propagating allocators stay memory-safe; they are only
    /// reported.
    pub fn swap(&mut self, other: &mut Self) {
        self.swap_contents(other);
        if A::PROPAGATE_ON_SWAP {
            std::mem::swap(&mut self.alloc, &mut other.alloc);
        } else if self.alloc == other.alloc {
            // Equal allocators can free each other's nodes: hand the node
            // allocators back so each list keeps its own instance.
            std::mem::swap(&mut self.nodes, &mut other.nodes);
        } else {
            tracing::warn!("swapping lists with unequal, non-propagating allocators");
        }
    }

    /// Swap sentinels, lengths and node allocators.
    fn swap_contents(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.sentinel, &mut other.sentinel);
        std::mem::swap(&mut self.len, &mut other.len);
        std::mem::swap(&mut self.nodes, &mut other.nodes);
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The element allocator.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// The first element.
    pub fn front(&self) -> Option<&T> {
        self.iter().next()
    }

    /// The last element.
    pub fn back(&self) -> Option<&T> {
        self.iter().next_back()
    }

    /// The first element, mutably.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.iter_mut().next()
    }

    /// The last element, mutably.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.iter_mut().next_back()
    }

    // ── Cursors and iterators ───────────────────────────────────────

    /// Cursor on the first element (the end position if empty).
    pub fn cursor_front(&self) -> Cursor<'_, T, A> {
        // SAFETY: the sentinel is always live.
        ListCursor::at(self, unsafe { next(self.sentinel) })
    }

    /// Cursor on the last element (the end position if empty).
    pub fn cursor_back(&self) -> Cursor<'_, T, A> {
        // SAFETY: the sentinel is always live.
        ListCursor::at(self, unsafe { prev(self.sentinel) })
    }

    /// Cursor on the end position, one past the last element.
    pub fn cursor_end(&self) -> Cursor<'_, T, A> {
        ListCursor::at(self, self.sentinel)
    }

    /// Mutable cursor on the first element.
    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, T, A> {
        // SAFETY: the sentinel is always live.
        let first = unsafe { next(self.sentinel) };
        ListCursor::at(self, first)
    }

    /// Mutable cursor on the last element.
    pub fn cursor_back_mut(&mut self) -> CursorMut<'_, T, A> {
        // SAFETY: the sentinel is always live.
        let last = unsafe { prev(self.sentinel) };
        ListCursor::at(self, last)
    }

    /// Mutable cursor on the end position.
    pub fn cursor_end_mut(&mut self) -> CursorMut<'_, T, A> {
        let sentinel = self.sentinel;
        ListCursor::at(self, sentinel)
    }

    /// Front-to-back iterator; `.rev()` walks back to front.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.sentinel, self.len)
    }

    /// Front-to-back iterator over mutable references.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.sentinel, self.len)
    }

    // ── Mutation ────────────────────────────────────────────────────

    /// Prepend `value`.
    pub fn push_front(&mut self, value: T) -> Result<(), AllocError> {
        self.cursor_front_mut().insert(value)
    }

    /// Append `value`.
    pub fn push_back(&mut self, value: T) -> Result<(), AllocError> {
        self.cursor_end_mut().insert(value)
    }

    /// Remove and return the first element.
    pub fn pop_front(&mut self) -> Option<T> {
        self.cursor_front_mut().erase()
    }

    /// Remove and return the last element.
    pub fn pop_back(&mut self) -> Option<T> {
        self.cursor_back_mut().erase()
    }

    /// Drop every element, keeping the sentinel.
    pub fn clear(&mut self) {
        let mut cursor = self.cursor_front_mut();
        while cursor.erase().is_some() {}
    }
}

impl<T, A: Allocator<Value = T>> Drop for List<T, A> {
    fn drop(&mut self) {
        // SAFETY: the ring is well-formed, allocated from self.nodes, and all
        // self.len value nodes hold live values.
        unsafe { release_ring::<T, NodeAlloc<T, A>>(&self.nodes, self.sentinel, self.len) }
    }
}

impl<T: fmt::Debug, A: Allocator<Value = T>> fmt::Debug for List<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, A: Allocator<Value = T>, B: Allocator<Value = T>> PartialEq<List<T, B>>
    for List<T, A>
{
    fn eq(&self, other: &List<T, B>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq, A: Allocator<Value = T>> Eq for List<T, A> {}

impl<'a, T, A: Allocator<Value = T>> IntoIterator for &'a List<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T, A: Allocator<Value = T>> IntoIterator for &'a mut List<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

impl<T, A: Allocator<Value = T>> IntoIterator for List<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> IntoIter<T, A> {
        IntoIter::new(self)
    }
}
