//! Two-phase bulk construction with scoped rollback.
//!
//! Building a list of `n` elements happens in two passes:
//!
//! 1. **Allocate.** Reserve the sentinel and `n` raw nodes and link them
//!    into a complete ring. No value exists yet.
//! 2. **Construct.** Walk the ring in link order and construct one value
//!    per node.
//!
//! Because the ring is fully linked before the first value is built, the
//! rollback path can always walk it and tell, by position, which nodes hold
//! a live value: exactly the first `constructed` ones. [`RingBuilder`] owns
//! the partially-built ring and performs that rollback in `Drop`, so an
//! `Err` from a constructor and a panic unwinding through one take the
//! same cleanup path.

use std::marker::PhantomData;
use std::ptr::NonNull;

use stackring_arena::{AllocError, Allocator};

use crate::node::{allocate_node, deallocate_node, next, splice_before, value_ptr, Link, Node};

/// Drop the values of the first `constructed` nodes after `sentinel`, then
/// deallocate every node in the ring, the sentinel last.
///
/// A value whose `Drop` panics does not stop the release: the remaining
/// nodes are still dropped and freed while the panic unwinds.
///
/// # Safety
///
/// `sentinel` must anchor a well-formed ring allocated from `nodes` (or an
/// allocator equal to it) in which exactly the first `constructed` value
/// nodes hold initialised values. The ring is gone afterwards.
pub(crate) unsafe fn release_ring<T, N>(nodes: &N, sentinel: NonNull<Link>, constructed: usize)
where
    N: Allocator<Value = Node<T>>,
{
    let mut release = RingRelease::<T, N> {
        nodes,
        sentinel,
        // SAFETY: the sentinel is live per the caller.
        cursor: unsafe { next(sentinel) },
        live_values: constructed,
        _marker: PhantomData,
    };
    // SAFETY: forwarded from the caller.
    unsafe { release.run() };
    std::mem::forget(release);
}

/// Walks a ring being released. Its `Drop` only runs when a value's
/// destructor panicked mid-walk, and finishes the job.
struct RingRelease<'n, T, N>
where
    N: Allocator<Value = Node<T>>,
{
    nodes: &'n N,
    sentinel: NonNull<Link>,
    /// Next node to release; everything before it is already freed.
    cursor: NonNull<Link>,
    /// Nodes from `cursor` onward that still hold a value.
    live_values: usize,
    _marker: PhantomData<T>,
}

impl<T, N> RingRelease<'_, T, N>
where
    N: Allocator<Value = Node<T>>,
{
    /// # Safety
    ///
    /// Same contract as [`release_ring`] for the nodes from `cursor` on.
    unsafe fn run(&mut self) {
        // SAFETY: each node's successor is read, and its value moved out,
        // before the node is freed; state is advanced before the value is
        // dropped so a panicking destructor leaves it consistent.
        unsafe {
            while self.cursor != self.sentinel {
                let node = self.cursor;
                self.cursor = next(node);
                let value = if self.live_values > 0 {
                    self.live_values -= 1;
                    Some(value_ptr::<T>(node).read())
                } else {
                    None
                };
                deallocate_node::<T, N>(self.nodes, node);
                drop(value);
            }
            deallocate_node::<T, N>(self.nodes, self.sentinel);
        }
    }
}

impl<T, N> Drop for RingRelease<'_, T, N>
where
    N: Allocator<Value = Node<T>>,
{
    fn drop(&mut self) {
        // SAFETY: the walk stopped inside a value's destructor, after the
        // node holding it was freed; the rest of the ring is intact.
        unsafe { self.run() }
    }
}

/// A fully-linked ring whose values are being constructed front to back.
///
/// Dropping a builder that has not finished rolls the ring back with
/// [`release_ring`].
pub(crate) struct RingBuilder<'n, T, N>
where
    N: Allocator<Value = Node<T>>,
{
    nodes: &'n N,
    sentinel: NonNull<Link>,
    /// The next node to receive a value.
    cursor: NonNull<Link>,
    /// Nodes before `cursor` hold live values.
    constructed: usize,
    len: usize,
    _marker: PhantomData<T>,
}

impl<'n, T, N> RingBuilder<'n, T, N>
where
    N: Allocator<Value = Node<T>>,
{
    /// Phase 1: allocate a sentinel plus `len` raw nodes, linked in order.
    ///
    /// If an allocation fails, every node reserved so far is returned to
    /// `nodes` before the error is reported.
    pub(crate) fn allocate(nodes: &'n N, len: usize) -> Result<Self, AllocError> {
        let sentinel = allocate_node::<T, N>(nodes)?;
        for allocated in 0..len {
            match allocate_node::<T, N>(nodes) {
                // SAFETY: sentinel anchors a well-formed ring and node is
                // fresh and detached.
                Ok(node) => unsafe { splice_before(sentinel, node) },
                Err(err) => {
                    tracing::debug!(allocated, len, "node allocation failed mid-build");
                    // SAFETY: the ring holds only raw nodes from `nodes`.
                    unsafe { release_ring::<T, N>(nodes, sentinel, 0) };
                    return Err(err);
                }
            }
        }
        Ok(Self {
            nodes,
            sentinel,
            // SAFETY: sentinel is live and linked.
            cursor: unsafe { next(sentinel) },
            constructed: 0,
            len,
            _marker: PhantomData,
        })
    }

    /// Phase 2: construct every value in link order with `make(index)`.
    ///
    /// On success the finished ring's sentinel is returned and ownership
    /// passes to the caller. If `make` fails, the values built so far are
    /// dropped, all nodes are deallocated, and the constructor's error is
    /// returned unchanged.
    pub(crate) fn construct<E, F>(mut self, mut make: F) -> Result<NonNull<Link>, E>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        while self.cursor != self.sentinel {
            let value = make(self.constructed)?;
            // SAFETY: cursor is a raw value node in the ring whose slot has
            // not been initialised yet.
            unsafe {
                value_ptr::<T>(self.cursor).write(value);
                self.cursor = next(self.cursor);
            }
            self.constructed += 1;
        }
        debug_assert_eq!(self.constructed, self.len);
        let sentinel = self.sentinel;
        std::mem::forget(self);
        Ok(sentinel)
    }
}

impl<T, N> Drop for RingBuilder<'_, T, N>
where
    N: Allocator<Value = Node<T>>,
{
    fn drop(&mut self) {
        tracing::debug!(
            constructed = self.constructed,
            allocated = self.len,
            "rolling back partially constructed list"
        );
        // SAFETY: the builder owns a well-formed ring in which exactly the
        // first `constructed` value nodes are initialised.
        unsafe { release_ring::<T, N>(self.nodes, self.sentinel, self.constructed) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use stackring_arena::Global;

    struct DropCounter(Rc<Cell<usize>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn construct_fills_in_link_order() {
        let nodes = Global::<Node<usize>>::new();
        let builder = RingBuilder::allocate(&nodes, 4).unwrap();
        let sentinel = builder
            .construct(|i| Ok::<_, ()>(i * 10))
            .unwrap();
        let mut seen = Vec::new();
        unsafe {
            let mut cur = next(sentinel);
            while cur != sentinel {
                seen.push(*value_ptr::<usize>(cur));
                cur = next(cur);
            }
            release_ring::<usize, _>(&nodes, sentinel, 4);
        }
        assert_eq!(seen, vec![0, 10, 20, 30]);
    }

    #[test]
    fn failed_construct_drops_only_built_values() {
        let drops = Rc::new(Cell::new(0));
        let nodes = Global::<Node<DropCounter>>::new();
        let builder = RingBuilder::allocate(&nodes, 10).unwrap();
        let result = builder.construct(|i| {
            if i == 4 {
                Err("boom")
            } else {
                Ok(DropCounter(Rc::clone(&drops)))
            }
        });
        assert_eq!(result.err(), Some("boom"));
        assert_eq!(drops.get(), 4);
    }

    #[test]
    fn panicking_construct_rolls_back() {
        let drops = Rc::new(Cell::new(0));
        let nodes = Global::<Node<DropCounter>>::new();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let builder = RingBuilder::allocate(&nodes, 5).unwrap();
            let _ = builder.construct(|i| {
                assert!(i < 2, "constructor panicked");
                Ok::<_, ()>(DropCounter(Rc::clone(&drops)))
            });
        }));
        assert!(outcome.is_err());
        assert_eq!(drops.get(), 2);
    }

    struct LoudDrop(Rc<Cell<usize>>, bool);

    impl Drop for LoudDrop {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
            assert!(!self.1, "destructor panicked");
        }
    }

    #[test]
    fn panicking_destructor_does_not_stop_release() {
        let drops = Rc::new(Cell::new(0));
        let nodes = Global::<Node<LoudDrop>>::new();
        let sentinel = RingBuilder::allocate(&nodes, 5)
            .unwrap()
            .construct(|i| Ok::<_, ()>(LoudDrop(Rc::clone(&drops), i == 1)))
            .unwrap();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| unsafe {
            release_ring::<LoudDrop, _>(&nodes, sentinel, 5);
        }));
        assert!(outcome.is_err());
        assert_eq!(drops.get(), 5);
    }

    #[test]
    fn empty_build_is_just_a_sentinel() {
        let nodes = Global::<Node<u8>>::new();
        let sentinel = RingBuilder::allocate(&nodes, 0)
            .unwrap()
            .construct(|_| Ok::<u8, ()>(0))
            .unwrap();
        unsafe {
            assert_eq!(next(sentinel), sentinel);
            release_ring::<u8, _>(&nodes, sentinel, 0);
        }
    }
}
