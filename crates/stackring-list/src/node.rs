//! Node layout and raw ring surgery.
//!
//! Every list is a circular, doubly-linked ring anchored at a sentinel.
//! The sentinel and the value nodes share one allocation type,
//! [`Node<T>`], so a single rebound allocator serves both; the sentinel's
//! value slot is simply never initialised.
//!
//! All traversal happens over [`NonNull<Link>`]. `Node<T>` is `repr(C)`
//! with the link first, so a node pointer and its link pointer are the same
//! address.
//!
//! Functions here are `unsafe` and do no bookkeeping beyond the links; the
//! list and the ring builder own the count and the allocator.

use std::alloc::Layout;
use std::mem::MaybeUninit;
use std::ptr::NonNull;

use stackring_arena::{AllocError, Allocator};

/// Previous/next pointers shared by the sentinel and value nodes.
#[repr(C)]
pub(crate) struct Link {
    pub(crate) prev: NonNull<Link>,
    pub(crate) next: NonNull<Link>,
}

/// One allocation unit: links plus a value slot.
#[repr(C)]
pub struct Node<T> {
    link: Link,
    value: MaybeUninit<T>,
}

/// The node allocator a list derives from its element allocator `A`.
pub(crate) type NodeAlloc<T, A> = <A as Allocator>::Rebind<Node<T>>;

/// Size and alignment of one list node holding a `T`.
///
/// A list of `n` elements makes `n + 1` allocations of this layout (the
/// extra one is the sentinel), which is what an arena needs to hold.
pub fn node_layout<T>() -> Layout {
    Layout::new::<Node<T>>()
}

/// Allocate one node whose links point at itself. The value is left
/// uninitialised.
pub(crate) fn allocate_node<T, N>(nodes: &N) -> Result<NonNull<Link>, AllocError>
where
    N: Allocator<Value = Node<T>>,
{
    let link = nodes.allocate(1)?.cast::<Link>();
    // SAFETY: freshly allocated storage for a Node<T>, whose first field is
    // the Link; writing a whole Link initialises exactly that field.
    unsafe {
        link.as_ptr().write(Link {
            prev: link,
            next: link,
        });
    }
    Ok(link)
}

/// Return a node's storage to `nodes` without touching its value.
///
/// # Safety
///
/// `link` must come from [`allocate_node`] on an allocator equal to `nodes`,
/// its value must already be dropped or moved out (or never initialised),
/// and nothing may reach it afterwards.
pub(crate) unsafe fn deallocate_node<T, N>(nodes: &N, link: NonNull<Link>)
where
    N: Allocator<Value = Node<T>>,
{
    // SAFETY: forwarded from the caller.
    unsafe { nodes.deallocate(link.cast::<Node<T>>(), 1) }
}

/// Pointer to the value slot of the node at `link`.
///
/// # Safety
///
/// `link` must point at a live `Node<T>` allocation (not necessarily one
/// whose value is initialised).
#[inline]
pub(crate) unsafe fn value_ptr<T>(link: NonNull<Link>) -> *mut T {
    let node = link.cast::<Node<T>>().as_ptr();
    // SAFETY: node is a live allocation per the caller; addr_of_mut does
    // not create a reference to possibly-uninitialised data.
    unsafe { std::ptr::addr_of_mut!((*node).value).cast::<T>() }
}

/// The node after `link`.
///
/// # Safety
///
/// `link` must point at a live node whose links are initialised.
#[inline]
pub(crate) unsafe fn next(link: NonNull<Link>) -> NonNull<Link> {
    // SAFETY: forwarded from the caller.
    unsafe { (*link.as_ptr()).next }
}

/// The node before `link`.
///
/// # Safety
///
/// `link` must point at a live node whose links are initialised.
#[inline]
pub(crate) unsafe fn prev(link: NonNull<Link>) -> NonNull<Link> {
    // SAFETY: forwarded from the caller.
    unsafe { (*link.as_ptr()).prev }
}

/// Link the detached `node` into the ring immediately before `pos`.
///
/// # Safety
///
/// `pos` must be a node in a well-formed ring; `node` must be live and not
/// currently part of any ring.
pub(crate) unsafe fn splice_before(pos: NonNull<Link>, node: NonNull<Link>) {
    // SAFETY: both pointers are live nodes per the caller, and the ring
    // stays well-formed after the four writes.
    unsafe {
        let before = (*pos.as_ptr()).prev;
        (*node.as_ptr()).prev = before;
        (*node.as_ptr()).next = pos;
        (*before.as_ptr()).next = node;
        (*pos.as_ptr()).prev = node;
    }
}

/// Detach `node` from its ring, joining its neighbours. The node's own
/// links are left dangling.
///
/// # Safety
///
/// `node` must be a value node (not the sentinel) in a well-formed ring.
pub(crate) unsafe fn unlink(node: NonNull<Link>) {
    // SAFETY: node and its neighbours are live per the caller.
    unsafe {
        let Link { prev, next } = node.as_ptr().read();
        (*prev.as_ptr()).next = next;
        (*next.as_ptr()).prev = prev;
    }
}
