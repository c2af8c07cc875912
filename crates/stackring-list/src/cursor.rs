//! Positional cursors over a [`List`].
//!
//! [`ListCursor<L>`] is one cursor type parameterised by how it holds the
//! list: `&List` gives the read-only [`Cursor`], `&mut List` gives
//! [`CursorMut`]. Traversal and reads are written once against
//! `L: Deref<Target = List>`; insertion and erasure exist only where
//! `L: DerefMut`. A `CursorMut` converts into a `Cursor`, never the other
//! way round.
//!
//! A cursor always points at a node of the ring: a value node, or the
//! sentinel, which plays the role of the end position. Moving forward from
//! the end wraps to the first element and moving back from the first
//! element reaches the end. Cursors compare by node identity.
//!
//! Because a cursor borrows its list, the borrow checker rules out the
//! dangling-position cases a raw iterator would allow: a `Cursor` cannot
//! outlive a mutation, and the only way to erase through a `CursorMut` moves
//! it to the successor.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use stackring_arena::{AllocError, Allocator, Global};

use crate::error::ListError;
use crate::list::List;
use crate::node::{
    allocate_node, deallocate_node, next, prev, splice_before, unlink, value_ptr, Link, Node,
    NodeAlloc,
};

/// A position in a list, generic over shared or exclusive access.
#[derive(Clone, Copy)]
pub struct ListCursor<L> {
    list: L,
    current: NonNull<Link>,
}

/// Read-only cursor.
pub type Cursor<'a, T, A = Global<T>> = ListCursor<&'a List<T, A>>;

/// Cursor that can insert and erase.
pub type CursorMut<'a, T, A = Global<T>> = ListCursor<&'a mut List<T, A>>;

impl<L> ListCursor<L> {
    pub(crate) fn at(list: L, current: NonNull<Link>) -> Self {
        Self { list, current }
    }
}

impl<L, T, A> ListCursor<L>
where
    L: Deref<Target = List<T, A>>,
    A: Allocator<Value = T>,
{
    /// Whether the cursor is on the end position.
    pub fn is_end(&self) -> bool {
        self.current == self.list.sentinel
    }

    /// The element under the cursor, or `None` at the end position.
    pub fn get(&self) -> Option<&T> {
        if self.is_end() {
            return None;
        }
        // SAFETY: current is a live value node of the borrowed list.
        Some(unsafe { &*value_ptr::<T>(self.current) })
    }

    /// Step to the next node.
    pub fn move_next(&mut self) {
        // SAFETY: current is a live node of the borrowed list.
        self.current = unsafe { next(self.current) };
    }

    /// Step to the previous node.
    pub fn move_prev(&mut self) {
        // SAFETY: current is a live node of the borrowed list.
        self.current = unsafe { prev(self.current) };
    }

    /// The list this cursor walks.
    pub fn list(&self) -> &List<T, A> {
        &self.list
    }
}

impl<'a, T, A: Allocator<Value = T>> ListCursor<&'a List<T, A>> {
    /// The element under the cursor, borrowed for the list's lifetime.
    pub fn current(&self) -> Option<&'a T> {
        if self.current == self.list.sentinel {
            return None;
        }
        // SAFETY: current is a live value node of a list borrowed for 'a.
        Some(unsafe { &*value_ptr::<T>(self.current) })
    }
}

impl<L, T, A> ListCursor<L>
where
    L: DerefMut<Target = List<T, A>>,
    A: Allocator<Value = T>,
{
    /// The element under the cursor, mutably.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.is_end() {
            return None;
        }
        // SAFETY: current is a live value node of the exclusively borrowed list.
        Some(unsafe { &mut *value_ptr::<T>(self.current) })
    }

    /// Insert `value` before the cursor and move onto it.
    ///
    /// At the end position this appends.
    pub fn insert(&mut self, value: T) -> Result<(), AllocError> {
        self.try_insert_with(|| Ok::<T, std::convert::Infallible>(value))
            .map_err(AllocError::from)
    }

    /// Allocate a node, construct its value with `make`, and insert it
    /// before the cursor, moving onto it.
    ///
    /// The ring is not touched until `make` has succeeded. If it fails (or
    /// panics) the fresh node is deallocated and the list is exactly as it
    /// was.
    pub fn try_insert_with<E, F>(&mut self, make: F) -> Result<(), ListError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let pos = self.current;
        let list = &mut *self.list;
        let link = allocate_node::<T, NodeAlloc<T, A>>(&list.nodes)?;
        let pending = PendingNode::<T, NodeAlloc<T, A>> {
            nodes: &list.nodes,
            link,
            _marker: PhantomData,
        };
        let value = make().map_err(ListError::Construct)?;
        std::mem::forget(pending);
        // SAFETY: link is a fresh, detached node; pos is a node of the ring.
        unsafe {
            value_ptr::<T>(link).write(value);
            splice_before(pos, link);
        }
        list.len += 1;
        self.current = link;
        Ok(())
    }

    /// Remove the element under the cursor and return it, moving to its
    /// successor.
    ///
    /// At the end position there is nothing to erase: returns `None` and
    /// leaves the list alone.
    pub fn erase(&mut self) -> Option<T> {
        if self.is_end() {
            return None;
        }
        let node = self.current;
        let list = &mut *self.list;
        // SAFETY: node is a live value node of the exclusively borrowed list.
        // Its successor is read before it is unlinked, the value is moved out
        // exactly once, and nothing reaches the node after deallocation.
        let (value, following) = unsafe {
            let following = next(node);
            unlink(node);
            let value = value_ptr::<T>(node).read();
            deallocate_node::<T, NodeAlloc<T, A>>(&list.nodes, node);
            (value, following)
        };
        list.len -= 1;
        self.current = following;
        Some(value)
    }

    /// A read-only cursor at the same position.
    pub fn as_cursor(&self) -> Cursor<'_, T, A> {
        ListCursor::at(&*self.list, self.current)
    }
}

impl<'a, T, A: Allocator<Value = T>> From<CursorMut<'a, T, A>> for Cursor<'a, T, A> {
    fn from(cursor: CursorMut<'a, T, A>) -> Self {
        let list: &'a List<T, A> = cursor.list;
        ListCursor::at(list, cursor.current)
    }
}

impl<L, M> PartialEq<ListCursor<M>> for ListCursor<L> {
    fn eq(&self, other: &ListCursor<M>) -> bool {
        self.current == other.current
    }
}

impl<L> Eq for ListCursor<L> {}

impl<L, T, A> fmt::Debug for ListCursor<L>
where
    L: Deref<Target = List<T, A>>,
    A: Allocator<Value = T>,
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ListCursor").field(&self.get()).finish()
    }
}

/// A node that has been allocated but not yet linked. Dropping it returns
/// the raw storage to the allocator.
struct PendingNode<'n, T, N: Allocator<Value = Node<T>>> {
    nodes: &'n N,
    link: NonNull<Link>,
    _marker: PhantomData<T>,
}

impl<T, N: Allocator<Value = Node<T>>> Drop for PendingNode<'_, T, N> {
    fn drop(&mut self) {
        // SAFETY: the node came from `nodes`, was never linked, and its value
        // slot was never written.
        unsafe { deallocate_node::<T, N>(self.nodes, self.link) }
    }
}

#[cfg(test)]
mod tests {
    use crate::List;

    fn list_of(values: &[i32]) -> List<i32> {
        List::from_iter_in(values.iter().copied(), Default::default()).unwrap()
    }

    fn collect(list: &List<i32>) -> Vec<i32> {
        list.iter().copied().collect()
    }

    #[test]
    fn front_cursor_starts_at_first_element() {
        let list = list_of(&[1, 2, 3]);
        let cursor = list.cursor_front();
        assert_eq!(cursor.get(), Some(&1));
        assert!(!cursor.is_end());
    }

    #[test]
    fn empty_list_front_is_end() {
        let list = List::<i32>::new().unwrap();
        assert!(list.cursor_front() == list.cursor_end());
        assert!(list.cursor_back() == list.cursor_end());
        assert_eq!(list.cursor_front().get(), None);
    }

    #[test]
    fn cursor_walks_forward_to_end_and_wraps() {
        let list = list_of(&[1, 2]);
        let mut cursor = list.cursor_front();
        cursor.move_next();
        assert_eq!(cursor.current(), Some(&2));
        cursor.move_next();
        assert!(cursor.is_end());
        cursor.move_next();
        assert_eq!(cursor.current(), Some(&1));
    }

    #[test]
    fn cursor_walks_backward_from_end() {
        let list = list_of(&[1, 2, 3]);
        let mut cursor = list.cursor_end();
        let mut seen = Vec::new();
        cursor.move_prev();
        while !cursor.is_end() {
            seen.push(*cursor.get().unwrap());
            cursor.move_prev();
        }
        assert_eq!(seen, vec![3, 2, 1]);
    }

    #[test]
    fn cursors_compare_by_node_not_value() {
        let list = list_of(&[7, 7]);
        let first = list.cursor_front();
        let mut second = list.cursor_front();
        second.move_next();
        assert_eq!(first.get(), second.get());
        assert!(first != second);
        second.move_prev();
        assert!(first == second);
    }

    #[test]
    fn insert_places_before_cursor_and_moves_onto_new_element() {
        let mut list = list_of(&[1, 3]);
        let mut cursor = list.cursor_front_mut();
        cursor.move_next();
        cursor.insert(2).unwrap();
        assert_eq!(cursor.get(), Some(&2));
        cursor.move_next();
        assert_eq!(cursor.get(), Some(&3));
        assert_eq!(collect(&list), vec![1, 2, 3]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn insert_at_end_appends() {
        let mut list = list_of(&[1]);
        list.cursor_end_mut().insert(2).unwrap();
        assert_eq!(collect(&list), vec![1, 2]);
    }

    #[test]
    fn erase_returns_value_and_moves_to_successor() {
        let mut list = list_of(&[1, 2, 3]);
        let mut cursor = list.cursor_front_mut();
        cursor.move_next();
        assert_eq!(cursor.erase(), Some(2));
        assert_eq!(cursor.get(), Some(&3));
        assert_eq!(collect(&list), vec![1, 3]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn erase_at_end_is_a_no_op() {
        let mut list = list_of(&[1]);
        assert_eq!(list.cursor_end_mut().erase(), None);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn erase_of_insert_lands_on_original_position() {
        let mut list = list_of(&[10, 20, 30]);
        let original = {
            let mut c = list.cursor_front();
            c.move_next();
            c.current().copied()
        };
        let mut cursor = list.cursor_front_mut();
        cursor.move_next();
        cursor.insert(15).unwrap();
        assert_eq!(cursor.erase(), Some(15));
        assert_eq!(cursor.get().copied(), original);
        assert_eq!(collect(&list), vec![10, 20, 30]);
    }

    #[test]
    fn failed_construction_leaves_list_unchanged() {
        let mut list = list_of(&[1, 2]);
        let mut cursor = list.cursor_front_mut();
        cursor.move_next();
        let result = cursor.try_insert_with(|| Err::<i32, _>("nope"));
        assert!(matches!(result, Err(crate::ListError::Construct("nope"))));
        assert_eq!(cursor.get(), Some(&2));
        assert_eq!(collect(&list), vec![1, 2]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn get_mut_writes_through() {
        let mut list = list_of(&[1, 2]);
        let mut cursor = list.cursor_back_mut();
        *cursor.get_mut().unwrap() = 20;
        assert_eq!(collect(&list), vec![1, 20]);
    }

    #[test]
    fn mutable_cursor_converts_to_const() {
        let mut list = list_of(&[4, 5]);
        let mut cursor = list.cursor_front_mut();
        cursor.move_next();
        assert_eq!(cursor.as_cursor().get(), Some(&5));
        let shared: crate::Cursor<'_, i32> = cursor.into();
        assert_eq!(shared.current(), Some(&5));
        let copy = shared;
        assert!(copy == shared);
    }
}
