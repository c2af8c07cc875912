//! Borrowing and owning iterators.
//!
//! All three are double-ended and exact-size: `rev()` is the reverse
//! traversal, walking `prev` links from the sentinel.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;

use stackring_arena::Allocator;

use crate::list::List;
use crate::node::{next, prev, value_ptr, Link};

/// Shared iterator over a list's elements.
pub struct Iter<'a, T> {
    head: NonNull<Link>,
    tail: NonNull<Link>,
    remaining: usize,
    _marker: PhantomData<&'a T>,
}

impl<T> Iter<'_, T> {
    pub(crate) fn new(sentinel: NonNull<Link>, len: usize) -> Self {
        // SAFETY: the sentinel is live for the borrow of its list.
        let (head, tail) = unsafe { (next(sentinel), prev(sentinel)) };
        Self {
            head,
            tail,
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // SAFETY: while remaining > 0, head is a live value node that has
        // not been yielded from either end.
        unsafe {
            let value = &*value_ptr::<T>(self.head);
            self.head = next(self.head);
            Some(value)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // SAFETY: as in `next`, from the other end.
        unsafe {
            let value = &*value_ptr::<T>(self.tail);
            self.tail = prev(self.tail);
            Some(value)
        }
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.remaining)
            .finish()
    }
}

/// Iterator over mutable references to a list's elements.
pub struct IterMut<'a, T> {
    head: NonNull<Link>,
    tail: NonNull<Link>,
    remaining: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<T> IterMut<'_, T> {
    pub(crate) fn new(sentinel: NonNull<Link>, len: usize) -> Self {
        // SAFETY: the sentinel is live for the borrow of its list.
        let (head, tail) = unsafe { (next(sentinel), prev(sentinel)) };
        Self {
            head,
            tail,
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // SAFETY: each value node is yielded at most once across both ends,
        // so the mutable references never alias.
        unsafe {
            let value = &mut *value_ptr::<T>(self.head);
            self.head = next(self.head);
            Some(value)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<&'a mut T> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // SAFETY: as in `next`, from the other end.
        unsafe {
            let value = &mut *value_ptr::<T>(self.tail);
            self.tail = prev(self.tail);
            Some(value)
        }
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

impl<T> fmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut")
            .field("remaining", &self.remaining)
            .finish()
    }
}

/// Owning iterator, popping from either end.
pub struct IntoIter<T, A: Allocator<Value = T>> {
    list: List<T, A>,
}

impl<T, A: Allocator<Value = T>> IntoIter<T, A> {
    pub(crate) fn new(list: List<T, A>) -> Self {
        Self { list }
    }
}

impl<T, A: Allocator<Value = T>> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<T, A: Allocator<Value = T>> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        self.list.pop_back()
    }
}

impl<T, A: Allocator<Value = T>> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator<Value = T>> FusedIterator for IntoIter<T, A> {}

impl<T: fmt::Debug, A: Allocator<Value = T>> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.list).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::List;

    fn list_of(values: &[u32]) -> List<u32> {
        List::from_iter_in(values.iter().copied(), Default::default()).unwrap()
    }

    #[test]
    fn iter_and_rev_are_mirror_images() {
        let list = list_of(&[1, 2, 3, 4]);
        let forward: Vec<u32> = list.iter().copied().collect();
        let mut backward: Vec<u32> = list.iter().rev().copied().collect();
        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(list.iter().len(), 4);
    }

    #[test]
    fn iter_meets_in_the_middle() {
        let list = list_of(&[1, 2, 3]);
        let mut it = list.iter();
        assert_eq!(it.next(), Some(&1));
        assert_eq!(it.next_back(), Some(&3));
        assert_eq!(it.next(), Some(&2));
        assert_eq!(it.next_back(), None);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn iter_mut_updates_in_place() {
        let mut list = list_of(&[1, 2, 3]);
        for value in &mut list {
            *value *= 10;
        }
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
    }

    #[test]
    fn into_iter_drains_from_both_ends() {
        let list = list_of(&[1, 2, 3, 4]);
        let mut it = list.into_iter();
        assert_eq!(it.len(), 4);
        assert_eq!(it.next_back(), Some(4));
        assert_eq!(it.next(), Some(1));
        assert_eq!(it.collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn empty_list_iterates_nothing() {
        let list = List::<u32>::new().unwrap();
        assert_eq!(list.iter().next(), None);
        assert_eq!(list.iter().next_back(), None);
    }
}
