//! Integration test: several lists drawing nodes from one fixed arena.
//!
//! Node sizes come from [`node_layout`], so the arena can be sized to hold
//! an exact number of nodes and the exhaustion point asserted precisely.

use stackring_arena::{AllocError, Arena, ArenaAllocator, ArenaConfig};
use stackring_list::{node_layout, List};

fn node_size<T>() -> usize {
    node_layout::<T>().pad_to_align().size()
}

#[test]
fn two_lists_share_an_arena_until_it_is_full() {
    let arena = Arena::with_capacity(node_size::<u64>() * 10).unwrap();
    let alloc = ArenaAllocator::new(&arena);
    let mut evens = List::new_in(alloc).unwrap();
    let mut odds = List::new_in(alloc).unwrap();

    let mut pushed = 0u64;
    let err = loop {
        let target = if pushed % 2 == 0 { &mut evens } else { &mut odds };
        match target.push_back(pushed) {
            Ok(()) => pushed += 1,
            Err(err) => break err,
        }
    };

    // Two sentinels plus eight value nodes fill ten slots.
    assert_eq!(pushed, 8);
    assert!(matches!(err, AllocError::CapacityExceeded { .. }));
    assert_eq!(arena.reservations(), 10);
    assert!(arena.used() <= arena.capacity());
    assert!(arena.remaining() < node_size::<u64>());

    assert_eq!(evens.iter().copied().collect::<Vec<_>>(), vec![0, 2, 4, 6]);
    assert_eq!(odds.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5, 7]);
    assert!(evens.allocator() == odds.allocator());
}

#[test]
fn every_node_lives_inside_the_arena() {
    let arena = Arena::with_capacity(4096).unwrap();
    let list = List::from_iter_in(0u32..16, ArenaAllocator::new(&arena)).unwrap();
    let mut cursor = list.cursor_front();
    while let Some(value) = cursor.current() {
        assert!(arena.contains((value as *const u32).cast()));
        cursor.move_next();
    }
    assert_eq!(arena.reservations(), 17);
}

#[test]
fn erasing_does_not_return_space() {
    let arena = Arena::with_capacity(4096).unwrap();
    let mut list = List::from_iter_in(0u32..4, ArenaAllocator::new(&arena)).unwrap();
    let used = arena.used();

    list.clear();
    assert_eq!(arena.used(), used);

    list.push_back(1).unwrap();
    assert!(arena.used() > used);
}

#[test]
fn copy_of_arena_list_stays_on_the_arena() {
    let arena = Arena::new(ArenaConfig::default()).unwrap();
    let source = List::from_iter_in([1u32, 2, 3], ArenaAllocator::new(&arena)).unwrap();
    let before = arena.reservations();

    let copy = source.try_clone().unwrap();

    assert!(copy.allocator() == source.allocator());
    assert_eq!(arena.reservations(), before + 4);
    assert_eq!(copy, source);
}

#[test]
fn over_aligned_elements_are_aligned() {
    #[derive(Clone, Copy, Default)]
    #[repr(align(64))]
    struct Wide(u8);

    let arena = Arena::with_capacity(4096).unwrap();
    let list = List::<Wide, _>::with_len_in(5, ArenaAllocator::new(&arena)).unwrap();
    for value in &list {
        assert_eq!((value as *const Wide as usize) % 64, 0);
    }
}
