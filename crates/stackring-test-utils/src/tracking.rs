//! An instrumented allocator for container tests.
//!
//! Every [`TrackingAllocator`] handle points at a shared [`AllocLedger`].
//! Clones and rebinds share the ledger, and two handles compare equal iff
//! they share it, so a test can tell which allocator instance a container
//! ended up holding by its [`id`](TrackingAllocator::id).
//!
//! Storage comes from the global heap; the ledger only watches.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::rc::Rc;

use indexmap::IndexMap;
use stackring_arena::{AllocError, Allocator, Global};

/// Compile-time propagation behaviour for a [`TrackingAllocator`].
pub trait PropagationPolicy: 'static {
    /// Reported as `Allocator::PROPAGATE_ON_COPY_ASSIGNMENT`.
    const ON_COPY_ASSIGNMENT: bool;
    /// Reported as `Allocator::PROPAGATE_ON_SWAP`.
    const ON_SWAP: bool;
    /// If set, `select_on_copy` hands out a brand-new ledger instead of
    /// sharing the source's.
    const FRESH_ON_COPY: bool;
}

/// Nothing propagates; copies share the source's allocator.
#[derive(Debug)]
pub enum Retain {}

/// Allocators follow the contents on copy-assignment and swap.
#[derive(Debug)]
pub enum Propagate {}

/// Nothing propagates; copy construction gets a fresh allocator.
#[derive(Debug)]
pub enum FreshOnCopy {}

impl PropagationPolicy for Retain {
    const ON_COPY_ASSIGNMENT: bool = false;
    const ON_SWAP: bool = false;
    const FRESH_ON_COPY: bool = false;
}

impl PropagationPolicy for Propagate {
    const ON_COPY_ASSIGNMENT: bool = true;
    const ON_SWAP: bool = true;
    const FRESH_ON_COPY: bool = false;
}

impl PropagationPolicy for FreshOnCopy {
    const ON_COPY_ASSIGNMENT: bool = false;
    const ON_SWAP: bool = false;
    const FRESH_ON_COPY: bool = true;
}

#[derive(Default)]
struct LedgerState {
    allocations: usize,
    deallocations: usize,
    /// Address -> element count of every outstanding non-empty block.
    live: IndexMap<usize, usize>,
    bad_frees: usize,
    /// Total allocations permitted before `allocate` starts failing.
    limit: Option<usize>,
}

/// Shared bookkeeping behind a family of [`TrackingAllocator`] handles.
pub struct AllocLedger {
    id: u32,
    state: RefCell<LedgerState>,
}

impl AllocLedger {
    fn new(id: u32) -> Self {
        Self {
            id,
            state: RefCell::new(LedgerState::default()),
        }
    }

    /// The label given at construction.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Successful `allocate` calls so far.
    pub fn allocations(&self) -> usize {
        self.state.borrow().allocations
    }

    /// Accepted `deallocate` calls so far.
    pub fn deallocations(&self) -> usize {
        self.state.borrow().deallocations
    }

    /// Blocks allocated and not yet returned.
    pub fn outstanding(&self) -> usize {
        let state = self.state.borrow();
        state.allocations - state.deallocations
    }

    /// `deallocate` calls for a pointer this ledger never handed out, or
    /// with the wrong count. Such calls are refused and the memory leaked.
    pub fn bad_frees(&self) -> usize {
        self.state.borrow().bad_frees
    }

    /// Allow `n` more allocations, then fail every further request with
    /// [`AllocError::BudgetExhausted`].
    pub fn fail_after(&self, n: usize) {
        let mut state = self.state.borrow_mut();
        state.limit = Some(state.allocations + n);
    }

    /// Remove any budget set by [`fail_after`](Self::fail_after).
    pub fn clear_budget(&self) {
        self.state.borrow_mut().limit = None;
    }

    fn record_alloc(&self, addr: usize, count: usize) -> Result<(), AllocError> {
        let mut state = self.state.borrow_mut();
        if let Some(limit) = state.limit {
            if state.allocations >= limit {
                return Err(AllocError::BudgetExhausted { limit });
            }
        }
        state.allocations += 1;
        if count > 0 {
            state.live.insert(addr, count);
        }
        Ok(())
    }

    fn record_dealloc(&self, addr: usize, count: usize) -> bool {
        let mut state = self.state.borrow_mut();
        if count > 0 && state.live.get(&addr) != Some(&count) {
            state.bad_frees += 1;
            return false;
        }
        state.live.swap_remove(&addr);
        state.deallocations += 1;
        true
    }
}

impl fmt::Debug for AllocLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("AllocLedger")
            .field("id", &self.id)
            .field("allocations", &state.allocations)
            .field("deallocations", &state.deallocations)
            .field("live", &state.live.len())
            .field("bad_frees", &state.bad_frees)
            .finish()
    }
}

/// A heap allocator that records what it does in a shared [`AllocLedger`].
pub struct TrackingAllocator<T, P: PropagationPolicy = Retain> {
    ledger: Rc<AllocLedger>,
    _marker: PhantomData<(fn() -> T, fn() -> P)>,
}

impl<T, P: PropagationPolicy> TrackingAllocator<T, P> {
    /// A handle on a new ledger labelled `id`.
    pub fn new(id: u32) -> Self {
        Self {
            ledger: Rc::new(AllocLedger::new(id)),
            _marker: PhantomData,
        }
    }

    /// The ledger's label.
    pub fn id(&self) -> u32 {
        self.ledger.id()
    }

    /// The shared ledger.
    pub fn ledger(&self) -> &AllocLedger {
        &self.ledger
    }
}

impl<T, P: PropagationPolicy> Default for TrackingAllocator<T, P> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T, P: PropagationPolicy> Clone for TrackingAllocator<T, P> {
    fn clone(&self) -> Self {
        Self {
            ledger: Rc::clone(&self.ledger),
            _marker: PhantomData,
        }
    }
}

impl<T, U, P: PropagationPolicy> PartialEq<TrackingAllocator<U, P>> for TrackingAllocator<T, P> {
    fn eq(&self, other: &TrackingAllocator<U, P>) -> bool {
        Rc::ptr_eq(&self.ledger, &other.ledger)
    }
}

impl<T, P: PropagationPolicy> Eq for TrackingAllocator<T, P> {}

impl<T, P: PropagationPolicy> fmt::Debug for TrackingAllocator<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TrackingAllocator").field(&self.ledger).finish()
    }
}

// SAFETY: storage comes from `Global`, which upholds the contract; a free
// is forwarded only if the ledger handed out exactly that block, and all
// handles that compare equal share one ledger.
unsafe impl<T, P: PropagationPolicy> Allocator for TrackingAllocator<T, P> {
    type Value = T;
    type Rebind<U> = TrackingAllocator<U, P>;

    const PROPAGATE_ON_COPY_ASSIGNMENT: bool = P::ON_COPY_ASSIGNMENT;
    const PROPAGATE_ON_SWAP: bool = P::ON_SWAP;

    fn allocate(&self, count: usize) -> Result<NonNull<T>, AllocError> {
        let ptr = Global::<T>::new().allocate(count)?;
        if let Err(err) = self.ledger.record_alloc(ptr.as_ptr() as usize, count) {
            // SAFETY: just allocated from Global with this count.
            unsafe { Global::<T>::new().deallocate(ptr, count) };
            return Err(err);
        }
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, count: usize) {
        if self.ledger.record_dealloc(ptr.as_ptr() as usize, count) {
            // SAFETY: the ledger confirmed this block came from Global with
            // this count and has not been freed.
            unsafe { Global::<T>::new().deallocate(ptr, count) }
        }
    }

    fn rebind<U>(&self) -> TrackingAllocator<U, P> {
        TrackingAllocator {
            ledger: Rc::clone(&self.ledger),
            _marker: PhantomData,
        }
    }

    fn select_on_copy(&self) -> Self {
        if P::FRESH_ON_COPY {
            Self::default()
        } else {
            self.clone()
        }
    }
}
