//! Owned, fixed-size backing buffer for an arena.
//!
//! This is the only place in the crate that talks to the global heap
//! for arena storage. The buffer is uninitialised and never resized.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// A heap block of `layout.size()` uninitialised bytes.
pub(crate) struct RawBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl RawBuffer {
    /// Allocate a buffer for `layout`, or `None` if the heap refuses it.
    ///
    /// `layout.size()` must be non-zero; [`ArenaConfig::validate`] ensures
    /// this before we get here.
    ///
    /// [`ArenaConfig::validate`]: crate::ArenaConfig::validate
    pub(crate) fn new(layout: Layout) -> Option<Self> {
        debug_assert!(layout.size() > 0);
        // SAFETY: layout has a non-zero size (checked by config validation).
        let ptr = NonNull::new(unsafe { alloc::alloc(layout) })?;
        Some(Self { ptr, layout })
    }

    /// Base address of the buffer.
    pub(crate) fn base(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Size of the buffer in bytes.
    pub(crate) fn len(&self) -> usize {
        self.layout.size()
    }
}

impl Drop for RawBuffer {
    fn drop(&mut self) {
        // SAFETY: ptr was returned by `alloc::alloc` with exactly this layout.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

/// Padding needed to bring `addr` up to a multiple of `align`.
///
/// `align` must be a power of two.
#[inline]
pub(crate) fn align_padding(addr: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    addr.wrapping_neg() & (align - 1)
}
