//! Raw element storage.
//!
//! A [`Storage`] owns a block of element slots and the count of live elements at its
//! front, and nothing else: it never constructs, clones or drops elements. Ownership of
//! the *bytes* (the block) is kept apart from ownership of the *objects* (the `len`
//! boundary), which is managed by [`ArrayBase`](crate::ArrayBase).
//!
//! Two implementations are provided:
//!
//! - [`HeapStorage`]: a single heap allocation, grown by allocating a larger block;
//! - [`FixedStorage`]: `N` inline slots, capacity fixed at `N` for its whole lifetime.
//!
//! Dropping a storage that still reports live elements is a fatal invariant breach and
//! aborts the process.

use siplet_common::Result;

mod fixed;
mod heap;

pub use fixed::FixedStorage;
pub use heap::HeapStorage;

/// Raw, length-tracking element storage.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - `as_ptr()..as_ptr() + capacity()` is valid, properly aligned storage for `T`
///   that stays at the same address until the storage is moved, swapped or dropped;
/// - `len() <= capacity() <= max_size()` whenever `set_len` is used correctly;
/// - `capacity()` never changes for a given instance.
pub unsafe trait Storage<T>: Sized {
    /// Whether a larger block can be obtained from [`with_capacity`](Self::with_capacity).
    const GROWABLE: bool;

    /// Creates an empty storage. The heap variant does not allocate.
    fn new() -> Self;

    /// Creates an empty storage with room for exactly `capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns a capacity-exceeded error if `capacity > max_size()`.
    fn with_capacity(capacity: usize) -> Result<Self>;

    /// Upper bound on the number of elements this storage can ever hold.
    fn max_size(&self) -> usize;

    /// Number of element slots in the block.
    fn capacity(&self) -> usize;

    /// Number of live elements at the front of the block.
    fn len(&self) -> usize;

    /// Sets the live element count.
    ///
    /// # Safety
    ///
    /// `len <= capacity()`, and the first `len` slots must hold live elements.
    unsafe fn set_len(&mut self, len: usize);

    fn as_ptr(&self) -> *const T;

    fn as_mut_ptr(&mut self) -> *mut T;

    /// Exchanges the contents (live elements and length) of two storages.
    fn swap_contents(&mut self, other: &mut Self);

    /// Panics if the canaries around the block have been overwritten. No-op in builds
    /// without debug instrumentation.
    fn verify(&self);
}

/// Shared drop-time check: storage must be emptied by its owner before release.
#[cold]
fn released_with_live_elements(len: usize) -> ! {
    log::error!("array storage released while still holding {len} live element(s)");
    std::process::abort()
}
