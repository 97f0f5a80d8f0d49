use std::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::{Deref, DerefMut},
    ptr,
};

use siplet_common::{Result, error::Error, verify_capacity};

use crate::{
    debug::ViewCounter,
    growth,
    storage::{HeapStorage, Storage},
    strategy::{CopyStrategy, ElementStrategy, General},
};

/// A contiguous, ordered sequence of `T` with manually managed capacity.
///
/// - `S` decides where the elements live: [`HeapStorage`] grows on demand,
///   [`FixedStorage`](crate::FixedStorage) holds a fixed number of inline slots.
/// - `C` decides how elements are duplicated and destroyed: [`General`] for any type,
///   [`Bitwise`](crate::Bitwise) for `bytemuck::Pod` data.
///
/// The invariant `len() <= capacity() <= max_size()` holds at every observable point.
/// Elements in `[0, len())` are live; the slots past `len()` hold no objects.
///
/// Capacity requests beyond `max_size()` fail with a capacity-exceeded error. Violated
/// preconditions (an index out of range, a range past the end) panic.
pub struct ArrayBase<T, S: Storage<T> = HeapStorage<T>, C: ElementStrategy<T> = General> {
    pub(crate) storage: S,
    pub(crate) views: ViewCounter,
    _marker: PhantomData<(T, fn() -> C)>,
}

impl<T, S: Storage<T>, C: ElementStrategy<T>> ArrayBase<T, S, C> {
    /// Creates an empty array. Heap arrays do not allocate until the first element.
    #[inline]
    pub fn new() -> Self {
        Self::from_storage(S::new())
    }

    /// Creates an empty array with room for exactly `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        S::with_capacity(capacity).map(Self::from_storage)
    }

    /// Creates an array of `len` default values.
    pub fn with_len(len: usize) -> Result<Self>
    where
        T: Default,
    {
        let mut array = Self::with_capacity(len)?;
        array.resize_default(len)?;
        Ok(array)
    }

    /// Builds an array from an iterator, growing as needed.
    pub fn try_from_iter<I>(iter: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut array = Self::new();
        array.append_iter(iter)?;
        Ok(array)
    }

    #[inline]
    pub(crate) fn from_storage(storage: S) -> Self {
        ArrayBase {
            storage,
            views: ViewCounter::default(),
            _marker: PhantomData,
        }
    }

    /// Transfers the contents out of `self`, leaving it empty.
    ///
    /// For heap arrays this moves the block pointer; fixed arrays move their elements.
    pub fn take(&mut self) -> Self {
        self.views.assert_released("take");
        let mut taken = Self::new();
        taken.storage.swap_contents(&mut self.storage);
        taken
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Same as [`len`](Self::len).
    #[inline]
    pub fn size(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of element slots currently allocated.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Largest number of elements this array can ever hold.
    #[inline]
    pub fn max_size(&self) -> usize {
        self.storage.max_size()
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.storage.as_mut_ptr()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.storage.as_ptr(), self.len()) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len();
        unsafe { std::slice::from_raw_parts_mut(self.storage.as_mut_ptr(), len) }
    }

    /// First element. Panics if the array is empty.
    #[track_caller]
    pub fn front(&self) -> &T {
        assert!(!self.is_empty(), "front() on an empty array");
        &self.as_slice()[0]
    }

    /// Last element. Panics if the array is empty.
    #[track_caller]
    pub fn back(&self) -> &T {
        assert!(!self.is_empty(), "back() on an empty array");
        &self.as_slice()[self.len() - 1]
    }

    /// Element at `index`. Panics if `index >= len()`.
    #[track_caller]
    pub fn at(&self, index: usize) -> &T {
        let len = self.len();
        assert!(index < len, "index {index} out of range for array of length {len}");
        unsafe { &*self.storage.as_ptr().add(index) }
    }

    /// Mutable element at `index`. Panics if `index >= len()`.
    #[track_caller]
    pub fn at_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();
        assert!(index < len, "index {index} out of range for array of length {len}");
        unsafe { &mut *self.storage.as_mut_ptr().add(index) }
    }

    /// Ensures `capacity() >= min_capacity` without changing the contents.
    ///
    /// Never decreases capacity. Allocates exactly `min_capacity` slots when it has to
    /// grow; use [`reserve_back`](Self::reserve_back) for amortized growth.
    pub fn reserve(&mut self, min_capacity: usize) -> Result<()> {
        if min_capacity <= self.capacity() {
            return Ok(());
        }
        verify_capacity!(min_capacity, self.max_size());
        self.relocate(min_capacity)
    }

    /// Ensures room for at least `min_extra` more elements, growing by the
    /// [auto-capacity](Self::calculate_auto_capacity) policy when needed.
    pub fn reserve_back(&mut self, min_extra: usize) -> Result<()> {
        let len = self.len();
        if min_extra <= self.capacity() - len {
            return Ok(());
        }
        let capacity = self.calculate_auto_capacity(min_extra)?;
        self.relocate(capacity)
    }

    /// Returns the capacity an append of `min_growth` elements would grow the array to.
    ///
    /// The result `C` satisfies `C - len() >= min_growth` and `C <= max_size()`.
    pub fn calculate_auto_capacity(&self, min_growth: usize) -> Result<usize> {
        let result = growth::auto_capacity(self.len(), self.max_size(), min_growth);
        if let Err(e) = &result {
            log::debug!("auto capacity refused: {e}");
        }
        result
    }

    /// Releases unused capacity of a heap array. No-op for fixed arrays.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        if S::GROWABLE && self.capacity() > self.len() {
            self.relocate(self.len())?;
        }
        Ok(())
    }

    /// Number of raw views into this array that are still alive. Always zero in builds
    /// without debug instrumentation.
    #[inline]
    pub fn outstanding_views(&self) -> usize {
        self.views.outstanding()
    }

    /// Moves all elements into a new block of exactly `capacity` slots.
    pub(crate) fn relocate(&mut self, capacity: usize) -> Result<()> {
        debug_assert!(capacity >= self.len());
        self.views.assert_released("reallocation");
        self.storage.verify();
        let mut fresh = S::with_capacity(capacity)?;
        let len = self.len();
        log::trace!("relocating {len} elements into a block of {capacity} slots");
        unsafe {
            ptr::copy_nonoverlapping(self.storage.as_ptr(), fresh.as_mut_ptr(), len);
            fresh.set_len(len);
            self.storage.set_len(0);
        }
        std::mem::swap(&mut self.storage, &mut fresh);
        Ok(())
    }
}

impl<T, S: Storage<T>, C: CopyStrategy<T>> ArrayBase<T, S, C> {
    /// Creates an array holding clones of `values`.
    pub fn from_slice(values: &[T]) -> Result<Self> {
        let mut array = Self::with_capacity(values.len())?;
        array.append_slice(values)?;
        Ok(array)
    }

    /// Creates an array of `count` clones of `value`.
    pub fn from_fill(count: usize, value: &T) -> Result<Self> {
        let mut array = Self::with_capacity(count)?;
        array.append_fill(count, value)?;
        Ok(array)
    }
}

impl<T, S: Storage<T>, C: ElementStrategy<T>> Drop for ArrayBase<T, S, C> {
    fn drop(&mut self) {
        self.views.assert_released("drop");
        if !std::thread::panicking() {
            self.storage.verify();
        }
        let len = self.len();
        unsafe {
            self.storage.set_len(0);
            C::destroy(self.storage.as_mut_ptr(), len);
        }
    }
}

impl<T, S: Storage<T>, C: ElementStrategy<T>> Default for ArrayBase<T, S, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S: Storage<T>, C: CopyStrategy<T>> Clone for ArrayBase<T, S, C> {
    fn clone(&self) -> Self {
        Self::from_slice(self.as_slice()).expect("a copy of an array fits the same storage")
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign_slice(source.as_slice())
            .expect("a copy of an array fits the same storage");
    }
}

impl<T, S: Storage<T>, C: ElementStrategy<T>> Deref for ArrayBase<T, S, C> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, S: Storage<T>, C: ElementStrategy<T>> DerefMut for ArrayBase<T, S, C> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, S: Storage<T>, C: ElementStrategy<T>> AsRef<[T]> for ArrayBase<T, S, C> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, S: Storage<T>, C: ElementStrategy<T>> AsMut<[T]> for ArrayBase<T, S, C> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug, S: Storage<T>, C: ElementStrategy<T>> fmt::Debug for ArrayBase<T, S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, S1, C1, S2, C2> PartialEq<ArrayBase<T, S2, C2>> for ArrayBase<T, S1, C1>
where
    T: PartialEq,
    S1: Storage<T>,
    C1: ElementStrategy<T>,
    S2: Storage<T>,
    C2: ElementStrategy<T>,
{
    fn eq(&self, other: &ArrayBase<T, S2, C2>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, S: Storage<T>, C: ElementStrategy<T>> Eq for ArrayBase<T, S, C> {}

impl<T: PartialEq, S: Storage<T>, C: ElementStrategy<T>> PartialEq<[T]> for ArrayBase<T, S, C> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq, S: Storage<T>, C: ElementStrategy<T>> PartialEq<&[T]> for ArrayBase<T, S, C> {
    fn eq(&self, other: &&[T]) -> bool {
        self.as_slice() == *other
    }
}

impl<T: PartialEq, S: Storage<T>, C: ElementStrategy<T>, const M: usize> PartialEq<[T; M]>
    for ArrayBase<T, S, C>
{
    fn eq(&self, other: &[T; M]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Hash, S: Storage<T>, C: ElementStrategy<T>> Hash for ArrayBase<T, S, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

impl<T, S: Storage<T>, C: CopyStrategy<T>> TryFrom<&[T]> for ArrayBase<T, S, C> {
    type Error = Error;

    fn try_from(values: &[T]) -> Result<Self> {
        Self::from_slice(values)
    }
}

impl<'a, T, S: Storage<T>, C: ElementStrategy<T>> IntoIterator for &'a ArrayBase<T, S, C> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, S: Storage<T>, C: ElementStrategy<T>> IntoIterator for &'a mut ArrayBase<T, S, C> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}
