//! Raw, lifetime-free views into an array.
//!
//! A view is a pointer and a length, detached from the borrow checker so that it can be
//! stored next to the array it refers to. In instrumented builds every view holds a token
//! in the array's view counter, and an operation that would move or free the elements
//! (reallocation, shifting, erasing, swapping, dropping) panics while any view is alive.
//! Appending within the current capacity is allowed.
//!
//! In release builds without the `checked` feature the counter does not exist and a
//! dangling view is undefined behavior, exactly like a dangling raw pointer.

use std::ops::Range;

use crate::{ArrayBase, debug::ViewToken, storage::Storage, strategy::ElementStrategy};

/// Read-only view into the elements of an array.
pub struct RawView<T> {
    ptr: *const T,
    len: usize,
    _token: ViewToken,
}

/// Read-write view into the elements of an array.
pub struct RawViewMut<T> {
    ptr: *mut T,
    len: usize,
    _token: ViewToken,
}

unsafe impl<T: Sync> Send for RawView<T> {}
unsafe impl<T: Sync> Sync for RawView<T> {}
unsafe impl<T: Send> Send for RawViewMut<T> {}
unsafe impl<T: Sync> Sync for RawViewMut<T> {}

impl<T> RawView<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr
    }

    /// # Safety
    ///
    /// The array the view was taken from must still be alive, must not have moved (for
    /// fixed arrays), and its elements in the viewed range must not be mutated while the
    /// returned slice is in use.
    #[inline]
    pub unsafe fn as_slice<'a>(&self) -> &'a [T] {
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }
}

impl<T> RawViewMut<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_mut_ptr(&self) -> *mut T {
        self.ptr
    }

    /// # Safety
    ///
    /// As for [`RawView::as_slice`], and no other reference to the viewed elements may
    /// be used while the returned slice is alive.
    #[inline]
    pub unsafe fn as_mut_slice<'a>(&mut self) -> &'a mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }
}

impl<T, S: Storage<T>, C: ElementStrategy<T>> ArrayBase<T, S, C> {
    /// Returns a view of all live elements.
    pub fn raw_view(&self) -> RawView<T> {
        self.raw_view_range(0..self.len())
    }

    /// Returns a view of the live elements in `range`. Panics if `range` is out of bounds.
    #[track_caller]
    pub fn raw_view_range(&self, range: Range<usize>) -> RawView<T> {
        let len = self.len();
        assert!(
            range.start <= range.end && range.end <= len,
            "view range {range:?} out of bounds for array of length {len}"
        );
        RawView {
            ptr: unsafe { self.storage.as_ptr().add(range.start) },
            len: range.len(),
            _token: self.views.acquire(),
        }
    }

    /// Returns a read-write view of all live elements.
    pub fn raw_view_mut(&mut self) -> RawViewMut<T> {
        RawViewMut {
            ptr: self.storage.as_mut_ptr(),
            len: self.len(),
            _token: self.views.acquire(),
        }
    }
}
