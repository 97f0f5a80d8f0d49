//! Address-identity checks used to detect sources that live inside the array.

use siplet_common::Result;

use crate::{
    ArrayBase,
    splice::{CloneFrom, Repeat},
    storage::Storage,
    strategy::{CopyStrategy, ElementStrategy},
};

impl<T, S: Storage<T>, C: ElementStrategy<T>> ArrayBase<T, S, C> {
    /// Returns the index of the live element `value` points to, if it points into
    /// `[0, len())` of this array.
    ///
    /// Comparison is by address, never by value. Pointers into the middle of an element
    /// are not recognized. Always `None` for zero-sized types.
    pub fn is_internal_element(&self, value: *const T) -> Option<usize> {
        let size = size_of::<T>();
        if size == 0 {
            return None;
        }
        let offset = self.byte_offset(value)?;
        (offset % size == 0).then_some(offset / size)
    }

    /// Returns the starting index of the range `ptr..ptr + count` if it lies inside the
    /// live elements of this array.
    ///
    /// A range that starts inside the array but extends past `len()` is a caller error
    /// and panics.
    #[track_caller]
    pub fn is_internal_pointer(&self, ptr: *const T, count: usize) -> Option<usize> {
        let start = self.is_internal_element(ptr)?;
        assert!(
            count <= self.len() - start,
            "range of {count} elements at index {start} extends past the end of the array"
        );
        Some(start)
    }

    fn byte_offset(&self, value: *const T) -> Option<usize> {
        let base = self.storage.as_ptr() as usize;
        let end = base + self.len() * size_of::<T>();
        let addr = value as usize;
        (base <= addr && addr < end).then(|| addr - base)
    }
}

impl<T, S: Storage<T>, C: CopyStrategy<T>> ArrayBase<T, S, C> {
    /// Replaces `[pos, pos + n1)` with clones of the `count` elements at `src`, which may
    /// point into this array.
    ///
    /// # Safety
    ///
    /// `src..src + count` must be valid, initialized elements, either entirely inside the
    /// live elements of this array or entirely outside its storage.
    #[track_caller]
    pub unsafe fn replace_raw(
        &mut self,
        pos: usize,
        n1: usize,
        src: *const T,
        count: usize,
    ) -> Result<()> {
        match self.is_internal_pointer(src, count) {
            Some(start) => self.splice_within(pos, n1, start..start + count),
            None => {
                let values = unsafe { std::slice::from_raw_parts(src, count) };
                self.splice(pos, n1, CloneFrom::external(values))
            }
        }
    }

    /// Replaces `[pos, pos + n1)` with `count` clones of `*value`, which may point into
    /// this array.
    ///
    /// # Safety
    ///
    /// `value` must point to a valid `T` that is either a live element of this array or
    /// outside its storage.
    #[track_caller]
    pub unsafe fn replace_fill_raw(
        &mut self,
        pos: usize,
        n1: usize,
        count: usize,
        value: *const T,
    ) -> Result<()> {
        match self.is_internal_element(value) {
            Some(index) => self.replace_fill_within(pos, n1, count, index),
            None => self.splice(
                pos,
                n1,
                Repeat {
                    value: unsafe { &*value },
                    count,
                },
            ),
        }
    }
}
