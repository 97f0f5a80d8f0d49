//! Whole-content operations: assign, resize and swap.

use std::ops::Range;

use siplet_common::Result;

use crate::{
    ArrayBase,
    splice::Repeat,
    storage::Storage,
    strategy::{CopyStrategy, ElementStrategy},
};

impl<T, S: Storage<T>, C: ElementStrategy<T>> ArrayBase<T, S, C> {
    /// Exchanges the contents of two arrays.
    ///
    /// O(1) for heap arrays. Fixed arrays exchange their live elements slot by slot,
    /// so no placeholder elements are constructed and `T` need not implement `Default`.
    pub fn swap(&mut self, other: &mut Self) {
        self.views.assert_released("swap");
        other.views.assert_released("swap");
        self.storage.verify();
        other.storage.verify();
        self.storage.swap_contents(&mut other.storage);
    }

    /// Grows or shrinks the array to `len` elements, filling new slots with values
    /// produced by `f`.
    pub fn resize_with<F>(&mut self, len: usize, mut f: F) -> Result<()>
    where
        F: FnMut() -> T,
    {
        let old_len = self.len();
        if len <= old_len {
            self.truncate(len);
            return Ok(());
        }
        self.reserve_back(len - old_len)?;
        self.storage.verify();
        for index in old_len..len {
            let value = f();
            unsafe {
                self.storage.as_mut_ptr().add(index).write(value);
                self.storage.set_len(index + 1);
            }
        }
        Ok(())
    }

    /// Grows or shrinks the array to `len` elements, filling new slots with
    /// `T::default()`.
    pub fn resize_default(&mut self, len: usize) -> Result<()>
    where
        T: Default,
    {
        self.resize_with(len, T::default)
    }

    /// Keeps only the elements in `range`, moving them to the front.
    #[track_caller]
    pub fn assign_within(&mut self, range: Range<usize>) {
        let len = self.len();
        assert!(
            range.start <= range.end && range.end <= len,
            "range {range:?} out of bounds for array of length {len}"
        );
        self.truncate(range.end);
        self.erase_range(0, range.start);
    }
}

impl<T, S: Storage<T>, C: CopyStrategy<T>> ArrayBase<T, S, C> {
    /// Replaces the whole contents with clones of `values`.
    ///
    /// Existing elements are overwritten in place where possible; a new block is only
    /// allocated when `values` does not fit the current capacity, and in that case the
    /// array is unchanged on failure.
    pub fn assign_slice(&mut self, values: &[T]) -> Result<()> {
        let len = self.len();
        let count = values.len();
        if count > self.capacity() {
            let mut fresh = Self::with_capacity(count)?;
            fresh.append_slice(values)?;
            self.views.assert_released("reallocation");
            std::mem::swap(&mut self.storage, &mut fresh.storage);
            return Ok(());
        }
        let common = len.min(count);
        self.storage.verify();
        unsafe { C::assign(values.as_ptr(), self.storage.as_mut_ptr(), common) };
        if count < len {
            self.truncate(count);
            Ok(())
        } else {
            self.append_slice(&values[common..])
        }
    }

    /// Replaces the whole contents with `count` clones of `value`.
    pub fn assign_fill(&mut self, count: usize, value: &T) -> Result<()> {
        self.splice(0, self.len(), Repeat { value, count })
    }

    /// Grows or shrinks the array to `len` elements, filling new slots with clones of
    /// `value`.
    pub fn resize(&mut self, len: usize, value: &T) -> Result<()> {
        let old_len = self.len();
        if len <= old_len {
            self.truncate(len);
            Ok(())
        } else {
            self.append_fill(len - old_len, value)
        }
    }
}
