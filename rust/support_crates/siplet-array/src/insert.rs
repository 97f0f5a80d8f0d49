//! Appending, inserting and replacing elements.
//!
//! Every operation here is a [`splice`](ArrayBase::splice) with a particular writer:
//! `push_back(x)` is `replace(len, 0, [x])`, `insert(pos, ..)` is `replace(pos, 0, ..)`.
//! The `*_within` variants take their source from the array itself and are safe even
//! when the edit moves or reallocates the elements they read.

use std::ops::Range;

use siplet_common::Result;

use crate::{
    ArrayBase,
    splice::{CloneFrom, MoveOne, Repeat},
    storage::Storage,
    strategy::{CopyStrategy, ElementStrategy},
};

impl<T, S: Storage<T>, C: ElementStrategy<T>> ArrayBase<T, S, C> {
    /// Appends `value`. On failure the value is dropped and the array is unchanged.
    #[inline]
    pub fn push_back(&mut self, value: T) -> Result<()> {
        let len = self.len();
        if len < self.capacity() {
            self.storage.verify();
            unsafe {
                self.storage.as_mut_ptr().add(len).write(value);
                self.storage.set_len(len + 1);
            }
            return Ok(());
        }
        self.replace_value(len, 0, value)
    }

    /// Inserts `value` at the front, shifting every element up.
    pub fn push_front(&mut self, value: T) -> Result<()> {
        self.replace_value(0, 0, value)
    }

    /// Inserts `value` before the element at `pos`. Panics if `pos > len()`.
    #[track_caller]
    pub fn insert(&mut self, pos: usize, value: T) -> Result<()> {
        self.replace_value(pos, 0, value)
    }

    /// Replaces `[pos, pos + n1)` with the single element `value`.
    #[track_caller]
    pub fn replace_value(&mut self, pos: usize, n1: usize, value: T) -> Result<()> {
        let mut slot = Some(value);
        self.splice(pos, n1, MoveOne { slot: &mut slot })
    }

    /// Appends every item of `iter`.
    ///
    /// Items already appended stay in the array if a later one does not fit.
    pub fn append_iter<I>(&mut self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve_back(lower.min(self.max_size() - self.len()))?;
        for value in iter {
            self.push_back(value)?;
        }
        Ok(())
    }
}

impl<T, S: Storage<T>, C: CopyStrategy<T>> ArrayBase<T, S, C> {
    /// Appends clones of `values`.
    pub fn append_slice(&mut self, values: &[T]) -> Result<()> {
        self.splice(self.len(), 0, CloneFrom::external(values))
    }

    /// Appends `count` clones of `value`.
    pub fn append_fill(&mut self, count: usize, value: &T) -> Result<()> {
        self.splice(self.len(), 0, Repeat { value, count })
    }

    /// Appends clones of the array's own elements in `src`.
    #[track_caller]
    pub fn append_within(&mut self, src: Range<usize>) -> Result<()> {
        self.splice_within(self.len(), 0, src)
    }

    /// Appends a clone of the element at `index`.
    #[track_caller]
    pub fn push_back_within(&mut self, index: usize) -> Result<()> {
        self.splice_within(self.len(), 0, index..index + 1)
    }

    /// Inserts clones of `values` before `pos`.
    #[track_caller]
    pub fn insert_slice(&mut self, pos: usize, values: &[T]) -> Result<()> {
        self.splice(pos, 0, CloneFrom::external(values))
    }

    /// Inserts `count` clones of `value` before `pos`.
    #[track_caller]
    pub fn insert_fill(&mut self, pos: usize, count: usize, value: &T) -> Result<()> {
        self.splice(pos, 0, Repeat { value, count })
    }

    /// Inserts clones of the array's own elements in `src` (as they were before the
    /// insertion) before `pos`.
    #[track_caller]
    pub fn insert_within(&mut self, pos: usize, src: Range<usize>) -> Result<()> {
        self.splice_within(pos, 0, src)
    }

    /// Replaces `[pos, pos + n1)` with clones of `values`.
    ///
    /// Afterwards `[pos, pos + values.len())` equals `values` and the length has changed
    /// by `values.len() - n1`.
    #[track_caller]
    pub fn replace_slice(&mut self, pos: usize, n1: usize, values: &[T]) -> Result<()> {
        self.splice(pos, n1, CloneFrom::external(values))
    }

    /// Replaces `[pos, pos + n1)` with `count` clones of `value`.
    #[track_caller]
    pub fn replace_fill(&mut self, pos: usize, n1: usize, count: usize, value: &T) -> Result<()> {
        self.splice(pos, n1, Repeat { value, count })
    }

    /// Replaces `[pos, pos + n1)` with `count` clones of the element at `index`.
    ///
    /// The element is read before the edit, so it may lie inside the replaced range.
    #[track_caller]
    pub fn replace_fill_within(
        &mut self,
        pos: usize,
        n1: usize,
        count: usize,
        index: usize,
    ) -> Result<()> {
        let value = C::duplicate(self.at(index));
        self.splice(
            pos,
            n1,
            Repeat {
                value: &value,
                count,
            },
        )
    }

    /// Replaces `[pos, pos + n1)` with clones of the array's own elements in `src`.
    ///
    /// The result is the same as copying `src` out to a separate buffer first, whatever
    /// the overlap between `src` and the replaced range and whether or not the array
    /// reallocates.
    #[track_caller]
    pub fn replace_within(&mut self, pos: usize, n1: usize, src: Range<usize>) -> Result<()> {
        self.splice_within(pos, n1, src)
    }
}
