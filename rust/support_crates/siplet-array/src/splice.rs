//! The single edit primitive every insert, replace, append and assign reduces to.
//!
//! `splice(pos, n1, writer)` removes `n1` elements at `pos` and writes `writer.count()`
//! new ones in their place. Two regimes exist:
//!
//! - *in place* when the result fits the current capacity: the removed elements are
//!   destroyed, the tail is moved to its final position, then the gap is filled;
//! - *reallocating* otherwise: a new block is allocated, the kept elements are moved
//!   around the gap, the gap is filled while the old block (and the removed elements in
//!   it) is still alive, and only then is the old block released.
//!
//! A writer whose source lies inside the array resolves its source indices through a
//! [`Remap`], which knows where every original index lives at the time the gap is
//! written.

use std::{marker::PhantomData, ops::Range, ptr};

use siplet_common::{Result, error::Error};

use crate::{
    ArrayBase,
    storage::{HeapStorage, Storage},
    strategy::{CopyStrategy, ElementStrategy},
};

/// Current location of the elements of the array as they were before the edit.
pub(crate) struct Remap<T> {
    /// Elements `[0, pos)`.
    front: *const T,
    /// Elements `[pos, end)`; null once they have been destroyed.
    removed: *const T,
    /// Element `end + k` lives at `tail + k`.
    tail: *const T,
    pos: usize,
    end: usize,
}

impl<T> Remap<T> {
    fn locate(&self, index: usize) -> *const T {
        unsafe {
            if index < self.pos {
                self.front.add(index)
            } else if index < self.end {
                debug_assert!(!self.removed.is_null(), "source was destroyed by the edit");
                self.removed.add(index)
            } else {
                self.tail.add(index - self.end)
            }
        }
    }

    /// Length of the run starting at `index` that stays contiguous after remapping.
    fn run_len(&self, index: usize, limit: usize) -> usize {
        let boundary = if index < self.pos {
            self.pos
        } else if index < self.end {
            self.end
        } else {
            limit
        };
        boundary.min(limit) - index
    }
}

/// Produces the elements written into the gap of a splice.
pub(crate) trait GapWriter<T, C: ElementStrategy<T>> {
    /// Number of elements written.
    fn count(&self) -> usize;

    /// Internal source range, if the writer reads from the array itself.
    fn internal(&self) -> Option<Range<usize>> {
        None
    }

    /// Writes `count()` elements into the uninitialized slots at `dst`, bumping
    /// `written` after each one.
    ///
    /// # Safety
    ///
    /// `dst..dst + count()` must be writable and must not overlap the source.
    unsafe fn write(self, dst: *mut T, remap: &Remap<T>, written: &mut usize);
}

/// Moves owned values into the gap. The caller must forget the source afterwards.
pub(crate) struct MoveIn<T> {
    pub(crate) src: *const T,
    pub(crate) count: usize,
}

impl<T, C: ElementStrategy<T>> GapWriter<T, C> for MoveIn<T> {
    fn count(&self) -> usize {
        self.count
    }

    unsafe fn write(self, dst: *mut T, _remap: &Remap<T>, written: &mut usize) {
        unsafe { ptr::copy_nonoverlapping(self.src, dst, self.count) };
        *written += self.count;
    }
}

/// Moves a single owned value into the gap.
///
/// The value stays in `slot` until it is written, so an edit that fails or unwinds
/// before that point leaves it to be dropped by the caller.
pub(crate) struct MoveOne<'a, T> {
    pub(crate) slot: &'a mut Option<T>,
}

impl<T, C: ElementStrategy<T>> GapWriter<T, C> for MoveOne<'_, T> {
    fn count(&self) -> usize {
        self.slot.is_some() as usize
    }

    unsafe fn write(self, dst: *mut T, _remap: &Remap<T>, written: &mut usize) {
        if let Some(value) = self.slot.take() {
            unsafe { dst.write(value) };
            *written += 1;
        }
    }
}

/// Where a cloning writer reads from.
pub(crate) enum Origin<T> {
    External(*const T),
    /// Index of the first source element inside the array, before the edit.
    Internal(usize),
}

/// Clones a contiguous run of elements into the gap.
pub(crate) struct CloneFrom<T> {
    pub(crate) origin: Origin<T>,
    pub(crate) count: usize,
}

impl<T> CloneFrom<T> {
    pub(crate) fn external(values: &[T]) -> CloneFrom<T> {
        CloneFrom {
            origin: Origin::External(values.as_ptr()),
            count: values.len(),
        }
    }

    pub(crate) fn internal(range: Range<usize>) -> CloneFrom<T> {
        CloneFrom {
            origin: Origin::Internal(range.start),
            count: range.len(),
        }
    }
}

impl<T, C: CopyStrategy<T>> GapWriter<T, C> for CloneFrom<T> {
    fn count(&self) -> usize {
        self.count
    }

    fn internal(&self) -> Option<Range<usize>> {
        match self.origin {
            Origin::Internal(start) => Some(start..start + self.count),
            Origin::External(_) => None,
        }
    }

    unsafe fn write(self, dst: *mut T, remap: &Remap<T>, written: &mut usize) {
        match self.origin {
            Origin::External(src) => unsafe { C::clone_into(src, dst, self.count, written) },
            Origin::Internal(start) => {
                let limit = start + self.count;
                let mut index = start;
                while index < limit {
                    let run = remap.run_len(index, limit);
                    unsafe {
                        C::clone_into(remap.locate(index), dst.add(index - start), run, written)
                    };
                    index += run;
                }
            }
        }
    }
}

/// Writes `count` clones of one value that does not live inside the array.
pub(crate) struct Repeat<'a, T> {
    pub(crate) value: &'a T,
    pub(crate) count: usize,
}

impl<T, C: CopyStrategy<T>> GapWriter<T, C> for Repeat<'_, T> {
    fn count(&self) -> usize {
        self.count
    }

    unsafe fn write(self, dst: *mut T, _remap: &Remap<T>, written: &mut usize) {
        unsafe { C::fill(self.value, dst, self.count, written) }
    }
}

/// Clones written into a fresh block. Destroyed if the writer unwinds.
struct Fresh<T, C: ElementStrategy<T>> {
    dst: *mut T,
    written: usize,
    _marker: PhantomData<fn() -> C>,
}

impl<T, C: ElementStrategy<T>> Drop for Fresh<T, C> {
    fn drop(&mut self) {
        unsafe { C::destroy(self.dst, self.written) }
    }
}

/// An open gap inside the current block.
///
/// While alive, the storage length is `pos`; `written` live elements follow it and the
/// `tail` elements sit at `tail_at`. Dropping the guard (on unwind) destroys the written
/// elements and closes the gap; [`close`](Self::close) commits them instead.
struct Reopen<'a, T, S: Storage<T>, C: ElementStrategy<T>> {
    storage: &'a mut S,
    pos: usize,
    written: usize,
    tail_at: usize,
    tail: usize,
    _marker: PhantomData<fn() -> (T, C)>,
}

impl<'a, T, S: Storage<T>, C: ElementStrategy<T>> Reopen<'a, T, S, C> {
    fn open(storage: &'a mut S, pos: usize, end: usize) -> Self {
        let tail = storage.len() - end;
        unsafe { storage.set_len(pos) };
        Reopen {
            storage,
            pos,
            written: 0,
            tail_at: end,
            tail,
            _marker: PhantomData,
        }
    }

    fn base(&mut self) -> *mut T {
        self.storage.as_mut_ptr()
    }

    /// Moves the tail so that it starts at `index`.
    fn move_tail(&mut self, index: usize) {
        if index != self.tail_at && self.tail != 0 {
            let base = self.base();
            unsafe { ptr::copy(base.add(self.tail_at), base.add(index), self.tail) };
        }
        self.tail_at = index;
    }

    fn close(mut self) {
        let end = self.pos + self.written;
        self.move_tail(end);
        unsafe { self.storage.set_len(end + self.tail) };
        std::mem::forget(self);
    }
}

impl<T, S: Storage<T>, C: ElementStrategy<T>> Drop for Reopen<'_, T, S, C> {
    fn drop(&mut self) {
        let base = self.base();
        unsafe { C::destroy(base.add(self.pos), self.written) };
        self.written = 0;
        self.move_tail(self.pos);
        unsafe { self.storage.set_len(self.pos + self.tail) };
    }
}

impl<T, S: Storage<T>, C: ElementStrategy<T>> ArrayBase<T, S, C> {
    /// Replaces `[pos, pos + n1)` with the elements produced by `writer`.
    ///
    /// Fails only on capacity, before anything is modified. If the writer panics while
    /// reallocating, the array is left untouched; if it panics in place, the removed
    /// elements are gone and the gap is closed.
    #[track_caller]
    pub(crate) fn splice<W: GapWriter<T, C>>(
        &mut self,
        pos: usize,
        n1: usize,
        writer: W,
    ) -> Result<()> {
        let len = self.len();
        let end = check_range(pos, n1, len);
        let n2 = writer.count();
        let new_len = (len - n1)
            .checked_add(n2)
            .ok_or_else(|| Error::capacity_overflow(len - n1, n2))?;
        self.storage.verify();
        if new_len > self.capacity() {
            let capacity = self.calculate_auto_capacity(new_len - len)?;
            self.splice_relocating(pos, end, new_len, capacity, writer)?;
        } else {
            if n1 != 0 || end != len {
                self.views.assert_released("shifting elements");
            }
            debug_assert!(
                writer.internal().is_none_or(|src| {
                    src.is_empty() || src.start.max(pos) >= src.end.min(end)
                }),
                "in-place source overlaps the removed range"
            );
            let mut gap = Reopen::<T, S, C>::open(&mut self.storage, pos, end);
            let base = gap.base();
            unsafe { C::destroy(base.add(pos), n1) };
            gap.move_tail(pos + n2);
            let remap = Remap {
                front: base,
                removed: ptr::null(),
                tail: unsafe { base.add(pos + n2) },
                pos,
                end,
            };
            unsafe { writer.write(base.add(pos), &remap, &mut gap.written) };
            gap.close();
        }
        self.storage.verify();
        Ok(())
    }

    fn splice_relocating<W: GapWriter<T, C>>(
        &mut self,
        pos: usize,
        end: usize,
        new_len: usize,
        capacity: usize,
        writer: W,
    ) -> Result<()> {
        self.views.assert_released("reallocation");
        let len = self.len();
        let n2 = writer.count();
        let mut fresh = S::with_capacity(capacity)?;
        log::trace!("relocating {len} elements into a block of {capacity} slots");
        let old = self.storage.as_mut_ptr();
        let new = fresh.as_mut_ptr();
        unsafe {
            // Bitwise copies: the old block keeps ownership until the gap is written.
            ptr::copy_nonoverlapping(old, new, pos);
            ptr::copy_nonoverlapping(old.add(end), new.add(pos + n2), len - end);
        }
        let remap = Remap {
            front: new,
            removed: old,
            tail: unsafe { new.add(pos + n2) },
            pos,
            end,
        };
        let mut gap = Fresh::<T, C> {
            dst: unsafe { new.add(pos) },
            written: 0,
            _marker: PhantomData,
        };
        unsafe { writer.write(gap.dst, &remap, &mut gap.written) };
        std::mem::forget(gap);
        unsafe {
            fresh.set_len(new_len);
            self.storage.set_len(0);
        }
        std::mem::swap(&mut self.storage, &mut fresh);
        // `fresh` now holds the old block; only the removed elements are still live in it.
        unsafe { C::destroy(fresh.as_mut_ptr().add(pos), end - pos) };
        drop(fresh);
        Ok(())
    }

    /// Removes `[pos, pos + count)`, shifting the tail down.
    #[track_caller]
    pub(crate) fn erase_range(&mut self, pos: usize, count: usize) {
        let len = self.len();
        let end = check_range(pos, count, len);
        if count == 0 {
            return;
        }
        self.views.assert_released("erase");
        self.storage.verify();
        let mut gap = Reopen::<T, S, C>::open(&mut self.storage, pos, end);
        let base = gap.base();
        unsafe { C::destroy(base.add(pos), count) };
        gap.close();
        self.storage.verify();
    }
}

impl<T, S: Storage<T>, C: CopyStrategy<T>> ArrayBase<T, S, C> {
    /// Replaces `[pos, pos + n1)` with clones of the array's own `src` range, as they
    /// were before the edit.
    #[track_caller]
    pub(crate) fn splice_within(&mut self, pos: usize, n1: usize, src: Range<usize>) -> Result<()> {
        let len = self.len();
        let end = check_range(pos, n1, len);
        assert!(
            src.start <= src.end && src.end <= len,
            "source range {src:?} out of bounds for array of length {len}"
        );
        let n2 = src.len();
        let fits = (len - n1).checked_add(n2).is_some_and(|n| n <= self.capacity());
        if !fits {
            // The removed elements stay alive in the old block while the gap is written.
            return self.splice(pos, n1, CloneFrom::internal(src));
        }
        if C::TRIVIAL {
            self.splice_trivial_within(pos, end, src);
            return Ok(());
        }
        if src.start.max(pos) < src.end.min(end) {
            return self.splice_staged(pos, n1, src);
        }
        self.splice(pos, n1, CloneFrom::internal(src))
    }

    /// In-place self-referencing splice for bitwise elements: plain `memmove`s, ordered
    /// so that no source byte is overwritten before it is read.
    fn splice_trivial_within(&mut self, pos: usize, end: usize, src: Range<usize>) {
        let len = self.len();
        let n1 = end - pos;
        let n2 = src.len();
        let tail = len - end;
        if n1 != 0 || tail != 0 {
            self.views.assert_released("shifting elements");
        }
        self.storage.verify();
        let base = self.storage.as_mut_ptr();
        unsafe {
            if n2 <= n1 {
                ptr::copy(base.add(src.start), base.add(pos), n2);
                ptr::copy(base.add(end), base.add(pos + n2), tail);
            } else {
                ptr::copy(base.add(end), base.add(pos + n2), tail);
                // Source elements at or past `end` moved up with the tail.
                let split = end.clamp(src.start, src.end);
                let low = split - src.start;
                ptr::copy(base.add(src.start), base.add(pos), low);
                ptr::copy(base.add(split + n2 - n1), base.add(pos + low), n2 - low);
            }
            self.storage.set_len(len - n1 + n2);
        }
        self.storage.verify();
    }

    /// Copies the source out first, then moves the copies in. Used when the source
    /// overlaps the elements the edit destroys.
    fn splice_staged(&mut self, pos: usize, n1: usize, src: Range<usize>) -> Result<()> {
        let mut staged = ArrayBase::<T, HeapStorage<T>, C>::from_slice(&self.as_slice()[src])?;
        let count = staged.len();
        let moved = MoveIn {
            src: staged.as_ptr(),
            count,
        };
        self.splice(pos, n1, moved)?;
        unsafe { staged.storage.set_len(0) };
        Ok(())
    }
}

/// Asserts that `[pos, pos + count)` lies within `len` and returns `pos + count`.
#[track_caller]
pub(crate) fn check_range(pos: usize, count: usize, len: usize) -> usize {
    assert!(pos <= len, "position {pos} out of bounds for array of length {len}");
    assert!(
        count <= len - pos,
        "range {pos}..{pos}+{count} out of bounds for array of length {len}"
    );
    pos + count
}

#[cfg(test)]
mod tests {
    use crate::{Array, FixedArray, PodArray};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_insert_within_straddling_pos_in_place() {
        let mut a = Array::<String>::with_capacity(8).unwrap();
        a.append_slice(&strings(&["a", "b", "c"])).unwrap();
        a.insert_within(1, 0..3).unwrap();
        assert_eq!(a.as_slice(), strings(&["a", "a", "b", "c", "b", "c"]));
        assert_eq!(a.capacity(), 8);

        let mut p = PodArray::<u32>::with_capacity(8).unwrap();
        p.append_slice(&[1, 2, 3]).unwrap();
        p.insert_within(1, 0..3).unwrap();
        assert_eq!(p, [1, 1, 2, 3, 2, 3]);
        assert_eq!(p.capacity(), 8);

        let mut f = FixedArray::<String, 6>::from_slice(&strings(&["x", "y"])).unwrap();
        f.insert_within(1, 0..2).unwrap();
        assert_eq!(f.as_slice(), strings(&["x", "x", "y", "y"]));
    }

    #[test]
    fn test_empty_source_inside_removed_range() {
        let mut a = Array::from_slice(&strings(&["a", "b", "c"])).unwrap();
        a.replace_within(0, 2, 1..1).unwrap();
        assert_eq!(a.as_slice(), strings(&["c"]));

        let mut p = PodArray::<u8>::from_slice(&[1, 2, 3]).unwrap();
        p.replace_within(0, 2, 1..1).unwrap();
        assert_eq!(p, [3]);
    }

    #[test]
    fn test_zero_sized_insert_within() {
        let mut a = Array::<()>::from_slice(&[(), (), ()]).unwrap();
        a.insert_within(1, 0..3).unwrap();
        assert_eq!(a.len(), 6);
        a.replace_within(0, 2, 1..1).unwrap();
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn test_replace_value_out_of_range_drops_value() {
        use std::rc::Rc;

        let value = Rc::new(5);
        let mut a = Array::<Rc<i32>>::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            a.insert(3, Rc::clone(&value))
        }));
        assert!(result.is_err());
        assert_eq!(Rc::strong_count(&value), 1);
    }

    #[test]
    fn test_replace_value_capacity_error_drops_value() {
        use std::rc::Rc;

        let value = Rc::new(5);
        let mut f = FixedArray::<Rc<i32>, 1>::new();
        f.push_back(Rc::clone(&value)).unwrap();
        assert!(f.push_front(Rc::clone(&value)).is_err());
        assert_eq!(Rc::strong_count(&value), 2);
        assert_eq!(f.len(), 1);
    }
}
