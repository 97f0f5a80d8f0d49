//! Removing elements.

use std::ptr;

use crate::{ArrayBase, storage::Storage, strategy::ElementStrategy};

impl<T, S: Storage<T>, C: ElementStrategy<T>> ArrayBase<T, S, C> {
    /// Removes `count` elements starting at `pos`, shifting the tail down.
    ///
    /// Panics if the range does not lie within the array.
    #[track_caller]
    pub fn erase(&mut self, pos: usize, count: usize) {
        self.erase_range(pos, count);
    }

    /// Removes the first element. Panics if the array is empty.
    #[track_caller]
    pub fn erase_front(&mut self) {
        assert!(!self.is_empty(), "erase_front() on an empty array");
        self.erase_range(0, 1);
    }

    /// Removes the last element. Panics if the array is empty.
    #[track_caller]
    pub fn erase_back(&mut self) {
        assert!(!self.is_empty(), "erase_back() on an empty array");
        self.truncate(self.len() - 1);
    }

    /// Removes every element before `pos`.
    #[track_caller]
    pub fn erase_left(&mut self, pos: usize) {
        self.erase_range(0, pos);
    }

    /// Removes every element from `pos` on.
    #[track_caller]
    pub fn erase_right(&mut self, pos: usize) {
        let len = self.len();
        assert!(pos <= len, "position {pos} out of bounds for array of length {len}");
        self.truncate(pos);
    }

    /// Shortens the array to `len` elements. No-op if it is already that short.
    ///
    /// The capacity is kept.
    pub fn truncate(&mut self, len: usize) {
        let old_len = self.len();
        if len >= old_len {
            return;
        }
        self.views.assert_released("truncate");
        self.storage.verify();
        unsafe {
            self.storage.set_len(len);
            C::destroy(self.storage.as_mut_ptr().add(len), old_len - len);
        }
    }

    /// Destroys every element. The capacity is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Removes and returns the last element.
    pub fn pop_back(&mut self) -> Option<T> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        self.views.assert_released("pop_back");
        self.storage.verify();
        unsafe {
            self.storage.set_len(len - 1);
            Some(self.storage.as_ptr().add(len - 1).read())
        }
    }

    /// Removes and returns the first element, shifting the rest down.
    pub fn pop_front(&mut self) -> Option<T> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        self.views.assert_released("pop_front");
        self.storage.verify();
        unsafe {
            let base = self.storage.as_mut_ptr();
            let value = base.read();
            ptr::copy(base.add(1), base, len - 1);
            self.storage.set_len(len - 1);
            Some(value)
        }
    }

    /// Removes every element for which `predicate` returns `true`, keeping the others in
    /// their original order. Returns the number of elements removed.
    ///
    /// If `predicate` or a destructor panics, the elements not yet visited are kept.
    pub fn erase_if<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&mut T) -> bool,
    {
        let len = self.len();
        if len == 0 {
            return 0;
        }
        self.views.assert_released("erase_if");
        self.storage.verify();
        unsafe { self.storage.set_len(0) };

        // `[0, processed - removed)` are kept elements, `[processed, len)` are unvisited.
        struct Compact<'a, T, S: Storage<T>> {
            storage: &'a mut S,
            processed: usize,
            removed: usize,
            len: usize,
            _marker: std::marker::PhantomData<T>,
        }

        impl<T, S: Storage<T>> Drop for Compact<'_, T, S> {
            fn drop(&mut self) {
                let base = self.storage.as_mut_ptr();
                unsafe {
                    if self.removed != 0 {
                        ptr::copy(
                            base.add(self.processed),
                            base.add(self.processed - self.removed),
                            self.len - self.processed,
                        );
                    }
                    self.storage.set_len(self.len - self.removed);
                }
            }
        }

        let mut state = Compact {
            storage: &mut self.storage,
            processed: 0,
            removed: 0,
            len,
            _marker: std::marker::PhantomData::<T>,
        };
        let base = state.storage.as_mut_ptr();
        while state.processed < len {
            let current = unsafe { &mut *base.add(state.processed) };
            if predicate(current) {
                state.processed += 1;
                state.removed += 1;
                unsafe { C::destroy(current, 1) };
            } else {
                if state.removed != 0 {
                    unsafe {
                        ptr::copy_nonoverlapping(
                            current,
                            base.add(state.processed - state.removed),
                            1,
                        )
                    };
                }
                state.processed += 1;
            }
        }
        let removed = state.removed;
        drop(state);
        self.storage.verify();
        removed
    }
}
