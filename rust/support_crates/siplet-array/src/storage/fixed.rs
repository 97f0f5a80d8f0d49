use std::mem::MaybeUninit;

use siplet_common::{Result, error::Error};

use super::{Storage, released_with_live_elements};
use crate::debug::Guard;

/// Inline storage for at most `N` elements.
///
/// The slots live inside the value itself, so moving a `FixedStorage` moves its
/// elements. Capacity is always `N`.
#[repr(C)]
pub struct FixedStorage<T, const N: usize> {
    head: Guard,
    data: [MaybeUninit<T>; N],
    tail: Guard,
    len: usize,
}

unsafe impl<T, const N: usize> Storage<T> for FixedStorage<T, N> {
    const GROWABLE: bool = false;

    #[inline]
    fn new() -> Self {
        FixedStorage {
            head: Guard::new(),
            data: [const { MaybeUninit::uninit() }; N],
            tail: Guard::new(),
            len: 0,
        }
    }

    fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity > N {
            return Err(Error::capacity_exceeded(capacity, N));
        }
        Ok(Self::new())
    }

    #[inline]
    fn max_size(&self) -> usize {
        N
    }

    #[inline]
    fn capacity(&self) -> usize {
        N
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(len <= N);
        self.len = len;
    }

    #[inline]
    fn as_ptr(&self) -> *const T {
        (&raw const self.data).cast::<T>()
    }

    #[inline]
    fn as_mut_ptr(&mut self) -> *mut T {
        (&raw mut self.data).cast::<T>()
    }

    /// Swaps the first `max(self.len, other.len)` slots of the two blocks and the lengths.
    /// Slots past either length are exchanged as uninitialized bytes.
    fn swap_contents(&mut self, other: &mut Self) {
        let count = self.len.max(other.len);
        unsafe {
            std::ptr::swap_nonoverlapping(self.data.as_mut_ptr(), other.data.as_mut_ptr(), count);
        }
        std::mem::swap(&mut self.len, &mut other.len);
    }

    #[inline]
    fn verify(&self) {
        self.head.verify("head");
        self.tail.verify("tail");
    }
}

impl<T, const N: usize> Drop for FixedStorage<T, N> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        if self.len != 0 {
            released_with_live_elements(self.len);
        }
        self.verify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_storage_capacity() {
        let storage = FixedStorage::<u16, 5>::new();
        assert_eq!(storage.capacity(), 5);
        assert_eq!(storage.max_size(), 5);
        assert_eq!(storage.len(), 0);
        assert!(storage.as_ptr().is_aligned());

        assert!(FixedStorage::<u16, 5>::with_capacity(5).is_ok());
        let err = FixedStorage::<u16, 5>::with_capacity(6).err().unwrap();
        assert!(err.is_capacity_exceeded());
    }

    #[test]
    fn test_fixed_storage_swap_unequal_lengths() {
        let mut a = FixedStorage::<u32, 4>::new();
        let mut b = FixedStorage::<u32, 4>::new();
        unsafe {
            a.as_mut_ptr().write(1);
            a.as_mut_ptr().add(1).write(2);
            a.as_mut_ptr().add(2).write(3);
            a.set_len(3);
            b.as_mut_ptr().write(9);
            b.set_len(1);
        }
        a.swap_contents(&mut b);
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 3);
        unsafe {
            assert_eq!(*a.as_ptr(), 9);
            assert_eq!(std::slice::from_raw_parts(b.as_ptr(), 3), &[1, 2, 3]);
            a.set_len(0);
            b.set_len(0);
        }
    }

    #[test]
    fn test_fixed_storage_zero_capacity() {
        let storage = FixedStorage::<String, 0>::new();
        assert_eq!(storage.capacity(), 0);
        storage.verify();
    }
}
