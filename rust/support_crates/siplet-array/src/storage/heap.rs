use std::{alloc, marker::PhantomData, ptr::NonNull};

use siplet_common::{Result, error::Error};

use super::{Storage, released_with_live_elements};
use crate::debug::BlockLayout;

/// Dynamic-capacity storage backed by one heap block.
///
/// An empty storage (`capacity() == 0`) owns no allocation. Zero-sized element types
/// never allocate and report `max_size()` as their capacity.
pub struct HeapStorage<T> {
    /// First element slot. Dangling when nothing is allocated.
    ptr: NonNull<T>,
    /// Number of allocated element slots.
    cap: usize,
    /// Number of live elements.
    len: usize,
    _marker: PhantomData<T>,
}

unsafe impl<T: Send> Send for HeapStorage<T> {}

unsafe impl<T: Sync> Sync for HeapStorage<T> {}

impl<T> HeapStorage<T> {
    const IS_ZST: bool = size_of::<T>() == 0;

    /// Maximum number of elements of `T` any heap block can hold.
    #[inline]
    pub fn max_elements() -> usize {
        BlockLayout::max_elements::<T>()
    }

    fn allocate(capacity: usize) -> Result<HeapStorage<T>> {
        let max_size = Self::max_elements();
        if capacity > max_size {
            log::debug!("refusing heap block of {capacity} slots (max {max_size})");
            return Err(Error::capacity_exceeded(capacity, max_size));
        }
        let block = BlockLayout::for_array::<T>(capacity)
            .ok_or_else(|| Error::capacity_exceeded(capacity, max_size))?;
        let ptr = unsafe {
            let base = alloc::alloc(block.layout());
            if base.is_null() {
                alloc::handle_alloc_error(block.layout());
            }
            block.arm(base);
            NonNull::new_unchecked(base.add(block.data_offset()).cast::<T>())
        };
        Ok(HeapStorage {
            ptr,
            cap: capacity,
            len: 0,
            _marker: PhantomData,
        })
    }

    /// Layout and base address of the current block, if one is allocated.
    fn block(&self) -> Option<(BlockLayout, *mut u8)> {
        if Self::IS_ZST || self.cap == 0 {
            return None;
        }
        // The layout was representable when the block was allocated.
        let block = BlockLayout::for_array::<T>(self.cap)?;
        let base = unsafe { self.ptr.as_ptr().cast::<u8>().sub(block.data_offset()) };
        Some((block, base))
    }
}

unsafe impl<T> Storage<T> for HeapStorage<T> {
    const GROWABLE: bool = true;

    #[inline]
    fn new() -> Self {
        HeapStorage {
            ptr: NonNull::dangling(),
            cap: 0,
            len: 0,
            _marker: PhantomData,
        }
    }

    fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 || Self::IS_ZST {
            return Ok(Self::new());
        }
        Self::allocate(capacity)
    }

    #[inline]
    fn max_size(&self) -> usize {
        Self::max_elements()
    }

    #[inline]
    fn capacity(&self) -> usize {
        if Self::IS_ZST {
            Self::max_elements()
        } else {
            self.cap
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.capacity());
        self.len = len;
    }

    #[inline]
    fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline]
    fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// O(1): exchanges the block pointers, capacities and lengths.
    #[inline]
    fn swap_contents(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    fn verify(&self) {
        if let Some((block, base)) = self.block() {
            unsafe { block.verify(base) };
        }
    }
}

impl<T> Drop for HeapStorage<T> {
    fn drop(&mut self) {
        if self.len != 0 && !std::thread::panicking() {
            released_with_live_elements(self.len);
        }
        if let Some((block, base)) = self.block() {
            if !std::thread::panicking() {
                unsafe { block.verify(base) };
            }
            unsafe { alloc::dealloc(base, block.layout()) };
        }
    }
}
