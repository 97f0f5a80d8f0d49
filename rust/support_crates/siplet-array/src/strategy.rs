//! Element handling strategies.
//!
//! Moving an element is always a bitwise relocation in Rust, so the two strategies only
//! differ in how elements are duplicated and destroyed:
//!
//! - [`General`] clones element by element and runs destructors. It works for any `T`;
//!   the cloning operations additionally need `T: Clone`.
//! - [`Bitwise`] is restricted to `bytemuck::Pod` elements. Duplication collapses into
//!   `memcpy`/`memset`, destruction into nothing, and the self-referencing edits can be
//!   performed with plain `memmove`s instead of staging the source.
//!
//! The strategy is a type parameter of [`ArrayBase`](crate::ArrayBase), so the choice is
//! made once at compile time and every algorithm is monomorphized for it.

use std::ptr;

/// Destroys elements of type `T`.
///
/// # Safety
///
/// When `TRIVIAL` is `true`, `destroy` must be a no-op and, for implementors of
/// [`CopyStrategy`], every copying operation must be equivalent to a bitwise copy.
/// The array algorithms rely on this to replace element-wise loops with overlapping
/// `memmove`s.
pub unsafe trait ElementStrategy<T> {
    /// `true` when elements can be duplicated by copying bytes and never need dropping.
    const TRIVIAL: bool;

    /// Drops `count` live elements starting at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr..ptr + count` must hold live elements that are not used afterwards.
    unsafe fn destroy(ptr: *mut T, count: usize);
}

/// Duplicates elements of type `T` into raw or live slots.
///
/// # Safety
///
/// See [`ElementStrategy`].
pub unsafe trait CopyStrategy<T>: ElementStrategy<T> {
    /// Clones `count` elements from `src` into the uninitialized slots at `dst`.
    ///
    /// `written` is incremented after every element, so on unwind it tells the caller
    /// exactly how many slots hold live clones.
    ///
    /// # Safety
    ///
    /// `src..src + count` must be live, `dst..dst + count` must be writable and must not
    /// overlap the source.
    unsafe fn clone_into(src: *const T, dst: *mut T, count: usize, written: &mut usize);

    /// Writes `count` clones of `value` into the uninitialized slots at `dst`, counting
    /// progress in `written` the same way as [`clone_into`](Self::clone_into).
    ///
    /// # Safety
    ///
    /// `dst..dst + count` must be writable and must not contain `value`.
    unsafe fn fill(value: &T, dst: *mut T, count: usize, written: &mut usize);

    /// Overwrites the live elements at `dst` with clones of the elements at `src`.
    ///
    /// # Safety
    ///
    /// Both ranges must be live and must not overlap.
    unsafe fn assign(src: *const T, dst: *mut T, count: usize);

    /// Returns a copy of `value`.
    fn duplicate(value: &T) -> T;
}

/// Strategy for arbitrary element types: clone and drop one element at a time.
pub enum General {}

/// Strategy for data-only element types (`bytemuck::Pod`): raw byte copies, no drops.
pub enum Bitwise {}

unsafe impl<T> ElementStrategy<T> for General {
    const TRIVIAL: bool = false;

    #[inline]
    unsafe fn destroy(ptr: *mut T, count: usize) {
        if std::mem::needs_drop::<T>() && count != 0 {
            unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(ptr, count)) }
        }
    }
}

unsafe impl<T: Clone> CopyStrategy<T> for General {
    unsafe fn clone_into(src: *const T, dst: *mut T, count: usize, written: &mut usize) {
        for i in 0..count {
            unsafe {
                let value = (*src.add(i)).clone();
                dst.add(i).write(value);
            }
            *written += 1;
        }
    }

    unsafe fn fill(value: &T, dst: *mut T, count: usize, written: &mut usize) {
        for i in 0..count {
            unsafe { dst.add(i).write(value.clone()) };
            *written += 1;
        }
    }

    unsafe fn assign(src: *const T, dst: *mut T, count: usize) {
        for i in 0..count {
            unsafe { (*dst.add(i)).clone_from(&*src.add(i)) };
        }
    }

    #[inline]
    fn duplicate(value: &T) -> T {
        value.clone()
    }
}

unsafe impl<T: bytemuck::Pod> ElementStrategy<T> for Bitwise {
    const TRIVIAL: bool = true;

    #[inline(always)]
    unsafe fn destroy(_ptr: *mut T, _count: usize) {}
}

unsafe impl<T: bytemuck::Pod> CopyStrategy<T> for Bitwise {
    #[inline]
    unsafe fn clone_into(src: *const T, dst: *mut T, count: usize, written: &mut usize) {
        unsafe { ptr::copy_nonoverlapping(src, dst, count) };
        *written += count;
    }

    unsafe fn fill(value: &T, dst: *mut T, count: usize, written: &mut usize) {
        if count == 0 {
            return;
        }
        if size_of::<T>() == 1 {
            let byte = bytemuck::bytes_of(value)[0];
            unsafe { dst.cast::<u8>().write_bytes(byte, count) };
        } else {
            // Seed one element, then keep doubling the initialized prefix.
            unsafe {
                dst.write(*value);
                let mut filled = 1;
                while filled < count {
                    let chunk = filled.min(count - filled);
                    ptr::copy_nonoverlapping(dst, dst.add(filled), chunk);
                    filled += chunk;
                }
            }
        }
        *written += count;
    }

    #[inline]
    unsafe fn assign(src: *const T, dst: *mut T, count: usize) {
        unsafe { ptr::copy_nonoverlapping(src, dst, count) }
    }

    #[inline]
    fn duplicate(value: &T) -> T {
        *value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::MaybeUninit;

    #[test]
    fn test_bitwise_fill_wide_elements() {
        let mut slots = [MaybeUninit::<u32>::uninit(); 13];
        let mut written = 0;
        unsafe {
            <Bitwise as CopyStrategy<u32>>::fill(
                &0xdead_beef,
                slots.as_mut_ptr().cast(),
                13,
                &mut written,
            );
        }
        assert_eq!(written, 13);
        for slot in &slots {
            assert_eq!(unsafe { slot.assume_init() }, 0xdead_beef);
        }
    }

    #[test]
    fn test_bitwise_fill_bytes() {
        let mut slots = [0u8; 7];
        let mut written = 0;
        unsafe {
            <Bitwise as CopyStrategy<u8>>::fill(&9, slots.as_mut_ptr().add(2), 4, &mut written);
        }
        assert_eq!(slots, [0, 0, 9, 9, 9, 9, 0]);
    }

    #[test]
    fn test_general_clone_into_counts_progress() {
        let src = ["a".to_string(), "b".to_string(), "c".to_string()];
        let mut dst = [const { MaybeUninit::<String>::uninit() }; 3];
        let mut written = 0;
        unsafe {
            <General as CopyStrategy<String>>::clone_into(
                src.as_ptr(),
                dst.as_mut_ptr().cast(),
                3,
                &mut written,
            );
        }
        assert_eq!(written, 3);
        let cloned: Vec<String> = dst.into_iter().map(|s| unsafe { s.assume_init() }).collect();
        assert_eq!(cloned, src);
    }

    #[test]
    fn test_general_destroy_runs_drop() {
        use std::rc::Rc;

        let rc = Rc::new(5);
        let mut slots = [Rc::clone(&rc), Rc::clone(&rc)];
        assert_eq!(Rc::strong_count(&rc), 3);
        unsafe { <General as ElementStrategy<Rc<i32>>>::destroy(slots.as_mut_ptr(), 2) };
        assert_eq!(Rc::strong_count(&rc), 1);
        std::mem::forget(slots);
    }
}
