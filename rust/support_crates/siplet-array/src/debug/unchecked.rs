use std::alloc::Layout;

/// `true` when canaries and view tracking are compiled in.
pub const CHECKED: bool = false;

#[derive(Clone, Copy)]
pub(crate) struct Guard;

impl Guard {
    pub(crate) const fn new() -> Guard {
        Guard
    }

    #[inline(always)]
    pub(crate) fn verify(&self, _side: &str) {}
}

/// Plain array layout: no canaries, elements start at the beginning of the block.
pub(crate) struct BlockLayout {
    layout: Layout,
}

impl BlockLayout {
    #[inline]
    pub(crate) fn for_array<T>(capacity: usize) -> Option<BlockLayout> {
        Layout::array::<T>(capacity)
            .ok()
            .map(|layout| BlockLayout { layout })
    }

    #[inline]
    pub(crate) fn max_elements<T>() -> usize {
        match size_of::<T>() {
            0 => isize::MAX as usize,
            size => (isize::MAX as usize - align_of::<T>()) / size,
        }
    }

    #[inline]
    pub(crate) fn layout(&self) -> Layout {
        self.layout
    }

    #[inline(always)]
    pub(crate) fn data_offset(&self) -> usize {
        0
    }

    #[inline(always)]
    pub(crate) unsafe fn arm(&self, _block: *mut u8) {}

    #[inline(always)]
    pub(crate) unsafe fn verify(&self, _block: *const u8) {}
}

#[derive(Default, Clone)]
pub(crate) struct ViewCounter;

impl ViewCounter {
    #[inline(always)]
    pub(crate) fn acquire(&self) -> ViewToken {
        ViewToken
    }

    #[inline(always)]
    pub(crate) fn outstanding(&self) -> usize {
        0
    }

    #[inline(always)]
    pub(crate) fn assert_released(&self, _operation: &str) {}
}

pub(crate) struct ViewToken;
