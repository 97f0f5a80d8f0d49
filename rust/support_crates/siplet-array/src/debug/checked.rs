use std::{
    alloc::Layout,
    sync::{
        Arc, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};

/// `true` when canaries and view tracking are compiled in.
pub const CHECKED: bool = true;

const CANARY_LEN: usize = 16;

const CANARY: [u8; CANARY_LEN] = [
    0xde, 0xad, 0xbe, 0xef, 0x5a, 0xa5, 0xc3, 0x3c, 0xfe, 0xed, 0xfa, 0xce, 0x0d, 0xf0, 0xad, 0x8b,
];

/// Canary bytes stored inline on either side of a fixed-capacity element array.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub(crate) struct Guard([u8; CANARY_LEN]);

impl Guard {
    pub(crate) const fn new() -> Guard {
        Guard(CANARY)
    }

    #[inline]
    pub(crate) fn verify(&self, side: &str) {
        assert!(
            self.0 == CANARY,
            "{side} canary overwritten: buffer overflow detected"
        );
    }
}

/// Layout of a heap block holding `capacity` elements flanked by two canaries.
///
/// ```text
/// | padding | head canary | element slots ... | tail canary |
///                         ^ data_offset       ^ tail_offset
/// ```
///
/// Both canaries touch the element slots, so an off-by-one write on either side lands
/// in a canary rather than in padding.
pub(crate) struct BlockLayout {
    layout: Layout,
    data_offset: usize,
    tail_offset: usize,
}

impl BlockLayout {
    /// Computes the block layout, or `None` if it is not representable.
    pub(crate) fn for_array<T>(capacity: usize) -> Option<BlockLayout> {
        let align = align_of::<T>();
        let data_offset = CANARY_LEN.next_multiple_of(align);
        let tail_offset = capacity
            .checked_mul(size_of::<T>())?
            .checked_add(data_offset)?;
        let size = tail_offset.checked_add(CANARY_LEN)?;
        let layout = Layout::from_size_align(size, align).ok()?;
        Some(BlockLayout {
            layout,
            data_offset,
            tail_offset,
        })
    }

    /// Largest element count whose block layout is representable.
    pub(crate) fn max_elements<T>() -> usize {
        let reserved = CANARY_LEN.next_multiple_of(align_of::<T>()) + CANARY_LEN + align_of::<T>();
        match size_of::<T>() {
            0 => isize::MAX as usize,
            size => (isize::MAX as usize - reserved) / size,
        }
    }

    #[inline]
    pub(crate) fn layout(&self) -> Layout {
        self.layout
    }

    #[inline]
    pub(crate) fn data_offset(&self) -> usize {
        self.data_offset
    }

    /// Writes both canaries into a freshly allocated block.
    ///
    /// # Safety
    ///
    /// `block` must point to an allocation made with [`layout`](Self::layout).
    pub(crate) unsafe fn arm(&self, block: *mut u8) {
        unsafe {
            block
                .add(self.data_offset - CANARY_LEN)
                .copy_from_nonoverlapping(CANARY.as_ptr(), CANARY_LEN);
            block
                .add(self.tail_offset)
                .copy_from_nonoverlapping(CANARY.as_ptr(), CANARY_LEN);
        }
    }

    /// Panics if either canary of the block has been overwritten.
    ///
    /// # Safety
    ///
    /// `block` must point to an allocation made with [`layout`](Self::layout) and armed
    /// with [`arm`](Self::arm).
    pub(crate) unsafe fn verify(&self, block: *const u8) {
        let (head, tail) = unsafe {
            (
                std::slice::from_raw_parts(block.add(self.data_offset - CANARY_LEN), CANARY_LEN),
                std::slice::from_raw_parts(block.add(self.tail_offset), CANARY_LEN),
            )
        };
        assert!(
            head == CANARY,
            "head canary overwritten: buffer underflow detected"
        );
        assert!(
            tail == CANARY,
            "tail canary overwritten: buffer overflow detected"
        );
    }
}

/// Counts the raw views currently borrowed from one array.
///
/// The counter is shared with every [`ViewToken`] through an `Arc`, so a view may be
/// dropped on a different thread than the one that created it, and it is allocated on
/// the first view only.
#[derive(Default)]
pub(crate) struct ViewCounter(OnceLock<Arc<AtomicUsize>>);

impl ViewCounter {
    pub(crate) fn acquire(&self) -> ViewToken {
        let counter = Arc::clone(self.0.get_or_init(Default::default));
        counter.fetch_add(1, Ordering::AcqRel);
        ViewToken(counter)
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.0.get().map_or(0, |counter| counter.load(Ordering::Acquire))
    }

    /// Panics if any view is still alive. Skipped while unwinding, so that dropping an
    /// array during a panic does not abort the process.
    #[track_caller]
    pub(crate) fn assert_released(&self, operation: &str) {
        let outstanding = self.outstanding();
        if outstanding != 0 && !std::thread::panicking() {
            panic!("{operation} while {outstanding} view(s) into the array are outstanding");
        }
    }
}

// A copy of an array starts without views of its own.
impl Clone for ViewCounter {
    fn clone(&self) -> Self {
        ViewCounter::default()
    }
}

/// Held by a raw view; releases its slot in the [`ViewCounter`] on drop.
pub(crate) struct ViewToken(Arc<AtomicUsize>);

impl Drop for ViewToken {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
