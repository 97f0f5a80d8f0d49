mod drop_balance;
mod model;

use std::{cell::Cell, rc::Rc};

/// Element type that counts live instances and can be armed to panic when cloned.
#[derive(Debug)]
pub(crate) struct Tracked {
    pub(crate) value: u32,
    live: Rc<Cell<i64>>,
    clones_left: Rc<Cell<Option<usize>>>,
}

/// Shared counters for a family of [`Tracked`] values.
#[derive(Default, Clone)]
pub(crate) struct Tracker {
    live: Rc<Cell<i64>>,
    clones_left: Rc<Cell<Option<usize>>>,
}

impl Tracker {
    pub(crate) fn make(&self, value: u32) -> Tracked {
        self.live.set(self.live.get() + 1);
        Tracked {
            value,
            live: Rc::clone(&self.live),
            clones_left: Rc::clone(&self.clones_left),
        }
    }

    pub(crate) fn make_all(&self, values: impl IntoIterator<Item = u32>) -> Vec<Tracked> {
        values.into_iter().map(|v| self.make(v)).collect()
    }

    pub(crate) fn live(&self) -> i64 {
        self.live.get()
    }

    /// The next `count` clones succeed, the one after panics.
    pub(crate) fn panic_after(&self, count: usize) {
        self.clones_left.set(Some(count));
    }

    pub(crate) fn disarm(&self) {
        self.clones_left.set(None);
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        if let Some(left) = self.clones_left.get() {
            if left == 0 {
                self.clones_left.set(None);
                panic!("clone of {} failed", self.value);
            }
            self.clones_left.set(Some(left - 1));
        }
        self.live.set(self.live.get() + 1);
        Tracked {
            value: self.value,
            live: Rc::clone(&self.live),
            clones_left: Rc::clone(&self.clones_left),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

pub(crate) fn values(items: &[Tracked]) -> Vec<u32> {
    items.iter().map(|t| t.value).collect()
}
