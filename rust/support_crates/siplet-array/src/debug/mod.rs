//! Debug instrumentation wrapped around array storage.
//!
//! Two facilities live here:
//!
//! - overflow canaries: fixed byte patterns placed immediately before and after the
//!   element slots of every block, verified before and after each mutating call and
//!   when the storage is released;
//! - raw-view tracking: a shared counter of the [`RawView`](crate::RawView)s handed out
//!   by an array, asserted to be zero before any operation that moves or frees elements.
//!
//! Both are compiled in for debug builds or with the `checked` feature. Otherwise the
//! same types are provided by a zero-sized, no-op implementation, so the storage and
//! algorithm code is identical in both configurations.

#[cfg_attr(any(debug_assertions, feature = "checked"), path = "checked.rs")]
#[cfg_attr(not(any(debug_assertions, feature = "checked")), path = "unchecked.rs")]
mod imp;

pub(crate) use imp::{BlockLayout, Guard, ViewCounter, ViewToken};
pub use imp::CHECKED;
