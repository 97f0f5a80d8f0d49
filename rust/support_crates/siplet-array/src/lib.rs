//! Growable and fixed-capacity contiguous arrays with manual capacity management.
//!
//! [`ArrayBase`] is one generic container parameterized by where its elements live
//! ([`HeapStorage`] or [`FixedStorage`]) and by how they are duplicated and destroyed
//! ([`General`] or [`Bitwise`]). The common combinations have aliases:
//!
//! | alias | storage | elements |
//! |---|---|---|
//! | [`Array<T>`] | heap | any `T` |
//! | [`PodArray<T>`] | heap | `bytemuck::Pod` |
//! | [`FixedArray<T, N>`] | inline, `N` slots | any `T` |
//! | [`FixedPodArray<T, N>`] | inline, `N` slots | `bytemuck::Pod` |
//! | [`ByteArray`], [`FixedByteArray<N>`] | as above | `u8`, with integer codecs |
//!
//! All edits reduce to one primitive, `replace(pos, n1, source)`, which handles sources
//! that live inside the array itself (`*_within` and `*_raw` operations) even when the
//! edit shifts or reallocates the elements being read.
//!
//! Debug builds (or the `checked` feature) add overflow canaries around every block and
//! track outstanding [`RawView`]s; see [`CHECKED`].

mod alias;
mod array;
mod assign;
mod bytes;
mod debug;
mod erase;
pub mod growth;
mod insert;
mod splice;
pub mod storage;
pub mod strategy;
mod view;

#[cfg(test)]
mod tests;

pub use array::ArrayBase;
pub use bytes::Endian;
pub use debug::CHECKED;
pub use storage::{FixedStorage, HeapStorage, Storage};
pub use strategy::{Bitwise, CopyStrategy, ElementStrategy, General};
pub use view::{RawView, RawViewMut};

/// Heap array of arbitrary elements.
pub type Array<T> = ArrayBase<T, HeapStorage<T>, General>;

/// Heap array of plain-data elements.
pub type PodArray<T> = ArrayBase<T, HeapStorage<T>, Bitwise>;

/// Array of arbitrary elements with `N` inline slots.
pub type FixedArray<T, const N: usize> = ArrayBase<T, FixedStorage<T, N>, General>;

/// Array of plain-data elements with `N` inline slots.
pub type FixedPodArray<T, const N: usize> = ArrayBase<T, FixedStorage<T, N>, Bitwise>;

pub type ByteArray = PodArray<u8>;

pub type FixedByteArray<const N: usize> = FixedPodArray<u8, N>;
