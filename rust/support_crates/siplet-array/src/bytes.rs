//! Binary serialization helpers for byte arrays.
//!
//! Integers of 1 to 8 bytes can be appended, inserted, overwritten and read back at a
//! byte offset in big-endian, little-endian or native-endian order. Values are truncated
//! to the requested width; reading the same width and order back yields the truncated
//! value (sign-extended for the signed readers).

use std::io;

use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian};
use siplet_common::Result;

use crate::{ArrayBase, splice::CloneFrom, storage::Storage, strategy::Bitwise};

/// Byte order of an encoded integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Big,
    Little,
    Native,
}

/// Encodes the low `width` bytes of `value`.
#[track_caller]
fn encode(value: u64, width: usize, endian: Endian) -> [u8; 8] {
    check_width(width);
    let value = if width == 8 {
        value
    } else {
        value & ((1u64 << (8 * width)) - 1)
    };
    let mut buf = [0u8; 8];
    let out = &mut buf[..width];
    match endian {
        Endian::Big => BigEndian::write_uint(out, value, width),
        Endian::Little => LittleEndian::write_uint(out, value, width),
        Endian::Native => NativeEndian::write_uint(out, value, width),
    }
    buf
}

#[track_caller]
fn check_width(width: usize) {
    assert!(
        (1..=8).contains(&width),
        "integer width must be between 1 and 8 bytes, got {width}"
    );
}

impl<T: bytemuck::Pod, S: Storage<T>> ArrayBase<T, S, Bitwise> {
    /// The elements as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }
}

impl<S: Storage<u8>> ArrayBase<u8, S, Bitwise> {
    /// Appends the low `width` bytes of `value`.
    #[track_caller]
    pub fn append_uint(&mut self, value: u64, width: usize, endian: Endian) -> Result<()> {
        let buf = encode(value, width, endian);
        self.append_slice(&buf[..width])
    }

    /// Inserts the low `width` bytes of `value` at byte offset `pos`.
    #[track_caller]
    pub fn insert_uint(
        &mut self,
        pos: usize,
        value: u64,
        width: usize,
        endian: Endian,
    ) -> Result<()> {
        let buf = encode(value, width, endian);
        self.insert_slice(pos, &buf[..width])
    }

    /// Overwrites `width` existing bytes at `pos` with the low bytes of `value`.
    ///
    /// Panics if `pos + width > len()`.
    #[track_caller]
    pub fn set_uint(&mut self, pos: usize, value: u64, width: usize, endian: Endian) {
        let buf = encode(value, width, endian);
        let len = self.len();
        assert!(
            pos <= len && width <= len - pos,
            "cannot write {width} bytes at offset {pos} of a {len}-byte array"
        );
        self.storage.verify();
        self.as_mut_slice()[pos..pos + width].copy_from_slice(&buf[..width]);
    }

    /// Reads an unsigned integer of `width` bytes at `pos`.
    #[track_caller]
    pub fn read_uint(&self, pos: usize, width: usize, endian: Endian) -> u64 {
        let bytes = self.int_bytes(pos, width);
        match endian {
            Endian::Big => BigEndian::read_uint(bytes, width),
            Endian::Little => LittleEndian::read_uint(bytes, width),
            Endian::Native => NativeEndian::read_uint(bytes, width),
        }
    }

    /// Reads a sign-extended integer of `width` bytes at `pos`.
    #[track_caller]
    pub fn read_int(&self, pos: usize, width: usize, endian: Endian) -> i64 {
        let bytes = self.int_bytes(pos, width);
        match endian {
            Endian::Big => BigEndian::read_int(bytes, width),
            Endian::Little => LittleEndian::read_int(bytes, width),
            Endian::Native => NativeEndian::read_int(bytes, width),
        }
    }

    /// Appends the in-memory representation of `value`.
    pub fn append_typed<V: bytemuck::NoUninit>(&mut self, value: V) -> Result<()> {
        self.append_slice(bytemuck::bytes_of(&value))
    }

    /// Appends the in-memory representation of `values`.
    pub fn append_typed_slice<V: bytemuck::NoUninit>(&mut self, values: &[V]) -> Result<()> {
        self.append_slice(bytemuck::cast_slice(values))
    }

    #[track_caller]
    fn int_bytes(&self, pos: usize, width: usize) -> &[u8] {
        check_width(width);
        let len = self.len();
        assert!(
            pos <= len && width <= len - pos,
            "cannot read {width} bytes at offset {pos} of a {len}-byte array"
        );
        &self.as_slice()[pos..pos + width]
    }
}

macro_rules! int_accessors {
    ($($ty:ident: $width:literal, $read:ident;)*) => {
        $(
            int_accessors!(@endian $ty, $width, $read, be, Big, "big-endian");
            int_accessors!(@endian $ty, $width, $read, le, Little, "little-endian");
            int_accessors!(@endian $ty, $width, $read, ne, Native, "native-endian");
        )*
    };
    (@endian $ty:ident, $width:literal, $read:ident, $suffix:ident, $endian:ident, $name:literal) => {
        paste::paste! {
            impl<S: Storage<u8>> ArrayBase<u8, S, Bitwise> {
                #[doc = concat!("Appends a ", $name, " `", stringify!($ty), "`.")]
                pub fn [<append_ $ty _ $suffix>](&mut self, value: $ty) -> Result<()> {
                    self.append_uint(value as u64, $width, Endian::$endian)
                }

                #[doc = concat!("Inserts a ", $name, " `", stringify!($ty), "` at byte offset `pos`.")]
                #[track_caller]
                pub fn [<insert_ $ty _ $suffix>](&mut self, pos: usize, value: $ty) -> Result<()> {
                    self.insert_uint(pos, value as u64, $width, Endian::$endian)
                }

                #[doc = concat!("Overwrites the bytes at `pos` with a ", $name, " `", stringify!($ty), "`.")]
                #[track_caller]
                pub fn [<set_ $ty _ $suffix>](&mut self, pos: usize, value: $ty) {
                    self.set_uint(pos, value as u64, $width, Endian::$endian)
                }

                #[doc = concat!("Reads a ", $name, " `", stringify!($ty), "` at byte offset `pos`.")]
                #[track_caller]
                pub fn [<get_ $ty _ $suffix>](&self, pos: usize) -> $ty {
                    self.$read(pos, $width, Endian::$endian) as $ty
                }
            }
        }
    };
}

int_accessors! {
    u8: 1, read_uint;
    u16: 2, read_uint;
    u32: 4, read_uint;
    u64: 8, read_uint;
    i8: 1, read_int;
    i16: 2, read_int;
    i32: 4, read_int;
    i64: 8, read_int;
}

impl<S: Storage<u8>> io::Write for ArrayBase<u8, S, Bitwise> {
    /// Appends as many bytes as fit. A full fixed-capacity array accepts zero bytes.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let count = if S::GROWABLE {
            buf.len()
        } else {
            buf.len().min(self.capacity() - self.len())
        };
        self.splice(self.len(), 0, CloneFrom::external(&buf[..count]))?;
        Ok(count)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
