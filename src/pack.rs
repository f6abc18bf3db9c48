//! XDR encoder (RFC 4506)
//!
//! A [`Packer`] owns a growable buffer and appends one canonical encoding per
//! call. Every unit is padded, so the buffer length is always a multiple of 4
//! between calls.
//!
//! ## Wire format summary
//! - All values are big-endian (network byte order)
//! - int/uint/bool/enum: 4 bytes; hyper/uhyper: 8 bytes
//! - float: IEEE 754, 4 bytes; double: 8 bytes
//! - fixed opaque: data + 0–3 zero-padding bytes
//! - opaque/string: 4-byte length prefix + data + 0–3 zero-padding bytes
//! - fixed array: elements back to back; array: 4-byte count + elements
//! - list: (1, element)* followed by 0
//!
//! Packing never reads what is already in the buffer, and a failing call
//! leaves the buffer exactly as it was before that call.

use crate::enum_map::EnumMap;
use crate::error::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt::Debug;
use std::hash::Hash;

/// Number of zero bytes needed after `len` data bytes to reach a 4-byte boundary.
pub(crate) fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Narrow `value` to the XDR width `U`, reporting a range error on overflow.
fn narrow<T, U>(value: T, ty: &'static str) -> Result<U>
where
    T: TryInto<U> + Into<i128> + Copy,
{
    TryInto::<U>::try_into(value).map_err(|_| Error::Range {
        ty,
        value: value.into(),
    })
}

fn wire_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::Range {
        ty: "uint",
        value: len as i128,
    })
}

/// The XDR encoder.
///
/// ```rust
/// use xdrlib::Packer;
///
/// let mut p = Packer::new();
/// p.pack_uint(42u32).unwrap();
/// p.pack_string("hello").unwrap();
/// assert_eq!(p.len(), 16);
/// assert_eq!(&p.get_buffer()[..4], [0, 0, 0, 42]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Packer {
    buf: BytesMut,
}

impl Packer {
    pub fn new() -> Self {
        Packer {
            buf: BytesMut::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Packer {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Empty the buffer so the packer can be reused.
    pub fn reset(&mut self) {
        tracing::trace!(discarded = self.buf.len(), "packer reset");
        self.buf.clear();
    }

    /// The bytes packed so far. Does not consume them.
    pub fn get_buffer(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the packer and return the packed bytes.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Run `f`, truncating anything it appended if it fails.
    pub(crate) fn atomically(&mut self, f: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        let mark = self.buf.len();
        let result = f(self);
        if result.is_err() {
            self.buf.truncate(mark);
        }
        result
    }

    // ── Fixed-width values ─────────────────────────────────────────────────

    /// XDR signed integer: 4 bytes, two's complement.
    pub fn pack_int<T>(&mut self, v: T) -> Result<()>
    where
        T: TryInto<i32> + Into<i128> + Copy,
    {
        let v: i32 = narrow(v, "int")?;
        self.buf.put_i32(v);
        Ok(())
    }

    /// XDR unsigned integer: 4 bytes.
    pub fn pack_uint<T>(&mut self, v: T) -> Result<()>
    where
        T: TryInto<u32> + Into<i128> + Copy,
    {
        let v: u32 = narrow(v, "uint")?;
        self.buf.put_u32(v);
        Ok(())
    }

    /// XDR boolean: uint 1 or 0.
    pub fn pack_bool(&mut self, v: bool) -> Result<()> {
        self.buf.put_u32(u32::from(v));
        Ok(())
    }

    /// Pack `name` as its mapped value. Fails if `name` is not in `map`.
    pub fn pack_enum<N>(&mut self, name: &N, map: &EnumMap<N>) -> Result<()>
    where
        N: Eq + Hash + Debug,
    {
        let value = map.value_of(name)?;
        self.buf.put_i32(value);
        Ok(())
    }

    /// XDR hyper integer: 8 bytes, two's complement.
    pub fn pack_hyper<T>(&mut self, v: T) -> Result<()>
    where
        T: TryInto<i64> + Into<i128> + Copy,
    {
        let v: i64 = narrow(v, "hyper")?;
        self.buf.put_i64(v);
        Ok(())
    }

    /// XDR unsigned hyper integer: 8 bytes.
    pub fn pack_uhyper<T>(&mut self, v: T) -> Result<()>
    where
        T: TryInto<u64> + Into<i128> + Copy,
    {
        let v: u64 = narrow(v, "uhyper")?;
        self.buf.put_u64(v);
        Ok(())
    }

    /// IEEE 754 single precision. NaN and infinities pass through bit for bit.
    pub fn pack_float(&mut self, v: f32) -> Result<()> {
        self.buf.put_u32(v.to_bits());
        Ok(())
    }

    /// IEEE 754 double precision.
    pub fn pack_double(&mut self, v: f64) -> Result<()> {
        self.buf.put_u64(v.to_bits());
        Ok(())
    }

    // ── Opaque data and strings ────────────────────────────────────────────

    /// Fixed-length string: exactly `n` bytes plus padding, no length prefix.
    pub fn pack_fstring(&mut self, n: usize, data: impl AsRef<[u8]>) -> Result<()> {
        self.pack_fopaque(n, data)
    }

    /// Fixed-length opaque: exactly `n` bytes plus padding, no length prefix.
    pub fn pack_fopaque(&mut self, n: usize, data: impl AsRef<[u8]>) -> Result<()> {
        let data = data.as_ref();
        if data.len() != n {
            return Err(Error::conversion(format!(
                "fixed opaque of size {n} given {} bytes",
                data.len()
            )));
        }
        self.put_padded(data);
        Ok(())
    }

    /// Variable-length string: uint length, bytes, padding.
    ///
    /// XDR strings are byte strings; pass `&str` for UTF-8 text.
    pub fn pack_string(&mut self, data: impl AsRef<[u8]>) -> Result<()> {
        self.pack_opaque(data)
    }

    /// Same encoding as [`Packer::pack_string`].
    pub fn pack_bytes(&mut self, data: impl AsRef<[u8]>) -> Result<()> {
        self.pack_opaque(data)
    }

    /// Variable-length opaque: uint length, bytes, padding.
    pub fn pack_opaque(&mut self, data: impl AsRef<[u8]>) -> Result<()> {
        let data = data.as_ref();
        let len = wire_len(data.len())?;
        self.buf.put_u32(len);
        self.put_padded(data);
        Ok(())
    }

    fn put_padded(&mut self, data: &[u8]) {
        self.buf.reserve(data.len() + 3);
        self.buf.put_slice(data);
        self.buf.put_bytes(0, padding(data.len()));
    }

    // ── Collections ────────────────────────────────────────────────────────

    /// Fixed-length array: `n` elements, no count prefix.
    ///
    /// ```rust
    /// use xdrlib::Packer;
    ///
    /// let mut p = Packer::new();
    /// p.pack_farray(3, &[1, 2, 3], |p, v| p.pack_int(*v)).unwrap();
    /// assert_eq!(p.len(), 12);
    /// ```
    pub fn pack_farray<T, F>(&mut self, n: usize, items: &[T], mut pack_item: F) -> Result<()>
    where
        F: FnMut(&mut Packer, &T) -> Result<()>,
    {
        if items.len() != n {
            return Err(Error::conversion(format!(
                "fixed array of size {n} given {} items",
                items.len()
            )));
        }
        self.atomically(|p| items.iter().try_for_each(|item| pack_item(p, item)))
    }

    /// Variable-length array: uint count, then each element.
    pub fn pack_array<T, F>(&mut self, items: &[T], mut pack_item: F) -> Result<()>
    where
        F: FnMut(&mut Packer, &T) -> Result<()>,
    {
        let count = wire_len(items.len())?;
        self.atomically(|p| {
            p.buf.put_u32(count);
            items.iter().try_for_each(|item| pack_item(p, item))
        })
    }

    /// List: each element preceded by uint 1, terminated by uint 0.
    pub fn pack_list<T, F>(&mut self, items: &[T], mut pack_item: F) -> Result<()>
    where
        F: FnMut(&mut Packer, &T) -> Result<()>,
    {
        self.atomically(|p| {
            for item in items {
                p.buf.put_u32(1);
                pack_item(p, item)?;
            }
            p.buf.put_u32(0);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_to_four() {
        assert_eq!(padding(0), 0);
        assert_eq!(padding(1), 3);
        assert_eq!(padding(2), 2);
        assert_eq!(padding(3), 1);
        assert_eq!(padding(4), 0);
        assert_eq!(padding(5), 3);
    }

    #[test]
    fn int_range_checked() {
        let mut p = Packer::new();
        p.pack_int(i32::MIN).unwrap();
        p.pack_int(-1i64).unwrap();
        assert_eq!(
            p.pack_int(1i64 << 31),
            Err(Error::Range {
                ty: "int",
                value: 1 << 31
            })
        );
        assert!(matches!(p.pack_uint(-1), Err(Error::Range { ty: "uint", .. })));
        assert!(matches!(p.pack_uint(1u64 << 32), Err(Error::Range { .. })));
        assert!(matches!(p.pack_hyper(u64::MAX), Err(Error::Range { .. })));
        assert!(matches!(p.pack_uhyper(-1i64), Err(Error::Range { .. })));
        assert_eq!(p.get_buffer(), [0x80, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn small_integer_types_widen() {
        let mut p = Packer::new();
        p.pack_int(-2i8).unwrap();
        p.pack_uint(7u16).unwrap();
        p.pack_uhyper(9u8).unwrap();
        assert_eq!(
            p.get_buffer(),
            [0xFF, 0xFF, 0xFF, 0xFE, 0, 0, 0, 7, 0, 0, 0, 0, 0, 0, 0, 9]
        );
    }

    #[test]
    fn failed_element_rolls_back_collection() {
        let mut p = Packer::new();
        p.pack_uint(5u32).unwrap();
        let items = [1i64, 2, 1 << 40];
        assert!(p.pack_array(&items, |p, v| p.pack_int(*v)).is_err());
        assert!(p.pack_list(&items, |p, v| p.pack_int(*v)).is_err());
        assert!(p.pack_farray(3, &items, |p, v| p.pack_int(*v)).is_err());
        assert_eq!(p.get_buffer(), [0, 0, 0, 5]);
    }

    #[test]
    fn reset_and_into_bytes() {
        let mut p = Packer::with_capacity(16);
        p.pack_bool(true).unwrap();
        assert!(!p.is_empty());
        p.reset();
        assert!(p.is_empty());
        p.pack_bool(false).unwrap();
        assert_eq!(p.into_bytes().as_ref(), [0, 0, 0, 0]);
    }
}
