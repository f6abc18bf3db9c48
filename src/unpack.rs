//! XDR decoder (RFC 4506)

use crate::config::Limits;
use crate::enum_map::EnumMap;
use crate::error::{Error, Result};
use crate::pack::padding;
use bytes::Buf;
use std::fmt::Debug;
use std::hash::Hash;

/// The XDR decoder. Reads from a borrowed byte slice, maintaining a cursor.
///
/// Each `get_*` call consumes exactly the bytes of one encoded value,
/// padding included. A failing call leaves the cursor where it was.
///
/// ```rust
/// use xdrlib::{Packer, Unpacker};
///
/// let mut p = Packer::new();
/// p.pack_string("hello").unwrap();
/// let bytes = p.into_bytes();
/// assert_eq!(bytes.len(), 12);
///
/// let mut u = Unpacker::new(&bytes);
/// assert_eq!(u.get_string().unwrap(), "hello");
/// assert_eq!(u.get_position(), 12);
/// u.done().unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct Unpacker<'a> {
    data: &'a [u8],
    pos: usize,
    limits: Limits,
}

impl<'a> Unpacker<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_limits(data, Limits::unlimited())
    }

    /// Create a decoder that rejects lengths and counts above `limits`.
    pub fn with_limits(data: &'a [u8], limits: Limits) -> Self {
        Unpacker {
            data,
            pos: 0,
            limits,
        }
    }

    /// Rebind the decoder to `data` and rewind to the start. Limits are kept.
    pub fn reset(&mut self, data: &'a [u8]) {
        tracing::trace!(len = data.len(), "unpacker reset");
        self.data = data;
        self.pos = 0;
    }

    pub fn get_position(&self) -> usize {
        self.pos
    }

    /// Move the cursor to `position`, which must lie within `0..=len`.
    pub fn set_position(&mut self, position: usize) -> Result<()> {
        if position > self.data.len() {
            return Err(Error::InvalidPosition {
                position,
                len: self.data.len(),
            });
        }
        self.pos = position;
        Ok(())
    }

    /// The complete buffer being decoded.
    pub fn get_buffer(&self) -> &'a [u8] {
        self.data
    }

    /// The unconsumed portion of the buffer.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Check that every byte has been consumed.
    ///
    /// The resulting [`Error::TrailingData`] is advisory; see [`Error::is_warning`].
    pub fn done(&self) -> Result<()> {
        let left = self.data.len() - self.pos;
        if left > 0 {
            tracing::debug!(position = self.pos, left, "unextracted data remains");
            return Err(Error::TrailingData(left));
        }
        Ok(())
    }

    // ── Internal helpers ───────────────────────────────────────────────────

    /// Consume exactly `n` bytes. Fails without moving if fewer remain.
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let remaining = self.data.len() - self.pos;
        if n > remaining {
            return Err(Error::BufferUnderflow {
                needed: n,
                remaining,
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Consume `n` data bytes and their padding, returning only the data.
    /// Padding content is not inspected.
    fn take_padded(&mut self, n: usize) -> Result<&'a [u8]> {
        let total = n.checked_add(padding(n)).ok_or(Error::BufferUnderflow {
            needed: usize::MAX,
            remaining: self.data.len() - self.pos,
        })?;
        let slice = self.take(total)?;
        Ok(&slice[..n])
    }

    /// Run `f`, rewinding the cursor if it fails.
    fn atomically<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let mark = self.pos;
        let result = f(self);
        if result.is_err() {
            self.pos = mark;
        }
        result
    }

    /// Initial capacity for `count` elements that is never larger than the
    /// input could possibly hold.
    fn capacity_hint(&self, count: usize) -> usize {
        count.min(self.data.len() - self.pos)
    }

    // ── Fixed-width values ─────────────────────────────────────────────────

    pub fn get_int(&mut self) -> Result<i32> {
        Ok(self.take(4)?.get_i32())
    }

    pub fn get_uint(&mut self) -> Result<u32> {
        Ok(self.take(4)?.get_u32())
    }

    /// Any nonzero value decodes as `true`.
    pub fn get_bool(&mut self) -> Result<bool> {
        Ok(self.get_uint()? != 0)
    }

    /// Decode an int and map it back to its name. Fails on unmapped values.
    pub fn get_enum<'m, N>(&mut self, map: &'m EnumMap<N>) -> Result<&'m N>
    where
        N: Eq + Hash + Debug,
    {
        self.atomically(|u| {
            let value = u.get_int()?;
            map.name_of(value)
        })
    }

    pub fn get_hyper(&mut self) -> Result<i64> {
        Ok(self.take(8)?.get_i64())
    }

    pub fn get_uhyper(&mut self) -> Result<u64> {
        Ok(self.take(8)?.get_u64())
    }

    pub fn get_float(&mut self) -> Result<f32> {
        Ok(self.take(4)?.get_f32())
    }

    pub fn get_double(&mut self) -> Result<f64> {
        Ok(self.take(8)?.get_f64())
    }

    // ── Opaque data and strings ────────────────────────────────────────────

    /// Fixed-length string of `n` bytes; consumes the padding too.
    pub fn get_fstring(&mut self, n: usize) -> Result<&'a [u8]> {
        self.get_fopaque(n)
    }

    /// Fixed-length opaque of `n` bytes; consumes the padding too.
    pub fn get_fopaque(&mut self, n: usize) -> Result<&'a [u8]> {
        self.limits.check_bytes(n)?;
        self.take_padded(n)
    }

    /// Variable-length opaque, borrowed from the input (zero-copy).
    ///
    /// A declared length larger than what remains fails with
    /// [`Error::BufferUnderflow`] before anything is allocated.
    pub fn get_opaque(&mut self) -> Result<&'a [u8]> {
        self.atomically(|u| {
            let n = u.get_uint()? as usize;
            u.limits.check_bytes(n)?;
            u.take_padded(n)
        })
    }

    /// Same encoding as [`Unpacker::get_opaque`].
    pub fn get_bytes(&mut self) -> Result<&'a [u8]> {
        self.get_opaque()
    }

    /// Variable-length string decoded as UTF-8.
    ///
    /// Use [`Unpacker::get_bytes`] for strings that are not UTF-8.
    pub fn get_string(&mut self) -> Result<String> {
        self.atomically(|u| {
            let bytes = u.get_opaque()?;
            std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| Error::conversion(format!("string is not UTF-8: {e}")))
        })
    }

    // ── Collections ────────────────────────────────────────────────────────

    /// Fixed-length array of exactly `n` elements.
    ///
    /// ```rust
    /// use xdrlib::Unpacker;
    ///
    /// let mut u = Unpacker::new(&[0, 0, 0, 1, 0, 0, 0, 2]);
    /// assert_eq!(u.get_farray(2, Unpacker::get_int).unwrap(), [1, 2]);
    /// ```
    pub fn get_farray<T, F>(&mut self, n: usize, mut unpack_item: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Unpacker<'a>) -> Result<T>,
    {
        self.limits.check_items(n)?;
        self.atomically(|u| {
            let mut items = Vec::with_capacity(u.capacity_hint(n));
            for _ in 0..n {
                items.push(unpack_item(u)?);
            }
            Ok(items)
        })
    }

    /// Variable-length array: uint count, then that many elements.
    pub fn get_array<T, F>(&mut self, unpack_item: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Unpacker<'a>) -> Result<T>,
    {
        self.atomically(|u| {
            let n = u.get_uint()? as usize;
            u.get_farray(n, unpack_item)
        })
    }

    /// List: elements each preceded by indicator 1, ended by indicator 0.
    ///
    /// Its length is set entirely by the input; configure
    /// [`Limits::max_items`] when decoding untrusted data.
    pub fn get_list<T, F>(&mut self, mut unpack_item: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Unpacker<'a>) -> Result<T>,
    {
        self.atomically(|u| {
            let mut items = Vec::new();
            loop {
                match u.get_uint()? {
                    0 => return Ok(items),
                    1 => {
                        u.limits.check_items(items.len() + 1)?;
                        items.push(unpack_item(u)?);
                    }
                    other => {
                        return Err(Error::conversion(format!(
                            "list indicator must be 0 or 1, got {other}"
                        )));
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underflow_leaves_cursor() {
        let mut u = Unpacker::new(&[0, 0, 0, 9, 1, 2, 3]);
        assert_eq!(u.get_uint().unwrap(), 9);
        assert_eq!(
            u.get_int(),
            Err(Error::BufferUnderflow {
                needed: 4,
                remaining: 3
            })
        );
        assert_eq!(u.get_position(), 4);
        assert!(u.get_double().is_err());
        assert_eq!(u.remaining(), [1, 2, 3]);
    }

    #[test]
    fn bool_is_lenient() {
        let mut u = Unpacker::new(&[0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 7]);
        assert!(!u.get_bool().unwrap());
        assert!(u.get_bool().unwrap());
        assert!(u.get_bool().unwrap());
    }

    #[test]
    fn fstring_requires_padding_bytes() {
        // 5 data bytes need 3 padding bytes; only 2 are present.
        let data = [b'h', b'e', b'l', b'l', b'o', 0, 0];
        let mut u = Unpacker::new(&data);
        assert_eq!(
            u.get_fstring(5),
            Err(Error::BufferUnderflow {
                needed: 8,
                remaining: 7
            })
        );
        assert_eq!(u.get_position(), 0);
    }

    #[test]
    fn padding_content_not_validated() {
        let data = [b'a', 0xAA, 0xBB, 0xCC];
        let mut u = Unpacker::new(&data);
        assert_eq!(u.get_fopaque(1).unwrap(), b"a");
        u.done().unwrap();
    }

    #[test]
    fn hostile_length_prefix() {
        let mut u = Unpacker::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0]);
        assert!(matches!(u.get_bytes(), Err(Error::BufferUnderflow { .. })));
        assert_eq!(u.get_position(), 0);
        assert!(matches!(
            u.get_array(Unpacker::get_int),
            Err(Error::BufferUnderflow { .. })
        ));
        assert_eq!(u.get_position(), 0);
    }

    #[test]
    fn invalid_list_indicator() {
        let mut u = Unpacker::new(&[0, 0, 0, 1, 0, 0, 0, 5, 0, 0, 0, 2]);
        assert!(matches!(
            u.get_list(Unpacker::get_int),
            Err(Error::Conversion(_))
        ));
        assert_eq!(u.get_position(), 0);
    }

    #[test]
    fn set_position_bounds() {
        let mut u = Unpacker::new(&[0, 0, 0, 1, 0, 0, 0, 2]);
        u.set_position(8).unwrap();
        u.done().unwrap();
        assert_eq!(
            u.set_position(9),
            Err(Error::InvalidPosition {
                position: 9,
                len: 8
            })
        );
        assert_eq!(u.get_position(), 8);
        u.set_position(4).unwrap();
        assert_eq!(u.get_int().unwrap(), 2);
    }

    #[test]
    fn done_reports_trailing_bytes() {
        let mut u = Unpacker::new(&[0, 0, 0, 1, 0xFF]);
        u.get_int().unwrap();
        let err = u.done().unwrap_err();
        assert_eq!(err, Error::TrailingData(1));
        assert!(err.is_warning());
    }

    #[test]
    fn reset_rebinds() {
        let first = [0, 0, 0, 1];
        let second = [0, 0, 0, 2];
        let mut u = Unpacker::new(&first);
        u.get_int().unwrap();
        u.reset(&second);
        assert_eq!(u.get_position(), 0);
        assert_eq!(u.get_buffer(), second);
        assert_eq!(u.get_int().unwrap(), 2);
    }

    #[test]
    fn limits_checked_before_capacity() {
        let data = [0, 0, 0, 3, b'a', b'b', b'c', 0];
        let limits = Limits::unlimited().with_max_bytes(2);
        let mut u = Unpacker::with_limits(&data, limits);
        assert_eq!(
            u.get_bytes(),
            Err(Error::LengthExceeded { found: 3, max: 2 })
        );
        assert_eq!(u.get_position(), 0);

        let list = [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 0];
        let limits = Limits::unlimited().with_max_items(1);
        let mut u = Unpacker::with_limits(&list, limits);
        assert_eq!(
            u.get_list(Unpacker::get_int),
            Err(Error::LengthExceeded { found: 2, max: 1 })
        );
        assert_eq!(u.limits(), limits);
    }
}
