//! Serde deserializer that drives an [`Unpacker`].

use crate::error::{Error, Result};
use crate::unpack::Unpacker;
use serde::de::{
    self, Deserialize, DeserializeSeed, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor,
};

/// Deserialize a value that must occupy all of `input`.
///
/// Leftover bytes fail with [`Error::TrailingData`].
pub fn from_bytes<'de, T: Deserialize<'de>>(input: &'de [u8]) -> Result<T> {
    let mut unpacker = Unpacker::new(input);
    let value = unpack(&mut unpacker)?;
    unpacker.done()?;
    Ok(value)
}

/// Deserialize a value from XDR bytes, also returning remaining unconsumed bytes.
pub fn from_bytes_partial<'de, T: Deserialize<'de>>(input: &'de [u8]) -> Result<(T, &'de [u8])> {
    let mut unpacker = Unpacker::new(input);
    let value = unpack(&mut unpacker)?;
    Ok((value, unpacker.remaining()))
}

/// Deserialize the next value from an existing unpacker, honoring its limits.
///
/// On failure the cursor is restored to where the value started.
pub fn unpack<'de, T: Deserialize<'de>>(unpacker: &mut Unpacker<'de>) -> Result<T> {
    let start = unpacker.get_position();
    let result = T::deserialize(&mut Deserializer::new(unpacker));
    if result.is_err() {
        unpacker.set_position(start)?;
    }
    result
}

/// The XDR deserializer.
pub struct Deserializer<'u, 'de> {
    unpacker: &'u mut Unpacker<'de>,
    fixed_opaque: bool,
}

impl<'u, 'de> Deserializer<'u, 'de> {
    pub fn new(unpacker: &'u mut Unpacker<'de>) -> Self {
        Deserializer {
            unpacker,
            fixed_opaque: false,
        }
    }

    /// Strict 0/1 discriminant, as used by bool and optional-data.
    fn discriminant(&mut self, what: &str) -> Result<bool> {
        match self.unpacker.get_uint()? {
            0 => Ok(false),
            1 => Ok(true),
            v => Err(Error::conversion(format!(
                "invalid {what} encoding: {v} (must be 0 or 1)"
            ))),
        }
    }

    fn count(&mut self) -> Result<usize> {
        let n = self.unpacker.get_uint()? as usize;
        self.unpacker.limits().check_items(n)?;
        Ok(n)
    }
}

impl<'de, 'a, 'u> de::Deserializer<'de> for &'a mut Deserializer<'u, 'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::Unsupported(
            "deserialize_any (XDR is not self-describing)",
        ))
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_bool(self.discriminant("boolean")?)
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i32(self.unpacker.get_int()?)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i32(self.unpacker.get_int()?)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i32(self.unpacker.get_int()?)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i64(self.unpacker.get_hyper()?)
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u32(self.unpacker.get_uint()?)
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u32(self.unpacker.get_uint()?)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u32(self.unpacker.get_uint()?)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u64(self.unpacker.get_uhyper()?)
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_f32(self.unpacker.get_float()?)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_f64(self.unpacker.get_double()?)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let v = self.unpacker.get_uint()?;
        let c = char::from_u32(v)
            .ok_or_else(|| Error::conversion(format!("{v:#x} is not a Unicode scalar value")))?;
        visitor.visit_char(c)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let bytes = self.unpacker.get_bytes()?;
        let s = std::str::from_utf8(bytes)
            .map_err(|e| Error::conversion(format!("string is not UTF-8: {e}")))?;
        visitor.visit_borrowed_str(s)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_string(self.unpacker.get_string()?)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_borrowed_bytes(self.unpacker.get_bytes()?)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_byte_buf(self.unpacker.get_bytes()?.to_vec())
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.discriminant("optional")? {
            visitor.visit_some(self)
        } else {
            visitor.visit_none()
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        self.fixed_opaque = name == crate::fixed_opaque::TOKEN;
        let result = visitor.visit_newtype_struct(&mut *self);
        self.fixed_opaque = false;
        result
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let count = self.count()?;
        visitor.visit_seq(Elements::new(self, count))
    }

    /// Fixed-length: no count prefix. Inside [`crate::fixed_opaque`] the
    /// tuple is `len` raw bytes plus padding.
    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        if std::mem::take(&mut self.fixed_opaque) {
            return visitor.visit_borrowed_bytes(self.unpacker.get_fopaque(len)?);
        }
        visitor.visit_seq(Elements::new(self, len))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_seq(Elements::new(self, len))
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let count = self.count()?;
        visitor.visit_map(Elements::new(self, count))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_seq(Elements::new(self, fields.len()))
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_enum(self)
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u32(self.unpacker.get_uint()?)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::Unsupported(
            "deserialize_ignored_any (XDR is not self-describing)",
        ))
    }
}

// ── Elements: a known number of values, used for seqs and maps ─────────────

struct Elements<'a, 'u, 'de> {
    de: &'a mut Deserializer<'u, 'de>,
    remaining: usize,
}

impl<'a, 'u, 'de> Elements<'a, 'u, 'de> {
    fn new(de: &'a mut Deserializer<'u, 'de>, count: usize) -> Self {
        Elements {
            de,
            remaining: count,
        }
    }
}

impl<'de> SeqAccess<'de> for Elements<'_, '_, 'de> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        // Never promise more than the input could hold.
        Some(self.remaining.min(self.de.unpacker.remaining().len()))
    }
}

impl<'de> MapAccess<'de> for Elements<'_, '_, 'de> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        seed.deserialize(&mut *self.de)
    }
}

// ── Enums: uint discriminant, then the arm ─────────────────────────────────

impl<'de, 'a, 'u> EnumAccess<'de> for &'a mut Deserializer<'u, 'de> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self)> {
        let index = self.unpacker.get_uint()?;
        let value = seed.deserialize(de::value::U32Deserializer::<Error>::new(index))?;
        Ok((value, self))
    }
}

impl<'de, 'a, 'u> VariantAccess<'de> for &'a mut Deserializer<'u, 'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(self)
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        visitor.visit_seq(Elements::new(self, len))
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_seq(Elements::new(self, fields.len()))
    }
}
