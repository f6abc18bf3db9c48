//! Serde serializer that drives a [`Packer`].
//!
//! ## Serde type mapping
//! - `bool` → XDR bool; `i8`/`i16`/`i32` → int; `u8`/`u16`/`u32`/`char` → uint
//! - `i64`/`u64` → hyper/uhyper; `f32`/`f64` → float/double
//! - `str` → string; bytes → variable-length opaque
//! - `Option<T>` → optional-data: bool discriminant + value
//! - seq / map → counted array (maps as alternating keys and values)
//! - tuple / struct → fields back to back, no prefix
//! - enum → uint variant index + arm; unit → void

use crate::error::{Error, Result};
use crate::pack::Packer;
use serde::ser::{self, Serialize};

/// Serialize `value` into a freshly allocated `Vec<u8>` of XDR bytes.
pub fn to_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut packer = Packer::new();
    pack(&mut packer, value)?;
    Ok(packer.get_buffer().to_vec())
}

/// Serialize `value` onto the end of an existing packer.
///
/// Lets serde-derived types sit next to explicit `pack_*` calls:
///
/// ```rust
/// use xdrlib::{Packer, pack};
///
/// let mut p = Packer::new();
/// p.pack_uint(1u32).unwrap();
/// pack(&mut p, &(2u32, "x")).unwrap();
/// assert_eq!(p.len(), 16);
/// ```
pub fn pack<T: Serialize + ?Sized>(packer: &mut Packer, value: &T) -> Result<()> {
    packer.atomically(|p| value.serialize(&mut Serializer::new(p)))
}

/// The XDR serializer.
pub struct Serializer<'p> {
    packer: &'p mut Packer,
    fixed_opaque: bool,
}

impl<'p> Serializer<'p> {
    pub fn new(packer: &'p mut Packer) -> Self {
        Serializer {
            packer,
            fixed_opaque: false,
        }
    }
}

impl<'a, 'p> ser::Serializer for &'a mut Serializer<'p> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.packer.pack_bool(v)
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.packer.pack_int(v)
    }
    fn serialize_i16(self, v: i16) -> Result<()> {
        self.packer.pack_int(v)
    }
    fn serialize_i32(self, v: i32) -> Result<()> {
        self.packer.pack_int(v)
    }
    fn serialize_i64(self, v: i64) -> Result<()> {
        self.packer.pack_hyper(v)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.packer.pack_uint(v)
    }
    fn serialize_u16(self, v: u16) -> Result<()> {
        self.packer.pack_uint(v)
    }
    fn serialize_u32(self, v: u32) -> Result<()> {
        self.packer.pack_uint(v)
    }
    fn serialize_u64(self, v: u64) -> Result<()> {
        self.packer.pack_uhyper(v)
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.packer.pack_float(v)
    }
    fn serialize_f64(self, v: f64) -> Result<()> {
        self.packer.pack_double(v)
    }

    /// Unicode scalar value as uint
    fn serialize_char(self, v: char) -> Result<()> {
        self.packer.pack_uint(u32::from(v))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.packer.pack_string(v)
    }

    /// Variable-length opaque, or fixed-length opaque inside
    /// [`crate::fixed_opaque`].
    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        if std::mem::take(&mut self.fixed_opaque) {
            self.packer.pack_fopaque(v.len(), v)
        } else {
            self.packer.pack_opaque(v)
        }
    }

    fn serialize_none(self) -> Result<()> {
        self.packer.pack_bool(false)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<()> {
        self.packer.pack_bool(true)?;
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Ok(())
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
    ) -> Result<()> {
        self.packer.pack_uint(variant_index)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<()> {
        self.fixed_opaque = name == crate::fixed_opaque::TOKEN;
        let result = value.serialize(&mut *self);
        self.fixed_opaque = false;
        result
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<()> {
        self.packer.pack_uint(variant_index)?;
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        let len = len.ok_or(Error::Unsupported("sequence without a known length"))?;
        self.packer.pack_uint(len as u64)?;
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Ok(self)
    }
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        self.packer.pack_uint(variant_index)?;
        Ok(self)
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        let len = len.ok_or(Error::Unsupported("map without a known length"))?;
        self.packer.pack_uint(len as u64)?;
        Ok(self)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        self.packer.pack_uint(variant_index)?;
        Ok(self)
    }
}

// ── Compound serializer impls ──────────────────────────────────────────────

macro_rules! forward_serialize_element {
    ($t:ty, $method:ident) => {
        impl<'a, 'p> $t for &'a mut Serializer<'p> {
            type Ok = ();
            type Error = Error;
            fn $method<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
                value.serialize(&mut **self)
            }
            fn end(self) -> Result<()> {
                Ok(())
            }
        }
    };
}

macro_rules! forward_serialize_field {
    ($t:ty) => {
        impl<'a, 'p> $t for &'a mut Serializer<'p> {
            type Ok = ();
            type Error = Error;
            fn serialize_field<T: Serialize + ?Sized>(
                &mut self,
                _key: &'static str,
                value: &T,
            ) -> Result<()> {
                value.serialize(&mut **self)
            }
            fn end(self) -> Result<()> {
                Ok(())
            }
        }
    };
}

forward_serialize_element!(ser::SerializeSeq, serialize_element);
forward_serialize_element!(ser::SerializeTuple, serialize_element);
forward_serialize_element!(ser::SerializeTupleStruct, serialize_field);
forward_serialize_element!(ser::SerializeTupleVariant, serialize_field);
forward_serialize_field!(ser::SerializeStruct);
forward_serialize_field!(ser::SerializeStructVariant);

impl<'a, 'p> ser::SerializeMap for &'a mut Serializer<'p> {
    type Ok = ();
    type Error = Error;
    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        key.serialize(&mut **self)
    }
    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }
    fn end(self) -> Result<()> {
        Ok(())
    }
}
