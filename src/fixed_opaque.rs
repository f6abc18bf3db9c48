//! Serde helper for XDR fixed-length opaque data (RFC 4506 §4.9).
//!
//! Without this module serde treats `[u8; N]` as a tuple of `N` bytes, and
//! XDR promotes each byte to a 4-byte uint. Annotating the field packs it
//! the way [`Packer::pack_fopaque`](crate::Packer::pack_fopaque) does: the
//! raw bytes plus 0–3 zero-padding bytes, no length prefix.
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use xdrlib::{from_bytes, to_bytes};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! pub struct Verifier {
//!     pub flavor: u32,
//!     #[serde(with = "xdrlib::fixed_opaque")]
//!     pub body: [u8; 6],
//! }
//!
//! let v = Verifier { flavor: 1, body: [1, 2, 3, 4, 5, 6] };
//! let bytes = to_bytes(&v).unwrap();
//! assert_eq!(bytes, [0, 0, 0, 1, 1, 2, 3, 4, 5, 6, 0, 0]);
//! assert_eq!(v, from_bytes::<Verifier>(&bytes).unwrap());
//! ```

use serde::de::{Error as _, SeqAccess};
use serde::{Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Newtype name the XDR serializer and deserializer recognize.
pub(crate) const TOKEN: &str = "$xdrlib::FixedOpaque";

pub fn serialize<const N: usize, S: Serializer>(
    value: &[u8; N],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_newtype_struct(TOKEN, &Raw(value))
}

pub fn deserialize<'de, const N: usize, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<[u8; N], D::Error> {
    deserializer.deserialize_newtype_struct(TOKEN, FixedVisitor::<N>(PhantomData))
}

struct Raw<'a>(&'a [u8]);

impl Serialize for Raw<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.0)
    }
}

struct FixedVisitor<const N: usize>(PhantomData<[u8; N]>);

impl<'de, const N: usize> serde::de::Visitor<'de> for FixedVisitor<N> {
    type Value = [u8; N];

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fixed-length opaque ({N} bytes)")
    }

    /// The XDR deserializer answers a length-`N` tuple request inside this
    /// newtype with the padded raw bytes.
    fn visit_newtype_struct<D: Deserializer<'de>>(self, de: D) -> Result<[u8; N], D::Error> {
        de.deserialize_tuple(N, self)
    }

    fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<[u8; N], E> {
        v.try_into()
            .map_err(|_| E::invalid_length(v.len(), &self))
    }

    // Other formats hand `[u8; N]` over as a sequence of bytes.
    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<[u8; N], A::Error> {
        let mut out = [0u8; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = seq
                .next_element()?
                .ok_or_else(|| A::Error::invalid_length(i, &self))?;
        }
        Ok(out)
    }
}
