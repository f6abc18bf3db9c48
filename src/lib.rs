//! # xdrlib
//!
//! A pure-Rust implementation of XDR (eXternal Data Representation, RFC 4506)
//! encoding and decoding.
//!
//! ## Overview
//!
//! XDR is the wire encoding used by ONC RPC protocols such as NFS. All values
//! are big-endian (network byte order), and every item occupies a multiple of
//! 4 bytes (padded with zeroes as needed).
//!
//! The crate has two engines sharing one wire format:
//!
//! - [`Packer`] appends one value per `pack_*` call to a growable buffer.
//! - [`Unpacker`] consumes one value per `get_*` call from a borrowed slice,
//!   checking every length against what remains before reading it.
//!
//! | XDR type | Packer | Unpacker | Encoding |
//! |----------|--------|----------|----------|
//! | int / uint | `pack_int` / `pack_uint` | `get_int` / `get_uint` | 4 bytes |
//! | bool | `pack_bool` | `get_bool` | uint 0 or 1 |
//! | enum | `pack_enum` | `get_enum` | int, via an [`EnumMap`] |
//! | hyper / uhyper | `pack_hyper` / `pack_uhyper` | `get_hyper` / `get_uhyper` | 8 bytes |
//! | float / double | `pack_float` / `pack_double` | `get_float` / `get_double` | IEEE 754, 4 / 8 bytes |
//! | opaque\[n\] | `pack_fopaque` / `pack_fstring` | `get_fopaque` / `get_fstring` | n bytes + padding |
//! | opaque<> / string<> | `pack_opaque` / `pack_bytes` / `pack_string` | `get_opaque` / `get_bytes` / `get_string` | uint length + bytes + padding |
//! | T\[n\] | `pack_farray` | `get_farray` | n elements |
//! | T<> | `pack_array` | `get_array` | uint count + elements |
//! | list | `pack_list` | `get_list` | (uint 1 + element)*, uint 0 |
//!
//! ## Example
//!
//! ```rust
//! use xdrlib::{Packer, Unpacker};
//!
//! let mut p = Packer::new();
//! p.pack_farray(3, &[1, 2, 3], |p, v| p.pack_int(*v)).unwrap();
//! p.pack_string("").unwrap();
//! p.pack_list(&[10u64, 20], |p, v| p.pack_uhyper(*v)).unwrap();
//!
//! let mut u = Unpacker::new(p.get_buffer());
//! assert_eq!(u.get_farray(3, Unpacker::get_int).unwrap(), [1, 2, 3]);
//! assert_eq!(u.get_string().unwrap(), "");
//! assert_eq!(u.get_list(Unpacker::get_uhyper).unwrap(), [10, 20]);
//! u.done().unwrap();
//! ```
//!
//! ## Serde
//!
//! [`to_bytes`] / [`from_bytes`] map serde data types onto the same engines:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use xdrlib::{from_bytes, to_bytes};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct FileHandle {
//!     inode: u64,
//!     generation: u32,
//!     flags: u32,
//! }
//!
//! let fh = FileHandle {
//!     inode: 0x0102030405060708,
//!     generation: 42,
//!     flags: 0,
//! };
//!
//! let bytes = to_bytes(&fh).unwrap();
//! assert_eq!(bytes.len(), 16); // 8 + 4 + 4
//!
//! let decoded: FileHandle = from_bytes(&bytes).unwrap();
//! assert_eq!(fh, decoded);
//! ```
//!
//! Neither engine is thread-safe on its own; use one instance per thread.

pub mod config;
pub mod de;
pub mod enum_map;
pub mod error;
pub mod fixed_opaque;
pub mod pack;
pub mod ser;
pub mod unpack;

pub use config::Limits;
pub use de::{Deserializer, from_bytes, from_bytes_partial, unpack};
pub use enum_map::EnumMap;
pub use error::{Error, Result};
pub use pack::Packer;
pub use ser::{Serializer, pack, to_bytes};
pub use unpack::Unpacker;

pub use serde::{Deserialize, Serialize};
