//! Decode limits for untrusted input.
//!
//! XDR length prefixes and list indicators come straight off the wire, so a
//! hostile peer controls how much an [`Unpacker`](crate::Unpacker) tries to
//! read. [`Limits`] bounds those sizes before any bytes are consumed.
//!
//! ```
//! use xdrlib::{Limits, Unpacker};
//!
//! let limits = Limits::unlimited().with_max_bytes(1024).with_max_items(64);
//! let mut u = Unpacker::with_limits(&[0, 0, 0, 0], limits);
//! assert_eq!(u.get_string().unwrap(), "");
//! ```

use crate::error::{Error, Result};

/// Upper bounds applied while decoding.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Limits {
    /// Maximum byte length of a single opaque or string value.
    pub max_bytes: Option<usize>,

    /// Maximum number of elements in a single array or list.
    pub max_items: Option<usize>,
}

impl Limits {
    /// No limits: only the buffer size bounds a decode.
    pub const fn unlimited() -> Self {
        Limits {
            max_bytes: None,
            max_items: None,
        }
    }

    pub const fn with_max_bytes(mut self, max: usize) -> Self {
        self.max_bytes = Some(max);
        self
    }

    pub const fn with_max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    pub(crate) fn check_bytes(&self, found: usize) -> Result<()> {
        check(self.max_bytes, found)
    }

    pub(crate) fn check_items(&self, found: usize) -> Result<()> {
        check(self.max_items, found)
    }
}

fn check(max: Option<usize>, found: usize) -> Result<()> {
    match max {
        Some(max) if found > max => {
            tracing::debug!(found, max, "rejected length above limit");
            Err(Error::LengthExceeded { found, max })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_accepts_anything() {
        let limits = Limits::unlimited();
        assert!(limits.check_bytes(usize::MAX).is_ok());
        assert!(limits.check_items(usize::MAX).is_ok());
        assert_eq!(limits, Limits::default());
    }

    #[test]
    fn bounds_are_inclusive() {
        let limits = Limits::unlimited().with_max_bytes(8).with_max_items(2);
        assert!(limits.check_bytes(8).is_ok());
        assert_eq!(
            limits.check_bytes(9),
            Err(Error::LengthExceeded { found: 9, max: 8 })
        );
        assert!(limits.check_items(2).is_ok());
        assert_eq!(
            limits.check_items(3),
            Err(Error::LengthExceeded { found: 3, max: 2 })
        );
    }
}
