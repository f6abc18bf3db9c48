//! Name ↔ value mapping for XDR enumerations.

use crate::error::{Error, Result};
use bimap::BiMap;
use std::fmt::Debug;
use std::hash::Hash;

/// A precomputed two-way mapping between enum names and their wire values.
///
/// Build one per enum type and reuse it; both directions are hash lookups,
/// so decoding long lists of enums does not rebuild an inverse table.
///
/// ```
/// use xdrlib::{EnumMap, Packer, Unpacker};
///
/// let colors = EnumMap::new([("RED", 2), ("YELLOW", 3), ("BLUE", 5)]).unwrap();
/// let mut p = Packer::new();
/// p.pack_enum(&"YELLOW", &colors).unwrap();
/// assert_eq!(p.get_buffer(), [0, 0, 0, 3]);
///
/// let mut u = Unpacker::new(p.get_buffer());
/// assert_eq!(*u.get_enum(&colors).unwrap(), "YELLOW");
/// ```
#[derive(Clone, Debug)]
pub struct EnumMap<N: Eq + Hash> {
    map: BiMap<N, i32>,
}

impl<N: Eq + Hash + Debug> EnumMap<N> {
    /// Fails if a name or a value appears twice.
    pub fn new(pairs: impl IntoIterator<Item = (N, i32)>) -> Result<Self> {
        let mut map = BiMap::new();
        for (name, value) in pairs {
            if let Err((name, value)) = map.insert_no_overwrite(name, value) {
                return Err(Error::conversion(format!(
                    "duplicate enum entry {name:?} = {value}"
                )));
            }
        }
        Ok(EnumMap { map })
    }

    pub fn value_of(&self, name: &N) -> Result<i32> {
        self.map
            .get_by_left(name)
            .copied()
            .ok_or_else(|| Error::conversion(format!("{name:?} is not a member of the enum")))
    }

    pub fn name_of(&self, value: i32) -> Result<&N> {
        self.map
            .get_by_right(&value)
            .ok_or_else(|| Error::conversion(format!("{value} is not a valid enum value")))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_both_ways() {
        let map = EnumMap::new([("A", -1), ("B", 0), ("C", 7)]).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.value_of(&"A").unwrap(), -1);
        assert_eq!(*map.name_of(7).unwrap(), "C");
        assert!(matches!(map.value_of(&"D"), Err(Error::Conversion(_))));
        assert!(matches!(map.name_of(1), Err(Error::Conversion(_))));
    }

    #[test]
    fn duplicates_rejected() {
        assert!(matches!(
            EnumMap::new([("A", 1), ("A", 2)]),
            Err(Error::Conversion(_))
        ));
        assert!(matches!(
            EnumMap::new([("A", 1), ("B", 1)]),
            Err(Error::Conversion(_))
        ));
    }

    #[test]
    fn empty_map() {
        let map: EnumMap<String> = EnumMap::new([]).unwrap();
        assert!(map.is_empty());
        assert!(map.name_of(0).is_err());
    }
}
