use proptest::prelude::*;
use xdrlib::{Error, Packer, Unpacker};

fn padded(len: usize) -> usize {
    len.div_ceil(4) * 4
}

proptest! {
    #[test]
    fn int_round_trip(v in any::<i32>()) {
        let mut p = Packer::new();
        p.pack_int(v).unwrap();
        let mut u = Unpacker::new(p.get_buffer());
        prop_assert_eq!(u.get_int().unwrap(), v);
        prop_assert!(u.done().is_ok());
    }

    #[test]
    fn hyper_round_trip(v in any::<i64>(), w in any::<u64>()) {
        let mut p = Packer::new();
        p.pack_hyper(v).unwrap();
        p.pack_uhyper(w).unwrap();
        let mut u = Unpacker::new(p.get_buffer());
        prop_assert_eq!(u.get_hyper().unwrap(), v);
        prop_assert_eq!(u.get_uhyper().unwrap(), w);
    }

    #[test]
    fn wide_values_range_checked(v in any::<i64>()) {
        let mut p = Packer::new();
        let fits = i32::try_from(v).is_ok();
        match p.pack_int(v) {
            Ok(()) => prop_assert!(fits),
            Err(Error::Range { ty, value }) => {
                prop_assert!(!fits);
                prop_assert_eq!(ty, "int");
                prop_assert_eq!(value, i128::from(v));
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }

    #[test]
    fn double_bits_round_trip(bits in any::<u64>()) {
        let v = f64::from_bits(bits);
        let mut p = Packer::new();
        p.pack_double(v).unwrap();
        prop_assert_eq!(Unpacker::new(p.get_buffer()).get_double().unwrap().to_bits(), bits);
    }

    #[test]
    fn variable_opaque_length(data in proptest::collection::vec(any::<u8>(), 0..64)) {
        let mut p = Packer::new();
        p.pack_bytes(&data).unwrap();
        prop_assert_eq!(p.len(), 4 + padded(data.len()));
        prop_assert!(p.get_buffer()[4 + data.len()..].iter().all(|&b| b == 0));

        let mut u = Unpacker::new(p.get_buffer());
        prop_assert_eq!(u.get_bytes().unwrap(), &data[..]);
        prop_assert!(u.done().is_ok());
    }

    #[test]
    fn fixed_opaque_length(data in proptest::collection::vec(any::<u8>(), 0..64)) {
        let mut p = Packer::new();
        p.pack_fopaque(data.len(), &data).unwrap();
        prop_assert_eq!(p.len(), padded(data.len()));

        let mut u = Unpacker::new(p.get_buffer());
        prop_assert_eq!(u.get_fopaque(data.len()).unwrap(), &data[..]);
        prop_assert!(u.done().is_ok());
    }

    #[test]
    fn string_round_trip(s in ".{0,32}") {
        let mut p = Packer::new();
        p.pack_string(&s).unwrap();
        prop_assert_eq!(p.len() % 4, 0);
        prop_assert_eq!(Unpacker::new(p.get_buffer()).get_string().unwrap(), s);
    }

    #[test]
    fn list_and_array_preserve_order(items in proptest::collection::vec(any::<u32>(), 0..32)) {
        let mut p = Packer::new();
        p.pack_list(&items, |p, v| p.pack_uint(*v)).unwrap();
        prop_assert_eq!(p.len(), 8 * items.len() + 4);
        p.pack_array(&items, |p, v| p.pack_uint(*v)).unwrap();

        let mut u = Unpacker::new(p.get_buffer());
        prop_assert_eq!(u.get_list(Unpacker::get_uint).unwrap(), items.clone());
        prop_assert_eq!(u.get_array(Unpacker::get_uint).unwrap(), items);
        prop_assert!(u.done().is_ok());
    }

    #[test]
    fn truncated_input_never_panics(
        items in proptest::collection::vec(any::<i32>(), 1..16),
        cut in any::<prop::sample::Index>(),
    ) {
        let mut p = Packer::new();
        p.pack_array(&items, |p, v| p.pack_int(*v)).unwrap();
        let bytes = p.get_buffer();
        let cut = cut.index(bytes.len());
        let mut u = Unpacker::new(&bytes[..cut]);
        let is_underflow = matches!(
            u.get_array(Unpacker::get_int),
            Err(Error::BufferUnderflow { .. })
        );
        prop_assert!(is_underflow);
        prop_assert_eq!(u.get_position(), 0);
    }
}
