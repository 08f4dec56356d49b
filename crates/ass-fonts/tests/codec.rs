//! Property tests for the attachment codec

use ass_fonts::utils::uu::{decode, encode, wrap_lines};
use proptest::prelude::*;

proptest! {
    /// Decoding undoes encoding for any input length
    #[test]
    fn test_decode_inverts_encode(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        prop_assert_eq!(decode(&encode(&data)).unwrap(), data);
    }

    /// Encoded text stays inside the printable alphabet
    #[test]
    fn test_encoded_alphabet(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let text = encode(&data);
        prop_assert!(text.bytes().all(|b| (33..=96).contains(&b)));
        prop_assert_eq!(text.len(), data.len() / 3 * 4 + [0, 2, 3][data.len() % 3]);
    }

    /// Wrapped lines join back to the original text
    #[test]
    fn test_wrap_lines_rejoin(data in proptest::collection::vec(any::<u8>(), 0..400), width in 1usize..120) {
        let text = encode(&data);
        let lines: Vec<&str> = wrap_lines(&text, width).collect();
        prop_assert!(lines.iter().all(|line| line.len() <= width));
        prop_assert_eq!(lines.concat(), text);
    }

    /// Lengths of one past a multiple of four are rejected
    #[test]
    fn test_dangling_lengths_fail(groups in 0usize..20) {
        let text = "!".repeat(groups * 4 + 1);
        prop_assert!(decode(&text).is_err());
    }
}
