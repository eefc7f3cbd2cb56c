//! Decoders for the three read-only table formats.
//!
//! - `PhoneticTable` - phonetic key → characters/phrases with usage counts (`.tab2`)
//! - `KeyboardMapping` - ASCII key → phonetic components (`.kbm`)
//! - `GenericTable` - packed key-stroke sequence → characters (`.gtab`)
//!
//! All integers are little-endian. Each decoder works on an in-memory file
//! image; the `open` constructors read the whole file and release the handle
//! before decoding starts.

mod gtab;
mod kbm;
mod pho;
pub(crate) mod reader;

pub use gtab::{GenericTable, GenericTableHeader, GenericTableItem, UnionRegion, QUICK_KEYS_SIZE};
pub use kbm::{KeyMapping, KeyboardMapping, KBM_FILE_SIZE, KBM_KEYS, KBM_SLOTS};
pub use pho::{PhoCharEntry, PhoIndexEntry, PhoneticTable, PHRASE_ESCAPE};

use crate::error::DecodeError;

/// Width of a glyph field in every table format.
pub const CH_SZ: usize = 4;

/// Strip trailing NUL bytes from a fixed-width text field.
pub(crate) fn trim_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
    &bytes[..end]
}

/// Strictly decode a NUL-padded glyph field as UTF-8.
pub fn decode_glyph(bytes: &[u8]) -> Result<String, DecodeError> {
    let trimmed = trim_nul(bytes);
    std::str::from_utf8(trimmed)
        .map(str::to_owned)
        .map_err(|_| DecodeError::UnsupportedEncoding(trimmed.to_vec()))
}

/// Decode a glyph field, falling back to a Latin-1 reading of the bytes when
/// they are not valid UTF-8.
pub fn decode_glyph_lossy(bytes: &[u8]) -> String {
    match decode_glyph(bytes) {
        Ok(text) => text,
        Err(err) => {
            tracing::debug!(%err, "falling back to latin-1 glyph decoding");
            trim_nul(bytes).iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Encode text into a NUL-padded fixed-width field, truncating at a char
/// boundary if it does not fit.
pub(crate) fn encode_fixed<const N: usize>(text: &str) -> [u8; N] {
    let mut out = [0u8; N];
    let mut len = 0;
    for ch in text.chars() {
        let w = ch.len_utf8();
        if len + w > N {
            break;
        }
        ch.encode_utf8(&mut out[len..len + w]);
        len += w;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_trailing_nuls_are_stripped() {
        assert_eq!(decode_glyph("你".as_bytes()).unwrap(), "你");
        assert_eq!(decode_glyph(&[b'a', 0, 0, 0]).unwrap(), "a");
        assert_eq!(decode_glyph(&[0, 0, 0, 0]).unwrap(), "");
    }

    #[test]
    fn invalid_utf8_is_reported_then_recovered() {
        let bytes = [0xe4, 0x41, 0, 0];
        assert!(matches!(
            decode_glyph(&bytes),
            Err(DecodeError::UnsupportedEncoding(b)) if b == vec![0xe4, 0x41]
        ));
        assert_eq!(decode_glyph_lossy(&bytes), "\u{e4}A");
    }

    #[test]
    fn encode_fixed_does_not_split_chars() {
        let field: [u8; 4] = encode_fixed("你好");
        assert_eq!(&field[..3], "你".as_bytes());
        assert_eq!(field[3], 0);
    }
}
