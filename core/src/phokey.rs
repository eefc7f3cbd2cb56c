//! Phonetic key codec.
//!
//! A zhuyin syllable is decomposed into four slots (initial, medial, final,
//! tone), each holding a component number or 0 when empty. The packed key
//! stores the initial in the high bits and the tone in the low bits with
//! widths 5, 2, 4 and 3. The back-quote symbol class (initial 24) uses its
//! own two-field layout `(24 << 9) | medial`.

use serde::{Deserialize, Serialize};

/// The four slots of a syllable: `[initial, medial, final, tone]`.
pub type Slots = [u8; 4];

/// Initial component number reserved for the back-quote symbol class.
pub const BACK_QUOTE_NO: u8 = 24;

/// Bit width of each slot in a packed key.
pub const SLOT_BITS: [u32; 4] = [5, 2, 4, 3];

/// Which slot a phonetic component occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentType {
    Initial,
    Medial,
    Final,
    Tone,
}

impl ComponentType {
    pub const ALL: [ComponentType; 4] = [
        ComponentType::Initial,
        ComponentType::Medial,
        ComponentType::Final,
        ComponentType::Tone,
    ];

    /// Slot index in `Slots`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Map the on-disk type byte (0..=3) to a component type.
    pub fn from_raw(raw: i8) -> Option<Self> {
        match raw {
            0 => Some(ComponentType::Initial),
            1 => Some(ComponentType::Medial),
            2 => Some(ComponentType::Final),
            3 => Some(ComponentType::Tone),
            _ => None,
        }
    }

    pub fn to_raw(self) -> i8 {
        self as i8
    }

    /// Display glyphs for this slot, indexed by component number.
    pub fn symbols(self) -> &'static [&'static str] {
        match self {
            ComponentType::Initial => &INITIALS,
            ComponentType::Medial => &MEDIALS,
            ComponentType::Final => &FINALS,
            ComponentType::Tone => &TONES,
        }
    }
}

pub static INITIALS: [&str; 25] = [
    "", "ㄅ", "ㄆ", "ㄇ", "ㄈ", "ㄉ", "ㄊ", "ㄋ", "ㄌ", "ㄍ", "ㄎ", "ㄏ", "ㄐ", "ㄑ", "ㄒ", "ㄓ",
    "ㄔ", "ㄕ", "ㄖ", "ㄗ", "ㄘ", "ㄙ", "[", "]", "`",
];

pub static MEDIALS: [&str; 4] = ["", "ㄧ", "ㄨ", "ㄩ"];

pub static FINALS: [&str; 14] = [
    "", "ㄚ", "ㄛ", "ㄜ", "ㄝ", "ㄞ", "ㄟ", "ㄠ", "ㄡ", "ㄢ", "ㄣ", "ㄤ", "ㄥ", "ㄦ",
];

/// Tone 1 has no mark.
pub static TONES: [&str; 6] = ["", "", "ˊ", "ˇ", "ˋ", "˙"];

/// Pack four slots into a phonetic key.
pub fn encode(slots: Slots) -> u32 {
    if slots[0] == BACK_QUOTE_NO {
        return (u32::from(BACK_QUOTE_NO) << 9) | u32::from(slots[1]);
    }
    let mut key = u32::from(slots[0]);
    for i in 1..4 {
        key = u32::from(slots[i]) | (key << SLOT_BITS[i]);
    }
    key
}

/// Unpack a phonetic key into its four slots.
pub fn decode(key: u32) -> Slots {
    let mut key = key;
    let tone = (key & 0b111) as u8;
    key >>= 3;
    let fin = (key & 0b1111) as u8;
    key >>= 4;
    let medial = (key & 0b11) as u8;
    key >>= 2;
    [u8::try_from(key).unwrap_or(u8::MAX), medial, fin, tone]
}

/// Concatenate the display glyphs of every non-empty, in-range slot.
pub fn to_display_string(slots: Slots) -> String {
    let mut out = String::new();
    for ty in ComponentType::ALL {
        let idx = slots[ty.index()] as usize;
        if idx == 0 {
            continue;
        }
        if let Some(sym) = ty.symbols().get(idx) {
            out.push_str(sym);
        }
    }
    out
}

/// Display string of a packed key.
pub fn phokey_to_string(key: u32) -> String {
    to_display_string(decode(key))
}

/// Parse a bopomofo string (e.g. "ㄋㄧˇ") back into slots.
///
/// Returns `None` if any character is not a known symbol. Tone 1 has no
/// glyph, so a syllable without a tone mark parses with an empty tone slot.
pub fn parse_bopomofo(text: &str) -> Option<Slots> {
    let mut slots = [0u8; 4];
    for ch in text.chars() {
        let mut buf = [0u8; 4];
        let s: &str = ch.encode_utf8(&mut buf);
        let (ty, num) = ComponentType::ALL.iter().find_map(|&ty| {
            ty.symbols()
                .iter()
                .position(|sym| !sym.is_empty() && *sym == s)
                .map(|num| (ty, num))
        })?;
        slots[ty.index()] = num as u8;
    }
    Some(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_places_initial_high_and_tone_low() {
        // ㄋㄧˇ
        let key = encode([7, 1, 0, 3]);
        assert_eq!(key, (7 << 9) | (1 << 7) | 3);
        assert_eq!(decode(key), [7, 1, 0, 3]);
    }

    #[test]
    fn back_quote_uses_two_field_layout() {
        let key = encode([BACK_QUOTE_NO, 3, 9, 4]);
        assert_eq!(key, (24 << 9) | 3);
        // final and tone are not carried
        assert_eq!(decode(key), [24, 0, 0, 3]);
    }

    #[test]
    fn oversized_key_saturates_initial() {
        // 1 << 17 leaves 256 in the initial field after the low slots.
        assert_eq!(decode(1 << 17), [u8::MAX, 0, 0, 0]);
        assert_eq!(phokey_to_string(u32::MAX), "ㄩ");
    }

    #[test]
    fn display_skips_empty_and_out_of_range_slots() {
        assert_eq!(to_display_string([7, 1, 0, 3]), "ㄋㄧˇ");
        assert_eq!(to_display_string([0, 0, 0, 1]), "");
        assert_eq!(to_display_string([30, 2, 14, 9]), "ㄨ");
        assert_eq!(to_display_string([0, 0, 0, 0]), "");
    }

    #[test]
    fn parse_bopomofo_inverts_display() {
        assert_eq!(parse_bopomofo("ㄋㄧˇ"), Some([7, 1, 0, 3]));
        assert_eq!(parse_bopomofo("ㄓㄨㄥ"), Some([15, 2, 12, 0]));
        assert_eq!(parse_bopomofo("abc"), None);
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(
            initial in 0u8..24,
            medial in 0u8..4,
            fin in 0u8..16,
            tone in 0u8..8,
        ) {
            let slots = [initial, medial, fin, tone];
            prop_assert_eq!(decode(encode(slots)), slots);
        }
    }
}
