//! Built-in zhuyin keyboard layouts.
//!
//! Each layout is a static table of `(key, component number, component type)`
//! entries in priority order. Converting a layout into a `KeyboardMapping`
//! appends every entry to its key's slots, so when a key carries several
//! components the first one listed wins.

use std::fmt;
use std::str::FromStr;

use hime_core::phokey::ComponentType::{self, Final as F, Initial as I, Medial as M, Tone as T};
use hime_core::{KeyMapping, KeyboardMapping};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One key assignment in a layout table.
pub type LayoutEntry = (char, i8, ComponentType);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyboardLayout {
    /// 大千 / standard
    #[default]
    Standard,
    /// 許氏
    Hsu,
    /// 倚天
    Eten,
    /// 倚天 26 keys
    Eten26,
    Ibm,
    /// Hanyu pinyin key positions
    Pinyin,
    Dvorak,
}

static LAYOUT_NAMES: phf::Map<&'static str, KeyboardLayout> = phf::phf_map! {
    "standard" => KeyboardLayout::Standard,
    "zo" => KeyboardLayout::Standard,
    "hsu" => KeyboardLayout::Hsu,
    "eten" => KeyboardLayout::Eten,
    "et" => KeyboardLayout::Eten,
    "eten26" => KeyboardLayout::Eten26,
    "et26" => KeyboardLayout::Eten26,
    "ibm" => KeyboardLayout::Ibm,
    "pinyin" => KeyboardLayout::Pinyin,
    "hanyu" => KeyboardLayout::Pinyin,
    "dvorak" => KeyboardLayout::Dvorak,
};

impl KeyboardLayout {
    pub const ALL: [KeyboardLayout; 7] = [
        KeyboardLayout::Standard,
        KeyboardLayout::Hsu,
        KeyboardLayout::Eten,
        KeyboardLayout::Eten26,
        KeyboardLayout::Ibm,
        KeyboardLayout::Pinyin,
        KeyboardLayout::Dvorak,
    ];

    /// Look up a layout by name or alias (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        LAYOUT_NAMES.get(name.trim().to_ascii_lowercase().as_str()).copied()
    }

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            KeyboardLayout::Standard => "standard",
            KeyboardLayout::Hsu => "hsu",
            KeyboardLayout::Eten => "eten",
            KeyboardLayout::Eten26 => "eten26",
            KeyboardLayout::Ibm => "ibm",
            KeyboardLayout::Pinyin => "pinyin",
            KeyboardLayout::Dvorak => "dvorak",
        }
    }

    pub fn entries(self) -> &'static [LayoutEntry] {
        match self {
            KeyboardLayout::Standard => STANDARD,
            KeyboardLayout::Hsu => HSU,
            KeyboardLayout::Eten => ETEN,
            KeyboardLayout::Eten26 => ETEN26,
            KeyboardLayout::Ibm => IBM,
            KeyboardLayout::Pinyin => PINYIN,
            KeyboardLayout::Dvorak => DVORAK,
        }
    }

    /// Build the key → component mapping for this layout.
    pub fn mapping(self) -> KeyboardMapping {
        let mut kbm = KeyboardMapping::new();
        for &(key, num, typ) in self.entries() {
            if !kbm.push(key, KeyMapping::new(num, typ)) {
                warn!(layout = self.name(), %key, num, "no free slot for layout entry");
            }
        }
        kbm
    }
}

impl fmt::Display for KeyboardLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyboardLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown keyboard layout '{}'", s))
    }
}

// ========== Layout tables ==========

static STANDARD: &[LayoutEntry] = &[
    // ㄅㄆㄇㄈㄉㄊㄋㄌㄍㄎㄏㄐㄑㄒㄓㄔㄕㄖㄗㄘㄙ
    ('1', 1, I), ('q', 2, I), ('a', 3, I), ('z', 4, I), ('2', 5, I), ('w', 6, I),
    ('s', 7, I), ('x', 8, I), ('e', 9, I), ('d', 10, I), ('c', 11, I), ('r', 12, I),
    ('f', 13, I), ('v', 14, I), ('5', 15, I), ('t', 16, I), ('g', 17, I), ('b', 18, I),
    ('y', 19, I), ('h', 20, I), ('n', 21, I),
    // ㄧㄨㄩ
    ('u', 1, M), ('j', 2, M), ('m', 3, M),
    // ㄚㄛㄜㄝㄞㄟㄠㄡㄢㄣㄤㄥㄦ
    ('8', 1, F), ('i', 2, F), ('k', 3, F), (',', 4, F), ('9', 5, F), ('o', 6, F),
    ('l', 7, F), ('.', 8, F), ('0', 9, F), ('p', 10, F), (';', 11, F), ('/', 12, F),
    ('-', 13, F),
    ('3', 2, T), ('4', 3, T), ('6', 4, T), ('7', 5, T), (' ', 1, T),
];

// ㄐㄑㄒ and ㄓㄔㄕ share keys; the palatal series is listed first.
static HSU: &[LayoutEntry] = &[
    ('b', 1, I), ('p', 2, I), ('m', 3, I), ('f', 4, I), ('d', 5, I), ('t', 6, I),
    ('n', 7, I), ('l', 8, I), ('g', 9, I), ('k', 10, I), ('h', 11, I), ('j', 12, I),
    ('v', 13, I), ('c', 14, I), ('j', 15, I), ('v', 16, I), ('c', 17, I), ('r', 18, I),
    ('z', 19, I), ('a', 20, I), ('s', 21, I),
    ('e', 1, M), ('x', 2, M), ('u', 3, M),
    ('a', 1, F), ('o', 2, F), ('r', 3, F), ('w', 4, F), ('i', 5, F), ('q', 6, F),
    ('z', 7, F), ('p', 8, F), ('m', 9, F), ('n', 10, F), ('k', 11, F), ('g', 12, F),
    ('l', 13, F),
    ('s', 2, T), ('d', 3, T), ('f', 4, T), ('j', 5, T), (' ', 1, T),
];

static ETEN: &[LayoutEntry] = &[
    ('b', 1, I), ('p', 2, I), ('m', 3, I), ('f', 4, I), ('d', 5, I), ('t', 6, I),
    ('n', 7, I), ('l', 8, I), ('v', 9, I), ('k', 10, I), ('h', 11, I), ('g', 12, I),
    ('7', 13, I), ('c', 14, I), (';', 15, I), ('\'', 16, I), ('s', 17, I), ('j', 18, I),
    ('r', 19, I), ('z', 20, I), ('y', 21, I),
    ('u', 1, M), ('i', 2, M), ('x', 3, M),
    ('a', 1, F), ('o', 2, F), ('w', 3, F), (',', 4, F), ('e', 5, F), ('q', 6, F),
    ('1', 7, F), ('.', 8, F), ('2', 9, F), ('/', 10, F), ('3', 11, F), ('4', 12, F),
    ('-', 13, F),
    ('6', 2, T), ('9', 3, T), ('0', 4, T), ('8', 5, T), (' ', 1, T),
];

static ETEN26: &[LayoutEntry] = &[
    ('b', 1, I), ('p', 2, I), ('m', 3, I), ('f', 4, I), ('d', 5, I), ('t', 6, I),
    ('n', 7, I), ('l', 8, I), ('v', 9, I), ('k', 10, I), ('h', 11, I), ('g', 12, I),
    ('c', 13, I), ('y', 14, I), ('j', 15, I), ('q', 16, I), ('w', 17, I), ('s', 18, I),
    ('r', 19, I), ('z', 20, I), ('x', 21, I),
    ('u', 1, M), ('i', 2, M), ('o', 3, M),
    ('a', 1, F), ('o', 2, F), ('e', 3, F), ('e', 4, F), ('i', 5, F), ('a', 6, F),
    ('u', 7, F), ('o', 8, F), ('n', 9, F), ('n', 10, F), ('k', 11, F), ('g', 12, F),
    ('l', 13, F),
    ('d', 2, T), ('f', 3, T), ('j', 4, T), ('s', 5, T), (' ', 1, T),
];

static IBM: &[LayoutEntry] = &[
    ('1', 1, I), ('2', 2, I), ('3', 3, I), ('4', 4, I), ('5', 5, I), ('6', 6, I),
    ('7', 7, I), ('8', 8, I), ('9', 9, I), ('0', 10, I), ('-', 11, I), ('q', 12, I),
    ('w', 13, I), ('e', 14, I), ('r', 15, I), ('t', 16, I), ('y', 17, I), ('u', 18, I),
    ('a', 19, I), ('s', 20, I), ('d', 21, I),
    ('i', 1, M), ('o', 2, M), ('p', 3, M),
    ('z', 1, F), ('x', 2, F), ('c', 3, F), ('v', 4, F), ('b', 5, F), ('n', 6, F),
    ('m', 7, F), (',', 8, F), ('.', 9, F), ('/', 10, F), ('f', 11, F), ('g', 12, F),
    ('h', 13, F),
    ('j', 2, T), ('k', 3, T), ('l', 4, T), (';', 5, T), (' ', 1, T),
];

static PINYIN: &[LayoutEntry] = &[
    ('b', 1, I), ('p', 2, I), ('m', 3, I), ('f', 4, I), ('d', 5, I), ('t', 6, I),
    ('n', 7, I), ('l', 8, I), ('g', 9, I), ('k', 10, I), ('h', 11, I), ('j', 12, I),
    ('q', 13, I), ('x', 14, I), ('v', 15, I), ('c', 16, I), ('s', 17, I), ('r', 18, I),
    ('z', 19, I), ('c', 20, I), ('s', 21, I),
    ('i', 1, M), ('u', 2, M), ('y', 3, M),
    ('a', 1, F), ('o', 2, F), ('e', 3, F), ('e', 4, F), ('i', 5, F), ('i', 6, F),
    ('o', 7, F), ('u', 8, F), ('n', 9, F), ('n', 10, F), ('g', 11, F), ('g', 12, F),
    ('r', 13, F),
    ('2', 2, T), ('3', 3, T), ('4', 4, T), ('5', 5, T), (' ', 1, T), ('1', 1, T),
];

static DVORAK: &[LayoutEntry] = &[
    ('1', 1, I), ('\'', 2, I), ('a', 3, I), (';', 4, I), ('2', 5, I), (',', 6, I),
    ('o', 7, I), ('q', 8, I), ('.', 9, I), ('e', 10, I), ('j', 11, I), ('p', 12, I),
    ('u', 13, I), ('k', 14, I), ('5', 15, I), ('y', 16, I), ('i', 17, I), ('x', 18, I),
    ('f', 19, I), ('d', 20, I), ('b', 21, I),
    ('g', 1, M), ('h', 2, M), ('m', 3, M),
    ('8', 1, F), ('c', 2, F), ('t', 3, F), ('w', 4, F), ('9', 5, F), ('r', 6, F),
    ('n', 7, F), ('v', 8, F), ('0', 9, F), ('l', 10, F), ('s', 11, F), ('z', 12, F),
    ('[', 13, F),
    ('3', 2, T), ('4', 3, T), ('6', 4, T), ('7', 5, T), (' ', 1, T),
];
