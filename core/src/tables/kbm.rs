//! Keyboard mapping (`.kbm`) decoding.
//!
//! Layout: one byte with the selection-key count, then 128 keys × 3 slots of
//! signed `(num, typ)` byte pairs. A slot with `num == 0` is unused.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::reader::ByteReader;
use crate::error::DecodeError;
use crate::phokey::ComponentType;

/// Number of ASCII key codes covered by a mapping.
pub const KBM_KEYS: usize = 128;
/// Component slots per key.
pub const KBM_SLOTS: usize = 3;
/// Exact size of a `.kbm` file.
pub const KBM_FILE_SIZE: usize = 1 + KBM_KEYS * KBM_SLOTS * 2;

/// A phonetic component produced by a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMapping {
    pub num: i8,
    pub typ: ComponentType,
}

impl KeyMapping {
    pub fn new(num: i8, typ: ComponentType) -> Self {
        Self { num, typ }
    }
}

/// ASCII key → up to three phonetic components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardMapping {
    selection_key_count: u8,
    keys: [[Option<KeyMapping>; KBM_SLOTS]; KBM_KEYS],
}

impl Default for KeyboardMapping {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardMapping {
    /// An empty mapping: no key produces a component.
    pub fn new() -> Self {
        Self {
            selection_key_count: 0,
            keys: [[None; KBM_SLOTS]; KBM_KEYS],
        }
    }

    /// Read and decode a mapping file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let mapping = Self::from_bytes(&data)?;
        info!(
            path = %path.display(),
            mapped_keys = mapping.mapped_key_count(),
            "loaded keyboard mapping"
        );
        Ok(mapping)
    }

    /// Decode a mapping from its file image. Trailing bytes are ignored.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        let mut r = ByteReader::new(data);
        let mut mapping = Self::new();
        mapping.selection_key_count = r.u8()?;

        for key in 0..KBM_KEYS {
            for slot in 0..KBM_SLOTS {
                let num = r.i8()?;
                let typ = r.i8()?;
                if num == 0 {
                    continue;
                }
                match ComponentType::from_raw(typ) {
                    Some(typ) => mapping.keys[key][slot] = Some(KeyMapping { num, typ }),
                    None => warn!(key, slot, num, typ, "ignoring slot with unknown component type"),
                }
            }
        }
        Ok(mapping)
    }

    /// Encode into the on-disk layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(KBM_FILE_SIZE);
        buf.push(self.selection_key_count);
        for slots in &self.keys {
            for slot in slots {
                match slot {
                    Some(m) => {
                        buf.push(m.num as u8);
                        buf.push(m.typ.to_raw() as u8);
                    }
                    None => buf.extend_from_slice(&[0, 0]),
                }
            }
        }
        buf
    }

    /// Informational selection-key count stored in the file header.
    pub fn selection_key_count(&self) -> u8 {
        self.selection_key_count
    }

    pub fn set_selection_key_count(&mut self, count: u8) {
        self.selection_key_count = count;
    }

    /// Components produced by `key`, in slot order. Non-ASCII keys map to
    /// nothing.
    pub fn mappings(&self, key: char) -> impl Iterator<Item = KeyMapping> + '_ {
        let slots: &[Option<KeyMapping>] = match usize::try_from(u32::from(key)) {
            Ok(code) if code < KBM_KEYS => &self.keys[code],
            _ => &[],
        };
        slots.iter().flatten().copied()
    }

    /// First component produced by `key`.
    pub fn first(&self, key: char) -> Option<KeyMapping> {
        self.mappings(key).next()
    }

    /// Append a component to `key`'s free slots.
    ///
    /// Returns false if the key is not ASCII, all slots are taken, or `num`
    /// is 0.
    pub fn push(&mut self, key: char, mapping: KeyMapping) -> bool {
        if mapping.num == 0 || !key.is_ascii() {
            return false;
        }
        let slots = &mut self.keys[key as usize];
        match slots.iter_mut().find(|s| s.is_none()) {
            Some(free) => {
                *free = Some(mapping);
                true
            }
            None => false,
        }
    }

    /// Number of keys with at least one component.
    pub fn mapped_key_count(&self) -> usize {
        self.keys.iter().filter(|s| s.iter().any(Option::is_some)).count()
    }

    /// Iterate `(key, components)` for every mapped key.
    pub fn iter(&self) -> impl Iterator<Item = (char, Vec<KeyMapping>)> + '_ {
        self.keys.iter().enumerate().filter_map(|(code, slots)| {
            let found: Vec<KeyMapping> = slots.iter().flatten().copied().collect();
            (!found.is_empty()).then(|| (char::from(code as u8), found))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_slots_and_skips_unused() {
        let mut data = vec![0u8; KBM_FILE_SIZE];
        data[0] = 10;
        // key 'j' slot 0 -> (7, Initial), slot 2 -> (5, Tone)
        let base = 1 + (b'j' as usize) * KBM_SLOTS * 2;
        data[base] = 7;
        data[base + 1] = 0;
        data[base + 4] = 5;
        data[base + 5] = 3;
        // key 'k' slot 0 has num 0 but a type: unused
        let kbase = 1 + (b'k' as usize) * KBM_SLOTS * 2;
        data[kbase + 1] = 2;

        let kbm = KeyboardMapping::from_bytes(&data).unwrap();
        assert_eq!(kbm.selection_key_count(), 10);
        let j: Vec<_> = kbm.mappings('j').collect();
        assert_eq!(
            j,
            vec![
                KeyMapping::new(7, ComponentType::Initial),
                KeyMapping::new(5, ComponentType::Tone)
            ]
        );
        assert_eq!(kbm.mappings('k').count(), 0);
        assert_eq!(kbm.mapped_key_count(), 1);

        // The dropped slot re-encodes as zeros; everything else is kept.
        let mut expected = data.clone();
        expected[kbase + 1] = 0;
        assert_eq!(kbm.to_bytes(), expected);
    }

    #[test]
    fn short_file_is_truncated() {
        let data = vec![0u8; KBM_FILE_SIZE - 1];
        match KeyboardMapping::from_bytes(&data) {
            Err(DecodeError::Truncated { offset, needed }) => {
                assert_eq!(offset, KBM_FILE_SIZE - 1);
                assert_eq!(needed, 1);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn push_fills_at_most_three_slots() {
        let mut kbm = KeyboardMapping::new();
        for num in 1..=3 {
            assert!(kbm.push('a', KeyMapping::new(num, ComponentType::Final)));
        }
        assert!(!kbm.push('a', KeyMapping::new(4, ComponentType::Final)));
        assert!(!kbm.push('ㄅ', KeyMapping::new(1, ComponentType::Initial)));
        assert_eq!(kbm.first('a'), Some(KeyMapping::new(1, ComponentType::Final)));
    }
}
