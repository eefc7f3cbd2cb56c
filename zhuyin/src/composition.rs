//! The four-slot syllable being composed.
//!
//! A composition holds one component number per slot (initial, medial,
//! final, tone) plus the raw key that produced it. Placing a component
//! always assigns its slot directly, whether or not a later slot is already
//! filled.

use hime_core::phokey::{self, ComponentType, Slots};

/// Where the editor is in composing a syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionState {
    Empty,
    /// 1-3 slots filled, or a lookup found nothing
    Composing,
    /// A lookup produced several candidates
    AwaitingSelection,
}

/// How a component landed in its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotEdit {
    /// The slot is past every filled slot
    Insert,
    /// The slot is at or before the highest filled slot
    Overwrite,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composition {
    slots: Slots,
    raw_keys: [Option<char>; 4],
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> Slots {
        self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|&s| s == 0)
    }

    /// Number of filled slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|&&s| s != 0).count()
    }

    /// Index of the highest filled slot.
    pub fn highest_filled(&self) -> Option<usize> {
        self.slots.iter().rposition(|&s| s != 0)
    }

    pub fn has_tone(&self) -> bool {
        self.slots[ComponentType::Tone.index()] != 0
    }

    /// Put component `num` into the slot for `typ`, remembering the key.
    pub fn place(&mut self, typ: ComponentType, num: u8, key: char) -> SlotEdit {
        let idx = typ.index();
        let edit = match self.highest_filled() {
            Some(high) if idx <= high => SlotEdit::Overwrite,
            _ => SlotEdit::Insert,
        };
        // Both edits assign in place; no other slot moves.
        self.slots[idx] = num;
        self.raw_keys[idx] = Some(key);
        edit
    }

    /// Clear the highest filled slot. Returns false if nothing was filled.
    pub fn delete_last(&mut self) -> bool {
        match self.highest_filled() {
            Some(idx) => {
                self.slots[idx] = 0;
                self.raw_keys[idx] = None;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Packed phonetic key of the current slots.
    pub fn phokey(&self) -> u32 {
        phokey::encode(self.slots)
    }

    /// Bopomofo display of the filled slots.
    pub fn preedit(&self) -> String {
        phokey::to_display_string(self.slots)
    }

    /// The keys typed for each filled slot, in slot order.
    pub fn raw_keys(&self) -> String {
        self.raw_keys.iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_overwrite() {
        let mut c = Composition::new();
        assert_eq!(c.place(ComponentType::Initial, 7, 's'), SlotEdit::Insert);
        assert_eq!(c.place(ComponentType::Tone, 3, '4'), SlotEdit::Insert);
        // Medial comes before the tone: overwrite path, still a plain assignment.
        assert_eq!(c.place(ComponentType::Medial, 1, 'u'), SlotEdit::Overwrite);
        assert_eq!(c.slots(), [7, 1, 0, 3]);
        assert_eq!(c.preedit(), "ㄋㄧˇ");
        assert_eq!(c.raw_keys(), "su4");

        assert_eq!(c.place(ComponentType::Initial, 11, 'c'), SlotEdit::Overwrite);
        assert_eq!(c.slots(), [11, 1, 0, 3]);
    }

    #[test]
    fn delete_last_scans_from_tone() {
        let mut c = Composition::new();
        c.place(ComponentType::Initial, 7, 's');
        c.place(ComponentType::Final, 3, 'k');
        assert!(c.delete_last());
        assert_eq!(c.slots(), [7, 0, 0, 0]);
        assert!(c.delete_last());
        assert!(c.is_empty());
        assert!(!c.delete_last());
    }

    #[test]
    fn phokey_matches_codec() {
        let mut c = Composition::new();
        c.place(ComponentType::Initial, 7, 's');
        c.place(ComponentType::Medial, 1, 'u');
        c.place(ComponentType::Tone, 3, '4');
        assert_eq!(c.phokey(), 0xE83);
        assert_eq!(c.len(), 3);
        assert!(c.has_tone());
    }
}
