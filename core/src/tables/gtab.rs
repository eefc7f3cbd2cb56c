//! Generic shape table (`.gtab`) decoding.
//!
//! Only the parsing contract and prefix matching are provided here; the
//! shape-based input state machine lives elsewhere.

use std::fs;
use std::path::Path;

use tracing::info;

use super::reader::ByteReader;
use super::{decode_glyph_lossy, encode_fixed, trim_nul, CH_SZ};
use crate::error::DecodeError;

/// Size of the quick-lookup region between the header and the union region.
pub const QUICK_KEYS_SIZE: usize = 46 * 10 * CH_SZ + 46 * 46 * 10 * CH_SZ;

const UNION_SIZE: usize = 128;
const END_KEYS_LEN: usize = 99;
const KEY_BITS_OFFSET: usize = 99;
const SELKEY2_OFFSET: usize = 100;
const SELKEY2_LEN: usize = 10;
const DEFAULT_KEY_BITS: u8 = 5;

/// Fixed table header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericTableHeader {
    pub version: u32,
    pub flag: u32,
    /// Display name.
    pub cname: String,
    pub selection_keys: String,
    pub space_style: u32,
    pub key_count: u32,
    /// Maximum keystrokes per entry.
    pub max_press: u32,
    pub dup_sel: u32,
    /// Number of items stored after the union region.
    pub def_chars: u32,
}

impl Default for GenericTableHeader {
    fn default() -> Self {
        Self {
            version: 0,
            flag: 0,
            cname: String::new(),
            selection_keys: "1234567890".to_string(),
            space_style: 0,
            key_count: 0,
            max_press: 0,
            dup_sel: 0,
            def_chars: 0,
        }
    }
}

/// The 128-byte region whose end-key, key-bit and alternate selection-key
/// fields overlap in the file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnionRegion(pub [u8; UNION_SIZE]);

impl Default for UnionRegion {
    fn default() -> Self {
        Self([0; UNION_SIZE])
    }
}

impl UnionRegion {
    pub fn end_keys(&self) -> &[u8] {
        trim_nul(&self.0[..END_KEYS_LEN])
    }

    /// Bits per key index; a stored 0 means 5.
    pub fn key_bits(&self) -> u8 {
        match self.0[KEY_BITS_OFFSET] {
            0 => DEFAULT_KEY_BITS,
            bits => bits,
        }
    }

    pub fn set_key_bits(&mut self, bits: u8) {
        self.0[KEY_BITS_OFFSET] = bits;
    }

    pub fn alternate_selection_keys(&self) -> &[u8] {
        trim_nul(&self.0[SELKEY2_OFFSET..SELKEY2_OFFSET + SELKEY2_LEN])
    }
}

/// One packed key-stroke sequence and the character it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericTableItem {
    pub key: u64,
    pub glyph: String,
}

impl GenericTableItem {
    pub fn new(key: u64, glyph: impl Into<String>) -> Self {
        Self {
            key,
            glyph: glyph.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenericTable {
    header: GenericTableHeader,
    union: UnionRegion,
    items: Vec<GenericTableItem>,
}

impl GenericTable {
    pub fn new(header: GenericTableHeader, union: UnionRegion, items: Vec<GenericTableItem>) -> Self {
        Self {
            header,
            union,
            items,
        }
    }

    /// Read and decode a table file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let table = Self::from_bytes(&data)?;
        info!(
            path = %path.display(),
            name = %table.header.cname,
            items = table.items.len(),
            "loaded generic table"
        );
        Ok(table)
    }

    /// Decode a table from its file image.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        let mut r = ByteReader::new(data);
        let version = r.u32()?;
        let flag = r.u32()?;
        let cname = decode_glyph_lossy(r.take(32)?);
        let selection_keys = decode_glyph_lossy(r.take(12)?);
        let header = GenericTableHeader {
            version,
            flag,
            cname,
            selection_keys,
            space_style: r.u32()?,
            key_count: r.u32()?,
            max_press: r.u32()?,
            dup_sel: r.u32()?,
            def_chars: r.u32()?,
        };

        r.skip(QUICK_KEYS_SIZE)?;
        let union = UnionRegion(r.array()?);

        let wide = Self::wide_keys(union.key_bits(), header.max_press);
        let item_size = if wide { 8 + CH_SZ } else { 4 + CH_SZ };
        let count = header.def_chars as usize;
        let mut items = Vec::with_capacity(count.min(r.remaining() / item_size));
        for _ in 0..count {
            let key = if wide { r.u64()? } else { u64::from(r.u32()?) };
            let glyph = decode_glyph_lossy(&r.array::<CH_SZ>()?);
            if !glyph.is_empty() {
                items.push(GenericTableItem { key, glyph });
            }
        }

        Ok(Self {
            header,
            union,
            items,
        })
    }

    /// Encode into the on-disk layout. The quick-lookup region is written
    /// as zeros and `def_chars` is set to the item count.
    pub fn to_bytes(&self) -> Vec<u8> {
        let h = &self.header;
        let wide = self.key64();
        let mut buf = Vec::new();
        buf.extend_from_slice(&h.version.to_le_bytes());
        buf.extend_from_slice(&h.flag.to_le_bytes());
        buf.extend_from_slice(&encode_fixed::<32>(&h.cname));
        buf.extend_from_slice(&encode_fixed::<12>(&h.selection_keys));
        buf.extend_from_slice(&h.space_style.to_le_bytes());
        buf.extend_from_slice(&h.key_count.to_le_bytes());
        buf.extend_from_slice(&h.max_press.to_le_bytes());
        buf.extend_from_slice(&h.dup_sel.to_le_bytes());
        buf.extend_from_slice(&(self.items.len() as u32).to_le_bytes());
        buf.resize(buf.len() + QUICK_KEYS_SIZE, 0);
        buf.extend_from_slice(&self.union.0);
        for item in &self.items {
            if wide {
                buf.extend_from_slice(&item.key.to_le_bytes());
            } else {
                buf.extend_from_slice(&(item.key as u32).to_le_bytes());
            }
            buf.extend_from_slice(&encode_fixed::<CH_SZ>(&item.glyph));
        }
        buf
    }

    fn wide_keys(key_bits: u8, max_press: u32) -> bool {
        u64::from(key_bits) * u64::from(max_press) > 32
    }

    pub fn header(&self) -> &GenericTableHeader {
        &self.header
    }

    pub fn union_region(&self) -> &UnionRegion {
        &self.union
    }

    pub fn items(&self) -> &[GenericTableItem] {
        &self.items
    }

    pub fn key_bits(&self) -> u8 {
        self.union.key_bits()
    }

    /// Whether items carry 64-bit keys.
    pub fn key64(&self) -> bool {
        Self::wide_keys(self.key_bits(), self.header.max_press)
    }

    /// Pack key indices into a table key, first keystroke in the highest bits.
    ///
    /// Returns `None` if there are more keystrokes than `max_press`, an index
    /// does not fit the bit width, or the result does not fit 64 bits.
    pub fn pack_key(&self, indices: &[u8]) -> Option<u64> {
        let bits = u32::from(self.key_bits());
        let max_press = self.header.max_press as usize;
        if indices.len() > max_press || u64::from(bits) * max_press as u64 > 64 {
            return None;
        }
        let mut key = 0u64;
        for (i, &idx) in indices.iter().enumerate() {
            if u32::from(idx) >= (1u32 << bits.min(31)) {
                return None;
            }
            let shift = (max_press - 1 - i) as u32 * bits;
            key |= u64::from(idx) << shift;
        }
        Some(key)
    }

    /// Glyphs whose key equals `key`, in table order.
    pub fn lookup(&self, key: u64) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| item.key == key)
            .map(|item| item.glyph.as_str())
            .collect()
    }

    /// Items whose first `num_keys` keystrokes match those of `key`.
    pub fn lookup_prefix(&self, key: u64, num_keys: usize) -> Vec<&GenericTableItem> {
        let bits = u64::from(self.key_bits());
        let max_press = u64::from(self.header.max_press);
        let num_keys = (num_keys as u64).min(max_press);
        let prefix_bits = num_keys.saturating_mul(bits);
        let shift = (max_press - num_keys).saturating_mul(bits);
        let ones = if prefix_bits >= 64 {
            u64::MAX
        } else {
            (1u64 << prefix_bits) - 1
        };
        let mask = match u32::try_from(shift) {
            Ok(shift) if shift < 64 => ones << shift,
            _ => 0,
        };
        self.items
            .iter()
            .filter(|item| item.key & mask == key & mask)
            .collect()
    }
}
