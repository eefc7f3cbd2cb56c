//! Phonetic table (`.tab2`) decoding and lookup.
//!
//! File layout, little-endian:
//!
//! ```text
//! u16 index_count        (stored twice; the second read wins)
//! u16 index_count
//! u32 char_count
//! u32 phrase_area_len
//! index_count × { u16 key, u16 start }
//! char_count  × { u8[4] glyph, u32 usage_count }
//! phrase_area_len bytes of phrase text
//! ```
//!
//! A glyph starting with `PHRASE_ESCAPE` stores a 24-bit little-endian
//! offset into the phrase area instead of text.

use std::fs;
use std::ops::Range;
use std::path::Path;

use tracing::{debug, info, warn};

use super::reader::ByteReader;
use super::{decode_glyph_lossy, encode_fixed, CH_SZ};
use crate::candidate::Candidate;
use crate::error::DecodeError;

/// First glyph byte marking a phrase-area reference.
pub const PHRASE_ESCAPE: u8 = 0x1B;

const INDEX_ENTRY_SIZE: usize = 4;
const CHAR_ENTRY_SIZE: usize = CH_SZ + 4;

/// First character-array slot for one phonetic key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhoIndexEntry {
    pub key: u16,
    pub start: u32,
}

/// One character (or phrase reference) with its usage count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhoCharEntry {
    pub glyph: [u8; CH_SZ],
    pub usage_count: u32,
}

impl PhoCharEntry {
    /// A character entry holding `text` inline (at most 4 UTF-8 bytes).
    pub fn new(text: &str, usage_count: u32) -> Self {
        Self {
            glyph: encode_fixed(text),
            usage_count,
        }
    }

    /// A phrase entry pointing at `offset` in the phrase area.
    pub fn phrase(offset: u32, usage_count: u32) -> Self {
        let o = offset.to_le_bytes();
        Self {
            glyph: [PHRASE_ESCAPE, o[0], o[1], o[2]],
            usage_count,
        }
    }

    /// Phrase-area offset if this entry is a phrase escape.
    pub fn phrase_offset(&self) -> Option<usize> {
        if self.glyph[0] != PHRASE_ESCAPE {
            return None;
        }
        let g = self.glyph;
        Some(usize::from(g[1]) | usize::from(g[2]) << 8 | usize::from(g[3]) << 16)
    }
}

/// Decoded phonetic table. Immutable after load.
#[derive(Debug, Clone)]
pub struct PhoneticTable {
    /// Sorted by key, terminated by a `0xFFFF` sentinel whose start is the
    /// character count.
    index: Vec<PhoIndexEntry>,
    chars: Vec<PhoCharEntry>,
    phrase_area: Vec<u8>,
}

impl PhoneticTable {
    /// Read and decode a table file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let table = Self::from_bytes(&data)?;
        info!(
            path = %path.display(),
            keys = table.index_len(),
            chars = table.char_count(),
            phrase_bytes = table.phrase_area.len(),
            "loaded phonetic table"
        );
        Ok(table)
    }

    /// Decode a table from its file image.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        let mut r = ByteReader::new(data);

        // The count is written twice; only the second one is authoritative.
        let _ = r.u16()?;
        let index_count = usize::from(r.u16()?);
        let char_count = r.u32()?;
        let phrase_len = r.u32()? as usize;

        let mut index = Vec::with_capacity(index_count + 1);
        for _ in 0..index_count {
            let key = r.u16()?;
            let start = u32::from(r.u16()?);
            index.push(PhoIndexEntry { key, start });
        }
        index.push(PhoIndexEntry {
            key: 0xFFFF,
            start: char_count,
        });

        let char_count = char_count as usize;
        let mut chars = Vec::with_capacity(char_count.min(r.remaining() / CHAR_ENTRY_SIZE));
        for _ in 0..char_count {
            let glyph = r.array::<CH_SZ>()?;
            let usage_count = r.u32()?;
            chars.push(PhoCharEntry { glyph, usage_count });
        }

        let phrase_area = r.take(phrase_len)?.to_vec();

        Ok(Self {
            index,
            chars,
            phrase_area,
        })
    }

    /// Build a table from per-key groups of entries.
    ///
    /// Groups are ordered by key; groups sharing a key are merged in the
    /// order given.
    pub fn from_groups<I>(groups: I, phrase_area: Vec<u8>) -> Self
    where
        I: IntoIterator<Item = (u16, Vec<PhoCharEntry>)>,
    {
        let mut groups: Vec<(u16, Vec<PhoCharEntry>)> = groups.into_iter().collect();
        groups.sort_by_key(|(key, _)| *key);

        let mut index: Vec<PhoIndexEntry> = Vec::with_capacity(groups.len() + 1);
        let mut chars = Vec::new();
        for (key, entries) in groups {
            if index.last().map_or(true, |e| e.key != key) {
                index.push(PhoIndexEntry {
                    key,
                    start: chars.len() as u32,
                });
            }
            chars.extend(entries);
        }
        index.push(PhoIndexEntry {
            key: 0xFFFF,
            start: chars.len() as u32,
        });

        Self {
            index,
            chars,
            phrase_area,
        }
    }

    /// Encode the table into its on-disk layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let entries = self.index();
        let mut buf = Vec::with_capacity(
            12 + entries.len() * INDEX_ENTRY_SIZE
                + self.chars.len() * CHAR_ENTRY_SIZE
                + self.phrase_area.len(),
        );
        let count = entries.len() as u16;
        buf.extend_from_slice(&count.to_le_bytes());
        buf.extend_from_slice(&count.to_le_bytes());
        buf.extend_from_slice(&(self.chars.len() as u32).to_le_bytes());
        buf.extend_from_slice(&(self.phrase_area.len() as u32).to_le_bytes());
        for e in entries {
            buf.extend_from_slice(&e.key.to_le_bytes());
            buf.extend_from_slice(&(e.start as u16).to_le_bytes());
        }
        for c in &self.chars {
            buf.extend_from_slice(&c.glyph);
            buf.extend_from_slice(&c.usage_count.to_le_bytes());
        }
        buf.extend_from_slice(&self.phrase_area);
        buf
    }

    /// Index entries read from the file, without the sentinel.
    pub fn index(&self) -> &[PhoIndexEntry] {
        &self.index[..self.index.len() - 1]
    }

    /// The terminating sentinel entry.
    pub fn sentinel(&self) -> PhoIndexEntry {
        self.index[self.index.len() - 1]
    }

    pub fn index_len(&self) -> usize {
        self.index.len() - 1
    }

    pub fn chars(&self) -> &[PhoCharEntry] {
        &self.chars
    }

    pub fn char_count(&self) -> usize {
        self.chars.len()
    }

    pub fn phrase_area(&self) -> &[u8] {
        &self.phrase_area
    }

    /// Raw bytes of the NUL-terminated phrase at `offset`.
    pub fn phrase_bytes(&self, offset: usize) -> Result<&[u8], DecodeError> {
        if offset >= self.phrase_area.len() {
            return Err(DecodeError::InvalidOffset {
                offset,
                len: self.phrase_area.len(),
            });
        }
        let tail = &self.phrase_area[offset..];
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        Ok(&tail[..end])
    }

    /// Text of character slot `idx`, resolving phrase escapes.
    ///
    /// Out-of-range slots and unresolvable phrase offsets yield an empty
    /// string; undecodable bytes fall back to Latin-1.
    pub fn text_at(&self, idx: usize) -> String {
        let Some(entry) = self.chars.get(idx) else {
            return String::new();
        };
        match entry.phrase_offset() {
            Some(offset) => match self.phrase_bytes(offset) {
                Ok(bytes) => decode_glyph_lossy(bytes),
                Err(err) => {
                    debug!(%err, idx, "unresolvable phrase entry");
                    String::new()
                }
            },
            None => decode_glyph_lossy(&entry.glyph),
        }
    }

    /// Character-array range for `key`, if the key is present and its range
    /// is consistent with the table.
    pub fn find(&self, key: u32) -> Option<Range<usize>> {
        let key = u16::try_from(key).ok()?;
        let pos = self.index().binary_search_by_key(&key, |e| e.key).ok()?;
        let start = self.index[pos].start as usize;
        let end = self.index[pos + 1].start as usize;
        if start > end || end > self.chars.len() {
            warn!(
                key,
                start,
                end,
                chars = self.chars.len(),
                "index entry has an invalid character range"
            );
            return None;
        }
        Some(start..end)
    }

    /// All candidates for `key`, most used first.
    ///
    /// The sort is stable, so entries with equal usage keep table order.
    pub fn lookup(&self, key: u32) -> Vec<Candidate> {
        let Some(range) = self.find(key) else {
            return Vec::new();
        };
        let mut out: Vec<Candidate> = range
            .filter_map(|i| {
                let text = self.text_at(i);
                (!text.is_empty()).then(|| Candidate::new(text, self.chars[i].usage_count))
            })
            .collect();
        out.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
        out
    }
}
