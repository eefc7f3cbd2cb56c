//! hime-core
//!
//! Table decoding, phonetic key codec, candidate ranking and configuration
//! shared by the HIME input engines.
//!
//! Public API:
//! - `PhoneticTable` / `KeyboardMapping` / `GenericTable` - Binary table decoders
//! - `phokey` - Packing of zhuyin syllables into phonetic keys and back
//! - `Candidate` / `CandidateList` - Usage-ranked candidates and paging
//! - `CandidateRanker` - Memoized lookups over a shared phonetic table
//! - `Config` - Selection keys, page size and cache settings

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{ConfigError, DecodeError};

pub mod phokey;
pub use phokey::{ComponentType, Slots};

pub mod tables;
pub use tables::{
    GenericTable, GenericTableHeader, GenericTableItem, KeyMapping, KeyboardMapping, PhoCharEntry,
    PhoneticTable,
};

pub mod candidate;
pub use candidate::{Candidate, CandidateList, CandidateRanker};

/// Generic configuration for IME core functionality.
///
/// Language-specific options (keyboard layouts, table file names) belong in
/// `ZhuyinConfig` in the zhuyin crate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Keys for selecting candidates, in page order.
    /// First char selects the 1st candidate on the page, etc.
    pub selection_keys: String,

    /// Candidates shown per page (at least 1).
    pub candidates_per_page: usize,

    // Cache Management
    /// Maximum number of phonetic keys kept in the ranker's LRU cache.
    pub lookup_cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            selection_keys: "1234567890".to_string(),
            candidates_per_page: candidate::DEFAULT_PAGE_SIZE,
            lookup_cache_size: 256,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    // ========== Selection Keys Management ==========

    /// Set the selection keys string. Empty input is ignored.
    ///
    /// # Example
    /// ```
    /// # use hime_core::Config;
    /// let mut config = Config::default();
    /// config.set_selection_keys("asdfghjkl;");
    /// assert_eq!(config.selection_key_index('d'), Some(2));
    /// ```
    pub fn set_selection_keys(&mut self, keys: &str) {
        if !keys.is_empty() {
            self.selection_keys = keys.to_string();
        }
    }

    /// Check if a character is a selection key and return its index (0-based).
    ///
    /// ASCII letters match regardless of case.
    pub fn selection_key_index(&self, ch: char) -> Option<usize> {
        let ch = ch.to_ascii_lowercase();
        self.selection_keys
            .chars()
            .position(|c| c.to_ascii_lowercase() == ch)
    }

    /// Page size clamped to at least 1.
    pub fn page_size(&self) -> usize {
        self.candidates_per_page.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.selection_keys, "1234567890");
        assert_eq!(config.page_size(), 10);
        assert_eq!(config.selection_key_index('0'), Some(9));
        assert_eq!(config.selection_key_index('a'), None);
    }

    #[test]
    fn test_selection_keys_ignore_case() {
        let mut config = Config::default();
        config.set_selection_keys("ASDFghjkl;");
        assert_eq!(config.selection_key_index('a'), Some(0));
        assert_eq!(config.selection_key_index('G'), Some(4));
        assert_eq!(config.selection_key_index(';'), Some(9));
    }

    #[test]
    fn test_config_missing_keys_take_defaults() {
        let config = Config::from_toml_str("candidates_per_page = 0\n").unwrap();
        assert_eq!(config.selection_keys, "1234567890");
        assert_eq!(config.lookup_cache_size, 256);
        assert_eq!(config.page_size(), 1);
    }

    #[test]
    fn test_empty_selection_keys_ignored() {
        let mut config = Config::default();
        config.set_selection_keys("");
        assert_eq!(config.selection_keys, "1234567890");
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let mut config = Config::default();
        config.lookup_cache_size = 16;
        let text = config.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hime.toml");
        std::fs::write(&path, "selection_keys = [").unwrap();
        assert!(matches!(Config::load_toml(&path), Err(ConfigError::Parse(_))));
        assert!(matches!(
            Config::load_toml(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
