//! Zhuyin engine configuration.

use hime_core::ConfigError;
use serde::{Deserialize, Serialize};

use crate::layouts::KeyboardLayout;

/// Zhuyin-specific configuration that extends the base `Config` from core.
///
/// This configuration includes:
/// - All generic options from `hime_core::Config` (flattened via serde)
/// - The built-in keyboard layout to type with
/// - Phonetic table and keyboard map file names, tried in order
/// - Whether unmapped punctuation keys commit full-width forms
///
/// # Example
///
/// ```rust
/// use hime_zhuyin::{KeyboardLayout, ZhuyinConfig};
///
/// let config = ZhuyinConfig::from_toml_str("keyboard_layout = \"hsu\"\n").unwrap();
/// assert_eq!(config.keyboard_layout, KeyboardLayout::Hsu);
/// assert_eq!(config.base().selection_keys, "1234567890");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ZhuyinConfig {
    /// Base configuration fields (selection keys, page size, cache)
    #[serde(flatten)]
    pub base: hime_core::Config,

    pub keyboard_layout: KeyboardLayout,

    /// Phonetic table file names, first one that loads wins
    pub phonetic_tables: Vec<String>,

    /// Keyboard map file names, only consulted with `use_keyboard_map_file`
    pub keyboard_maps: Vec<String>,

    /// Replace the built-in layout with the first loadable `.kbm` file
    pub use_keyboard_map_file: bool,

    /// Commit full-width punctuation for keys the layout does not map
    pub smart_punctuation: bool,
}

impl Default for ZhuyinConfig {
    fn default() -> Self {
        Self {
            base: hime_core::Config::default(),
            keyboard_layout: KeyboardLayout::Standard,
            phonetic_tables: vec![
                "pho.tab2".to_string(),
                "s-pho.tab2".to_string(),
                "pho-huge.tab2".to_string(),
            ],
            keyboard_maps: vec!["zo.kbm".to_string(), "et.kbm".to_string()],
            use_keyboard_map_file: false,
            smart_punctuation: false,
        }
    }
}

impl ZhuyinConfig {
    /// Get a reference to the base config
    pub fn base(&self) -> &hime_core::Config {
        &self.base
    }

    /// Get a mutable reference to the base config
    pub fn base_mut(&mut self) -> &mut hime_core::Config {
        &mut self.base
    }

    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattened_fields_share_one_table() {
        let text = "selection_keys = \"asdfghjkl;\"\nkeyboard_layout = \"eten26\"\n";
        let config = ZhuyinConfig::from_toml_str(text).unwrap();
        assert_eq!(config.base.selection_keys, "asdfghjkl;");
        assert_eq!(config.base.candidates_per_page, 10);
        assert_eq!(config.keyboard_layout, KeyboardLayout::Eten26);
        assert_eq!(config.phonetic_tables[0], "pho.tab2");
        assert!(!config.use_keyboard_map_file);
        assert!(!config.smart_punctuation);
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zhuyin.toml");
        let mut config = ZhuyinConfig::default();
        config.keyboard_layout = KeyboardLayout::Dvorak;
        config.base_mut().lookup_cache_size = 32;
        config.save_toml(&path).unwrap();
        assert_eq!(ZhuyinConfig::load_toml(&path).unwrap(), config);
    }

    #[test]
    fn unknown_layout_is_rejected() {
        assert!(ZhuyinConfig::from_toml_str("keyboard_layout = \"colemak\"\n").is_err());
    }
}
