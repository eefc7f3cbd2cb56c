//! Zhuyin engine facade for host text services.
//!
//! The engine owns one phonetic editor plus the Chinese/English mode flag.
//! In English mode every key is reported as not handled. Phonetic tables are
//! shared read-only through `Arc`, so several engines (one per window, say)
//! can type against one loaded table.

use std::path::Path;
use std::sync::Arc;

use hime_core::{CandidateRanker, KeyboardMapping, PhoneticTable};
use tracing::{debug, info, warn};

use crate::composition::CompositionState;
use crate::config::ZhuyinConfig;
use crate::editor::{EditorResult, KeyEvent, PhoneticEditor};
use crate::layouts::KeyboardLayout;

/// What the host should do after a key press.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    /// The engine consumed the key
    pub handled: bool,
    /// Text to insert into the document (empty if none)
    pub commit_text: String,
    /// Bopomofo of the syllable being composed
    pub preedit_text: String,
    /// Current page of candidates, filled only with `show_candidates`
    pub visible_candidates: Vec<String>,
    pub show_candidates: bool,
}

/// Public engine for hime-zhuyin
pub struct Engine {
    editor: PhoneticEditor,
    chinese_mode: bool,
    config: ZhuyinConfig,
}

impl Engine {
    /// Construct an engine typing with the configured built-in layout.
    pub fn new(table: Option<Arc<PhoneticTable>>, config: ZhuyinConfig) -> Self {
        let keymap = config.keyboard_layout.mapping();
        Self::with_keyboard_mapping(table, keymap, config)
    }

    /// Construct an engine with an explicit key mapping (e.g. from a `.kbm` file).
    pub fn with_keyboard_mapping(
        table: Option<Arc<PhoneticTable>>,
        keymap: KeyboardMapping,
        config: ZhuyinConfig,
    ) -> Self {
        let ranker = CandidateRanker::new(table, config.base.lookup_cache_size);
        let mut editor = PhoneticEditor::new(keymap, ranker, &config.base);
        editor.set_smart_punctuation(config.smart_punctuation);
        Self {
            editor,
            chinese_mode: true,
            config,
        }
    }

    /// Load tables from `data_dir` using the file names in `config`.
    ///
    /// Files that are missing or fail to decode are skipped. Without any
    /// loadable phonetic table the engine still runs but finds no candidates.
    pub fn from_data_dir<P: AsRef<Path>>(data_dir: P, config: ZhuyinConfig) -> Self {
        let dir = data_dir.as_ref();
        let table = load_phonetic_table(dir, &config.phonetic_tables).map(Arc::new);
        if table.is_none() {
            warn!(dir = %dir.display(), "no phonetic table loaded; lookups will be empty");
        }

        let keymap = if config.use_keyboard_map_file {
            load_keyboard_mapping(dir, &config.keyboard_maps)
        } else {
            None
        };
        match keymap {
            Some(keymap) => Self::with_keyboard_mapping(table, keymap, config),
            None => Self::new(table, config),
        }
    }

    /// Process a single character from the host.
    ///
    /// `'\u{1b}'` is Escape and `'\u{8}'` is Backspace.
    pub fn process_key(&mut self, key: char) -> KeyOutcome {
        self.process_event(KeyEvent::from(key))
    }

    pub fn process_event(&mut self, key: KeyEvent) -> KeyOutcome {
        if !self.chinese_mode {
            return KeyOutcome::default();
        }

        let result = self.editor.process_key(key);
        debug!(?key, ?result, "processed key");

        let (handled, commit_text, show_candidates) = match result {
            EditorResult::Handled => (true, String::new(), false),
            EditorResult::ShowCandidates => (true, String::new(), true),
            EditorResult::CommitAndReset(text) => (true, text, false),
            EditorResult::PassThrough => (false, String::new(), false),
        };
        let visible_candidates = if show_candidates {
            self.candidates()
        } else {
            Vec::new()
        };

        KeyOutcome {
            handled,
            commit_text,
            preedit_text: self.preedit(),
            visible_candidates,
            show_candidates,
        }
    }

    /// Clear any composition in progress and close open quotes.
    pub fn reset(&mut self) {
        self.editor.reset();
        self.editor.reset_punctuation();
    }

    pub fn preedit(&self) -> String {
        self.bopomofo()
    }

    /// Bopomofo spelling of the composition buffer.
    pub fn bopomofo(&self) -> String {
        self.editor.composition().preedit()
    }

    /// Candidates on the current page.
    pub fn candidates(&self) -> Vec<String> {
        self.editor
            .candidates()
            .current_page_candidates()
            .iter()
            .map(|c| c.text.clone())
            .collect()
    }

    /// Commit the candidate at `index` on the current page.
    pub fn select_candidate(&mut self, index: usize) -> Option<String> {
        self.editor.select(index)
    }

    pub fn page_up(&mut self) -> bool {
        self.editor.page_up()
    }

    pub fn page_down(&mut self) -> bool {
        self.editor.page_down()
    }

    pub fn current_page(&self) -> usize {
        self.editor.candidates().current_page()
    }

    pub fn page_count(&self) -> usize {
        self.editor.candidates().num_pages()
    }

    pub fn state(&self) -> CompositionState {
        self.editor.state()
    }

    /// Flip between Chinese and English mode. Returns true if now Chinese.
    pub fn toggle_mode(&mut self) -> bool {
        self.chinese_mode = !self.chinese_mode;
        self.reset();
        self.chinese_mode
    }

    pub fn set_chinese_mode(&mut self, chinese: bool) {
        if self.chinese_mode != chinese {
            self.reset();
        }
        self.chinese_mode = chinese;
    }

    pub fn is_chinese_mode(&self) -> bool {
        self.chinese_mode
    }

    pub fn set_smart_punctuation(&mut self, enabled: bool) {
        self.config.smart_punctuation = enabled;
        self.editor.set_smart_punctuation(enabled);
    }

    pub fn is_smart_punctuation(&self) -> bool {
        self.config.smart_punctuation
    }

    /// Close open quotes so the next straight quote opens a pair.
    pub fn reset_punctuation_state(&mut self) {
        self.editor.reset_punctuation();
    }

    /// Switch to another built-in layout.
    pub fn set_keyboard_layout(&mut self, layout: KeyboardLayout) {
        self.config.keyboard_layout = layout;
        self.editor.set_keymap(layout.mapping());
    }

    pub fn config(&self) -> &ZhuyinConfig {
        &self.config
    }

    pub fn editor(&self) -> &PhoneticEditor {
        &self.editor
    }
}

/// Decode the first phonetic table in `names` that loads from `dir`.
pub fn load_phonetic_table(dir: &Path, names: &[String]) -> Option<PhoneticTable> {
    names.iter().find_map(|name| {
        let path = dir.join(name);
        if !path.exists() {
            debug!(path = %path.display(), "phonetic table not present");
            return None;
        }
        match PhoneticTable::open(&path) {
            Ok(table) => Some(table),
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to load phonetic table");
                None
            }
        }
    })
}

/// Decode the first keyboard map in `names` that loads from `dir`.
pub fn load_keyboard_mapping(dir: &Path, names: &[String]) -> Option<KeyboardMapping> {
    let found = names.iter().find_map(|name| {
        let path = dir.join(name);
        if !path.exists() {
            return None;
        }
        match KeyboardMapping::open(&path) {
            Ok(kbm) => Some((path, kbm)),
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to load keyboard map");
                None
            }
        }
    });
    found.map(|(path, kbm)| {
        info!(path = %path.display(), "using keyboard map file");
        kbm
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hime_core::PhoCharEntry;

    #[test]
    fn engine_zhuyin_basic() {
        let table = PhoneticTable::from_groups(
            vec![(0x0E83, vec![PhoCharEntry::new("你", 100), PhoCharEntry::new("妳", 10)])],
            Vec::new(),
        );
        let mut engine = Engine::new(Some(Arc::new(table)), ZhuyinConfig::default());

        assert!(engine.process_key('s').handled);
        let out = engine.process_key('u');
        assert_eq!(out.preedit_text, "ㄋㄧ");
        assert!(!out.show_candidates);

        let out = engine.process_key('4');
        assert!(out.show_candidates);
        assert_eq!(out.visible_candidates, vec!["你", "妳"]);
        assert_eq!(engine.select_candidate(1).as_deref(), Some("妳"));
        assert_eq!(engine.preedit(), "");
    }

    #[test]
    fn english_mode_passes_everything() {
        let mut engine = Engine::new(None, ZhuyinConfig::default());
        engine.process_key('s');
        assert!(!engine.toggle_mode());
        assert_eq!(engine.preedit(), "");
        assert_eq!(engine.process_key('s'), KeyOutcome::default());
        engine.set_chinese_mode(true);
        assert!(engine.process_key('s').handled);
    }

    #[test]
    fn missing_data_dir_runs_without_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = Engine::from_data_dir(dir.path().join("absent"), ZhuyinConfig::default());
        engine.process_key('s');
        let out = engine.process_key('4');
        assert!(out.handled);
        assert!(!out.show_candidates);
        assert_eq!(out.preedit_text, "ㄋˇ");
    }
}
