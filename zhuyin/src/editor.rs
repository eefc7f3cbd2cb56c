//! Phonetic editor: the key-by-key composition state machine.
//!
//! The editor turns key events into slot edits on a `Composition`, looks up
//! candidates once a syllable is complete (a tone was typed or space was
//! pressed), and commits either automatically (single candidate) or through
//! a selection key.

use hime_core::{
    CandidateList, CandidateRanker, ComponentType, Config, KeyMapping, KeyboardMapping,
};
use tracing::{debug, warn};

use crate::composition::{Composition, CompositionState};
use crate::punctuation::PunctuationConverter;

/// A key delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Character input (letters, digits, punctuation, space)
    Char(char),
    Backspace,
    Escape,
}

impl From<char> for KeyEvent {
    fn from(ch: char) -> Self {
        match ch {
            '\u{1b}' => KeyEvent::Escape,
            '\u{8}' => KeyEvent::Backspace,
            other => KeyEvent::Char(other),
        }
    }
}

/// Result of processing a key event in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorResult {
    /// Key was consumed; no candidate window
    Handled,

    /// Key was consumed and a lookup left several candidates to choose from
    ShowCandidates,

    /// Text should be committed and the composition was reset
    CommitAndReset(String),

    /// Key not handled, the host keeps it
    PassThrough,
}

/// Phonetic input editor (zhuyin).
pub struct PhoneticEditor {
    keymap: KeyboardMapping,
    ranker: CandidateRanker,
    composition: Composition,
    candidates: CandidateList,
    config: Config,
    /// Set when unmapped punctuation keys commit full-width forms
    punctuation: Option<PunctuationConverter>,
}

impl PhoneticEditor {
    pub fn new(keymap: KeyboardMapping, ranker: CandidateRanker, config: &Config) -> Self {
        Self {
            keymap,
            ranker,
            composition: Composition::new(),
            candidates: CandidateList::with_page_size(config.page_size()),
            config: config.clone(),
            punctuation: None,
        }
    }

    /// Turn full-width punctuation for unmapped keys on or off.
    pub fn set_smart_punctuation(&mut self, enabled: bool) {
        match (enabled, self.punctuation.is_some()) {
            (true, false) => self.punctuation = Some(PunctuationConverter::new()),
            (false, true) => self.punctuation = None,
            _ => {}
        }
    }

    pub fn smart_punctuation(&self) -> Option<&PunctuationConverter> {
        self.punctuation.as_ref()
    }

    /// Close any open quotes without touching the composition.
    pub fn reset_punctuation(&mut self) {
        if let Some(p) = &mut self.punctuation {
            p.reset();
        }
    }

    pub fn keymap(&self) -> &KeyboardMapping {
        &self.keymap
    }

    /// Swap the key mapping. Clears any composition in progress.
    pub fn set_keymap(&mut self, keymap: KeyboardMapping) {
        self.keymap = keymap;
        self.reset();
    }

    pub fn ranker(&self) -> &CandidateRanker {
        &self.ranker
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    pub fn state(&self) -> CompositionState {
        if self.composition.is_empty() {
            CompositionState::Empty
        } else if self.candidates.is_empty() {
            CompositionState::Composing
        } else {
            CompositionState::AwaitingSelection
        }
    }

    /// Process a key event.
    pub fn process_key(&mut self, key: KeyEvent) -> EditorResult {
        match key {
            KeyEvent::Char(ch) => self.handle_char(ch),
            KeyEvent::Escape => self.handle_escape(),
            KeyEvent::Backspace => self.handle_backspace(),
        }
    }

    fn handle_char(&mut self, ch: char) -> EditorResult {
        let key = ch.to_ascii_lowercase();

        if !self.candidates.is_empty() {
            if let Some(idx) = self.config.selection_key_index(key) {
                if let Some(text) = self.select(idx) {
                    return EditorResult::CommitAndReset(text);
                }
            }
        }

        let mapping = match self.keymap.first(key) {
            Some(mapping) => mapping,
            // Space is always first tone, even when a loaded map omits it.
            None if key == ' ' => KeyMapping::new(1, ComponentType::Tone),
            None => return self.punctuate(ch),
        };
        let Ok(num) = u8::try_from(mapping.num) else {
            warn!(%key, num = mapping.num, "ignoring negative component number");
            return EditorResult::PassThrough;
        };

        let edit = self.composition.place(mapping.typ, num, key);
        debug!(%key, ?edit, slots = ?self.composition.slots(), "placed component");

        if self.composition.has_tone() || key == ' ' {
            self.lookup()
        } else {
            EditorResult::Handled
        }
    }

    fn punctuate(&mut self, ch: char) -> EditorResult {
        if !self.composition.is_empty() {
            return EditorResult::PassThrough;
        }
        match self.punctuation.as_mut().and_then(|p| p.convert(ch)) {
            Some(text) => EditorResult::CommitAndReset(text.to_string()),
            None => EditorResult::PassThrough,
        }
    }

    fn lookup(&mut self) -> EditorResult {
        let phokey = self.composition.phokey();
        let ranked = self.ranker.rank(phokey);
        debug!(phokey, candidates = ranked.len(), "syllable lookup");
        self.candidates.set_candidates(ranked);

        match self.candidates.len() {
            0 => EditorResult::Handled,
            1 => {
                let text = self.candidates.candidates()[0].text.clone();
                self.reset();
                EditorResult::CommitAndReset(text)
            }
            _ => EditorResult::ShowCandidates,
        }
    }

    fn handle_escape(&mut self) -> EditorResult {
        let had_input = !self.composition.is_empty() || !self.candidates.is_empty();
        self.reset();
        if had_input {
            EditorResult::Handled
        } else {
            EditorResult::PassThrough
        }
    }

    fn handle_backspace(&mut self) -> EditorResult {
        if self.composition.delete_last() {
            self.candidates.clear();
            EditorResult::Handled
        } else {
            EditorResult::PassThrough
        }
    }

    /// Commit the candidate at `index` on the current page.
    pub fn select(&mut self, index: usize) -> Option<String> {
        let text = self.candidates.select_by_index(index)?.text.clone();
        debug!(index, %text, "candidate selected");
        self.reset();
        Some(text)
    }

    pub fn page_up(&mut self) -> bool {
        self.candidates.page_up()
    }

    pub fn page_down(&mut self) -> bool {
        self.candidates.page_down()
    }

    /// Clear the composition and candidates.
    pub fn reset(&mut self) {
        self.composition.clear();
        self.candidates.clear();
    }
}
