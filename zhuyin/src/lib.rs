//! # hime-zhuyin
//!
//! Zhuyin/Bopomofo phonetic input engine built on hime-core.

pub mod composition;
pub mod config;
pub mod editor;
pub mod engine;
pub mod layouts;
pub mod punctuation;

pub use composition::{Composition, CompositionState, SlotEdit};
pub use config::ZhuyinConfig;
pub use editor::{EditorResult, KeyEvent, PhoneticEditor};
pub use engine::{load_keyboard_mapping, load_phonetic_table, Engine, KeyOutcome};
pub use layouts::KeyboardLayout;
pub use punctuation::PunctuationConverter;
