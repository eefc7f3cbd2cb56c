//! Integration tests for hime-zhuyin IME functionality.
//!
//! Tests the complete IME workflow including:
//! - Key-by-key composition, candidate display and selection
//! - Single-candidate auto-commit, backspace and escape handling
//! - Chinese/English mode toggling
//! - Paging through long candidate lists
//! - Loading tables and keyboard maps from a data directory
//! - Full-width punctuation with paired quotes

use std::sync::Arc;

use hime_core::phokey;
use hime_core::{ComponentType, KeyMapping, KeyboardMapping, PhoCharEntry, PhoneticTable};
use hime_zhuyin::{CompositionState, Engine, KeyboardLayout, ZhuyinConfig};
use proptest::prelude::*;

const NI3: [u8; 4] = [7, 1, 0, 3];

fn ni_table() -> PhoneticTable {
    let ba1 = phokey::encode([1, 0, 1, 1]) as u16;
    let ma1 = phokey::encode([3, 0, 1, 1]) as u16;
    let many: Vec<PhoCharEntry> = (0..25)
        .map(|i| PhoCharEntry::new(&format!("{:02}", i), 100 - i))
        .collect();
    PhoneticTable::from_groups(
        vec![
            (
                phokey::encode(NI3) as u16,
                vec![PhoCharEntry::new("妳", 10), PhoCharEntry::new("你", 100)],
            ),
            (ba1, vec![PhoCharEntry::new("八", 7)]),
            (ma1, many),
        ],
        Vec::new(),
    )
}

/// j=ㄋ u=ㄧ 3=ˇ, as a host-supplied keyboard map.
fn custom_mapping() -> KeyboardMapping {
    let mut kbm = KeyboardMapping::new();
    kbm.push('j', KeyMapping::new(7, ComponentType::Initial));
    kbm.push('u', KeyMapping::new(1, ComponentType::Medial));
    kbm.push('3', KeyMapping::new(3, ComponentType::Tone));
    kbm
}

fn standard_engine() -> Engine {
    Engine::new(Some(Arc::new(ni_table())), ZhuyinConfig::default())
}

#[test]
fn test_select_from_candidate_window() {
    let mut ime = Engine::with_keyboard_mapping(
        Some(Arc::new(ni_table())),
        custom_mapping(),
        ZhuyinConfig::default(),
    );

    let out = ime.process_key('j');
    assert!(out.handled);
    assert_eq!(out.preedit_text, "ㄋ");
    ime.process_key('u');

    let out = ime.process_key('3');
    assert!(out.handled);
    assert!(out.show_candidates);
    assert_eq!(out.visible_candidates, vec!["你", "妳"]);
    assert_eq!(out.preedit_text, "ㄋㄧˇ");

    let out = ime.process_key('1');
    assert!(out.handled);
    assert_eq!(out.commit_text, "你");
    assert_eq!(out.preedit_text, "");
    assert!(!out.show_candidates);
    assert_eq!(ime.state(), CompositionState::Empty);
}

#[test]
fn test_single_candidate_auto_commits() {
    let mut ime = standard_engine();
    // 1=ㄅ 8=ㄚ space=first tone
    assert!(!ime.process_key('1').show_candidates);
    assert!(!ime.process_key('8').show_candidates);
    let out = ime.process_key(' ');
    assert_eq!(out.commit_text, "八");
    assert!(!out.show_candidates);
    assert!(ime.candidates().is_empty());
}

#[test]
fn test_backspace_on_empty_is_not_handled() {
    let mut ime = standard_engine();
    assert!(!ime.process_key('\u{8}').handled);

    ime.process_key('s');
    ime.process_key('u');
    let out = ime.process_key('\u{8}');
    assert!(out.handled);
    assert_eq!(out.preedit_text, "ㄋ");
}

#[test]
fn test_backspace_discards_candidates() {
    let mut ime = standard_engine();
    for key in "su4".chars() {
        ime.process_key(key);
    }
    assert_eq!(ime.candidates().len(), 2);
    let out = ime.process_key('\u{8}');
    assert!(out.handled);
    assert_eq!(out.preedit_text, "ㄋㄧ");
    assert!(ime.candidates().is_empty());
    assert_eq!(ime.state(), CompositionState::Composing);
}

#[test]
fn test_escape_clears_composition() {
    let mut ime = standard_engine();
    for key in "su4".chars() {
        ime.process_key(key);
    }
    let out = ime.process_key('\u{1b}');
    assert!(out.handled);
    assert_eq!(out.preedit_text, "");
    assert!(ime.candidates().is_empty());

    // Nothing left to cancel: the host keeps the key.
    assert!(!ime.process_key('\u{1b}').handled);
}

#[test]
fn test_toggle_mode_clears_and_passes_through() {
    let mut ime = standard_engine();
    ime.process_key('s');
    ime.process_key('u');

    assert!(!ime.toggle_mode());
    assert_eq!(ime.preedit(), "");
    let out = ime.process_key('s');
    assert!(!out.handled);
    assert_eq!(out.preedit_text, "");
    assert!(!ime.process_key('\u{8}').handled);

    assert!(ime.toggle_mode());
    assert!(ime.process_key('s').handled);
    assert_eq!(ime.bopomofo(), "ㄋ");
}

#[test]
fn test_paging_through_candidates() {
    let mut ime = standard_engine();
    // a=ㄇ 8=ㄚ space
    ime.process_key('a');
    ime.process_key('8');
    let out = ime.process_key(' ');
    assert!(out.show_candidates);
    assert_eq!(out.visible_candidates.len(), 10);
    assert_eq!(ime.page_count(), 3);

    assert!(ime.page_down());
    assert!(ime.page_down());
    assert!(!ime.page_down());
    assert_eq!(ime.current_page(), 2);
    assert_eq!(ime.candidates(), vec!["20", "21", "22", "23", "24"]);

    // Selection keys index into the visible page.
    let out = ime.process_key('3');
    assert_eq!(out.commit_text, "22");

    assert!(!ime.page_up());
}

#[test]
fn test_select_candidate_api() {
    let mut ime = standard_engine();
    for key in "su4".chars() {
        ime.process_key(key);
    }
    assert_eq!(ime.select_candidate(5), None);
    assert_eq!(ime.select_candidate(1).as_deref(), Some("妳"));
    assert_eq!(ime.preedit(), "");
}

#[test]
fn test_layout_switch() {
    let mut ime = standard_engine();
    ime.set_keyboard_layout(KeyboardLayout::Eten);
    // ETEN: n=ㄋ u=ㄧ 9=ˇ
    ime.process_key('n');
    ime.process_key('u');
    let out = ime.process_key('9');
    assert_eq!(out.visible_candidates, vec!["你", "妳"]);
}

#[test]
fn test_data_dir_fallback_and_keyboard_map() {
    let dir = tempfile::tempdir().unwrap();
    // First name is corrupt, second is missing, third loads.
    std::fs::write(dir.path().join("pho.tab2"), [1u8, 0, 1]).unwrap();
    std::fs::write(dir.path().join("pho-huge.tab2"), ni_table().to_bytes()).unwrap();
    std::fs::write(dir.path().join("et.kbm"), custom_mapping().to_bytes()).unwrap();

    let mut config = ZhuyinConfig::default();
    config.use_keyboard_map_file = true;
    let mut ime = Engine::from_data_dir(dir.path(), config);

    ime.process_key('j');
    ime.process_key('u');
    let out = ime.process_key('3');
    assert_eq!(out.visible_candidates, vec!["你", "妳"]);
}

#[test]
fn test_loaded_keyboard_map_without_space_still_commits() {
    let mut kbm = KeyboardMapping::new();
    kbm.push('1', KeyMapping::new(1, ComponentType::Initial));
    kbm.push('8', KeyMapping::new(1, ComponentType::Final));

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("pho.tab2"), ni_table().to_bytes()).unwrap();
    std::fs::write(dir.path().join("zo.kbm"), kbm.to_bytes()).unwrap();

    let mut config = ZhuyinConfig::default();
    config.use_keyboard_map_file = true;
    let mut ime = Engine::from_data_dir(dir.path(), config);
    assert!(ime.editor().keymap().first(' ').is_none());

    ime.process_key('1');
    ime.process_key('8');
    let out = ime.process_key(' ');
    assert!(out.handled);
    assert_eq!(out.commit_text, "八");
    assert_eq!(out.preedit_text, "");
}

#[test]
fn test_smart_punctuation_pairs_quotes() {
    let mut config = ZhuyinConfig::default();
    config.smart_punctuation = true;
    let mut ime = Engine::new(Some(Arc::new(ni_table())), config);
    assert!(ime.is_smart_punctuation());

    assert_eq!(ime.process_key('"').commit_text, "\u{201C}");
    // Committing a syllable leaves the quote open.
    for key in "18 ".chars() {
        ime.process_key(key);
    }
    assert_eq!(ime.process_key('"').commit_text, "\u{201D}");
    assert_eq!(ime.process_key('?').commit_text, "？");

    ime.process_key('\'');
    ime.reset();
    assert_eq!(ime.process_key('\'').commit_text, "\u{2018}");

    ime.process_key('"');
    ime.reset_punctuation_state();
    assert_eq!(ime.process_key('"').commit_text, "\u{201C}");

    ime.set_smart_punctuation(false);
    let out = ime.process_key('"');
    assert!(!out.handled);
    assert_eq!(out.commit_text, "");
}

#[test]
fn test_custom_selection_keys() {
    let mut config = ZhuyinConfig::default();
    config.base.set_selection_keys("asdfghjkl;");
    let mut ime = Engine::with_keyboard_mapping(
        Some(Arc::new(ni_table())),
        custom_mapping(),
        config,
    );
    for key in "ju3".chars() {
        ime.process_key(key);
    }
    assert_eq!(ime.process_key('S').commit_text, "妳");
}

proptest! {
    #[test]
    fn prop_state_stays_consistent(keys in proptest::collection::vec(
        prop::sample::select(vec!['s', 'u', '4', '1', '8', 'a', ' ', '3', '\u{8}', '\u{1b}', 'x', '?']),
        0..40,
    )) {
        let mut ime = standard_engine();
        for key in keys {
            let out = ime.process_key(key);
            let slots = ime.editor().composition().slots();
            prop_assert!(slots[0] <= 21 && slots[1] <= 3 && slots[2] <= 13 && slots[3] <= 5);
            prop_assert!(ime.candidates().len() <= 10);
            if ime.page_count() > 0 {
                prop_assert!(ime.current_page() < ime.page_count());
            } else {
                prop_assert_eq!(ime.current_page(), 0);
            }
            if out.show_candidates {
                prop_assert!(!out.visible_candidates.is_empty());
                prop_assert_eq!(ime.state(), CompositionState::AwaitingSelection);
            }
            if !out.commit_text.is_empty() {
                prop_assert_eq!(ime.state(), CompositionState::Empty);
            }
        }
    }
}
