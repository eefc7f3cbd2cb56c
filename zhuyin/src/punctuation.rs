//! Full-width punctuation for keys the phonetic layout leaves unmapped.
//!
//! Straight quotes alternate between opening and closing forms, so the
//! converter tracks whether a double or single quote is currently open.

use tracing::debug;

static FULL_WIDTH: phf::Map<char, &'static str> = phf::phf_map! {
    ',' => "，",
    '.' => "。",
    '?' => "？",
    '!' => "！",
    ':' => "：",
    ';' => "；",
    '(' => "（",
    ')' => "）",
    '[' => "「",
    ']' => "」",
    '{' => "『",
    '}' => "』",
    '<' => "《",
    '>' => "》",
    '~' => "～",
    '@' => "＠",
    '#' => "＃",
    '$' => "￥",
    '%' => "％",
    '^' => "……",
    '&' => "＆",
    '*' => "×",
    '-' => "—",
    '_' => "——",
    '+' => "＋",
    '=' => "＝",
    '/' => "、",
    '\\' => "＼",
    '|' => "｜",
};

const DOUBLE_QUOTES: (&str, &str) = ("\u{201C}", "\u{201D}");
const SINGLE_QUOTES: (&str, &str) = ("\u{2018}", "\u{2019}");

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PunctuationConverter {
    double_open: bool,
    single_open: bool,
}

impl PunctuationConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full-width form of `ch`, or `None` if it has none.
    ///
    /// Each straight quote flips its open/closed state.
    pub fn convert(&mut self, ch: char) -> Option<&'static str> {
        let text = match ch {
            '"' => Self::toggle(&mut self.double_open, DOUBLE_QUOTES),
            '\'' => Self::toggle(&mut self.single_open, SINGLE_QUOTES),
            other => FULL_WIDTH.get(&other).copied()?,
        };
        debug!(%ch, text, "converted punctuation");
        Some(text)
    }

    fn toggle(open: &mut bool, (opening, closing): (&'static str, &'static str)) -> &'static str {
        let text = if *open { closing } else { opening };
        *open = !*open;
        text
    }

    pub fn is_double_quote_open(&self) -> bool {
        self.double_open
    }

    pub fn is_single_quote_open(&self) -> bool {
        self.single_open
    }

    /// Forget any open quotes.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
