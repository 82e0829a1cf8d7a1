//! Reading-progress character counting.
//!
//! Progress is measured in meaningful Japanese/CJK text density, so
//! punctuation, whitespace and Latin-script filler are stripped before
//! counting code points.

use crate::document::{Document, NodeId};
use regex::Regex;
use std::sync::LazyLock;

const KEPT_CLASSES: &str = r"0-9０-９Ａ-Ｚａ-ｚ○◯々-〇〻ぁ-ゖゝ-ゞァ-ヺーｦ-ﾝ\p{Radical}\p{Unified_Ideograph}";

static NOT_COUNTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("[^{KEPT_CLASSES}]+")).expect("character filter is a valid pattern")
});

static NOT_COUNTED_KEEP_ASCII: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("[^A-Za-z{KEPT_CLASSES}]+"))
        .expect("character filter is a valid pattern")
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterConfig {
    /// Also count ASCII Latin letters. Full-width Latin letters always count.
    pub count_ascii_letters: bool,
}

#[derive(Debug, Clone)]
pub struct CharacterCounter {
    filter: &'static Regex,
}

impl Default for CharacterCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterCounter {
    pub fn new() -> Self {
        Self::with_config(CounterConfig::default())
    }

    pub fn with_config(config: CounterConfig) -> Self {
        let filter: &'static Regex = if config.count_ascii_letters {
            &NOT_COUNTED_KEEP_ASCII
        } else {
            &NOT_COUNTED
        };
        Self { filter }
    }

    /// Number of countable code points in `text`. Surrogate-pair characters
    /// such as `𠮟` count once.
    pub fn count_text(&self, text: &str) -> usize {
        self.filter.replace_all(text, "").chars().count()
    }

    /// Contribution of a single node: glyph-images always count as one.
    pub fn count(&self, doc: &Document, node: NodeId) -> usize {
        if doc.is_gaiji(node) {
            return 1;
        }
        match doc.text(node) {
            Some(text) => self.count_text(text),
            None => self.count_text(&doc.text_content(node)),
        }
    }
}
