/*!
 * Placeholder tokens for protected terms.
 *
 * A token is `OPEN TERM_<n> CLOSE`, where the sentinel pair is picked per text
 * so that neither sentinel occurs in that text. Every sentinel in a protected
 * text therefore belongs to a token, which makes tokens impossible to confuse
 * with document content or with each other.
 */

use std::collections::HashSet;

/// Preferred sentinel pairs: bracket-like punctuation that language models copy through
const PREFERRED_SENTINELS: &[(char, char)] = &[
    ('\u{27E6}', '\u{27E7}'), // ⟦ ⟧
    ('\u{27EA}', '\u{27EB}'), // ⟪ ⟫
    ('\u{27EC}', '\u{27ED}'), // ⟬ ⟭
    ('\u{3016}', '\u{3017}'), // 〖 〗
];

/// Private use ranges, consulted only when every preferred pair occurs in the text
const PRIVATE_USE_RANGES: &[(u32, u32)] = &[
    (0xE000, 0xF8FF),   // BMP private use area
    (0xF0000, 0xFFFFD), // supplementary private use area A
];

const TOKEN_LABEL: &str = "TERM_";

/// A sentinel pair used to build the tokens of one `protect` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentinels {
    open: char,
    close: char,
}

impl Sentinels {
    /// Pick the first sentinel pair whose characters are both absent from `text`.
    ///
    /// Returns `None` only when the text holds a character of every candidate
    /// pair, tens of thousands of distinct private use characters. Callers must
    /// then leave the text unprotected, since no token could be told apart from
    /// the content.
    pub fn choose(text: &str) -> Option<Self> {
        let preferred = PREFERRED_SENTINELS
            .iter()
            .copied()
            .find(|&(open, close)| !text.contains(open) && !text.contains(close));

        preferred
            .or_else(|| {
                let used: HashSet<char> = text.chars().filter(|&c| is_private_use(c)).collect();
                private_use_pairs().find(|(open, close)| !used.contains(open) && !used.contains(close))
            })
            .map(|(open, close)| Self { open, close })
    }

    /// The token for the `index`-th protected span
    pub fn token(&self, index: usize) -> String {
        format!("{}{}{}{}", self.open, TOKEN_LABEL, index, self.close)
    }

    /// Opening sentinel
    pub fn open(&self) -> char {
        self.open
    }

    /// Closing sentinel
    pub fn close(&self) -> char {
        self.close
    }
}

fn private_use_pairs() -> impl Iterator<Item = (char, char)> {
    PRIVATE_USE_RANGES.iter().flat_map(|&(start, end)| {
        (start..end)
            .step_by(2)
            .filter_map(|code| Some((char::from_u32(code)?, char::from_u32(code + 1)?)))
    })
}

fn is_private_use(c: char) -> bool {
    let code = c as u32;
    PRIVATE_USE_RANGES
        .iter()
        .any(|&(start, end)| (start..=end).contains(&code))
}
