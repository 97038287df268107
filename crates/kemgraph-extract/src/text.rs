//! Document text reconstruction and language codes.

use crate::document::Token;
use crate::error::ExtractError;

pub const LEXVO_ISO639_3: &str = "http://lexvo.org/id/iso639-3/";

/// Document text rebuilt from token offsets, addressed by character offset.
#[derive(Debug, Clone, Default)]
pub struct DocumentText {
    chars: Vec<char>,
}

impl DocumentText {
    /// Place every token form at its offset, padding gaps with spaces. A token that
    /// starts before the end of the text built so far truncates it.
    pub fn reconstruct(tokens: &[Token]) -> Self {
        let mut chars: Vec<char> = Vec::new();
        for token in tokens {
            if chars.len() > token.offset {
                chars.truncate(token.offset);
            } else {
                chars.resize(token.offset, ' ');
            }
            chars.extend(token.form.chars());
        }
        Self { chars }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Characters in `[begin, end)`, clamped to the text.
    pub fn slice(&self, begin: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        let begin = begin.min(end);
        self.chars[begin..end].iter().collect()
    }

    pub fn to_text(&self) -> String {
        self.chars.iter().collect()
    }
}

const TWO_LETTER_CODES: &[(&str, &str)] = &[
    ("ar", "ara"),
    ("bg", "bul"),
    ("ca", "cat"),
    ("cs", "ces"),
    ("da", "dan"),
    ("de", "deu"),
    ("el", "ell"),
    ("en", "eng"),
    ("es", "spa"),
    ("et", "est"),
    ("eu", "eus"),
    ("fa", "fas"),
    ("fi", "fin"),
    ("fr", "fra"),
    ("ga", "gle"),
    ("gl", "glg"),
    ("he", "heb"),
    ("hi", "hin"),
    ("hr", "hrv"),
    ("hu", "hun"),
    ("id", "ind"),
    ("is", "isl"),
    ("it", "ita"),
    ("ja", "jpn"),
    ("ko", "kor"),
    ("lt", "lit"),
    ("lv", "lav"),
    ("mt", "mlt"),
    ("nl", "nld"),
    ("no", "nor"),
    ("pl", "pol"),
    ("pt", "por"),
    ("ro", "ron"),
    ("ru", "rus"),
    ("sk", "slk"),
    ("sl", "slv"),
    ("sq", "sqi"),
    ("sr", "srp"),
    ("sv", "swe"),
    ("th", "tha"),
    ("tr", "tur"),
    ("uk", "ukr"),
    ("vi", "vie"),
    ("zh", "zho"),
];

/// Lexvo IRI for an ISO 639-1 or known ISO 639-3 code.
pub fn language_iri(code: &str) -> Result<String, ExtractError> {
    let lower = code.trim().to_ascii_lowercase();
    let three = match lower.len() {
        2 => TWO_LETTER_CODES
            .iter()
            .find(|(two, _)| *two == lower)
            .map(|(_, three)| *three),
        3 => TWO_LETTER_CODES
            .iter()
            .find(|(_, three)| *three == lower)
            .map(|(_, three)| *three),
        _ => None,
    };
    three
        .map(|three| format!("{LEXVO_ISO639_3}{three}"))
        .ok_or_else(|| ExtractError::InvalidLanguage(code.to_string()))
}
