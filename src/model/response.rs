use serde::{Deserialize, Serialize};

use super::translation::{Sentence, WordAlignment};

/// One sentence as returned by a provider: no identity, no timestamps.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct SentenceResponse {
    pub source_text: String,

    #[serde(default)]
    pub natural_translation: String,

    #[serde(default)]
    pub word_alignments: Vec<WordAlignment>,
}

impl SentenceResponse {
    pub fn into_sentence(self) -> Sentence {
        Sentence::new(self.source_text, self.natural_translation, self.word_alignments)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct TranslationResponse {
    #[serde(default)]
    pub sentences: Vec<SentenceResponse>,
}
