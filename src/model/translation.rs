use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One source word (or cluster) and its literal target. A `target_word` holding
/// several natural-translation words joins them with `-`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WordAlignment {
    pub source_word: String,
    pub target_word: String,
    pub position: usize,
}

impl WordAlignment {
    pub fn new(source_word: impl Into<String>, target_word: impl Into<String>, position: usize) -> Self {
        Self {
            source_word: source_word.into(),
            target_word: target_word.into(),
            position,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Sentence {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,

    pub source_text: String,

    #[serde(default)]
    pub natural_translation: String,

    #[serde(default)]
    pub word_alignments: Vec<WordAlignment>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Sentence {
    pub fn new(
        source_text: impl Into<String>,
        natural_translation: impl Into<String>,
        word_alignments: Vec<WordAlignment>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            source_text: source_text.into(),
            natural_translation: natural_translation.into(),
            word_alignments,
            created_at: Utc::now(),
        }
    }

    /// Alignments ordered by `position`, leaving the stored order untouched.
    pub fn sorted_alignments(&self) -> Vec<&WordAlignment> {
        let mut out: Vec<&WordAlignment> = self.word_alignments.iter().collect();
        out.sort_by_key(|a| a.position);
        out
    }
}

/// Root aggregate persisted by a `TranslationStore`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Translation {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,

    #[serde(default)]
    pub title: String,

    pub source_language: String,

    pub target_language: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub sentences: Vec<Sentence>,
}

impl Translation {
    pub fn new(
        title: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        sentences: Vec<Sentence>,
    ) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            created_at: now,
            updated_at: now,
            sentences,
        }
    }

    pub fn sentence(&self, uuid: Uuid) -> Option<&Sentence> {
        self.sentences.iter().find(|s| s.uuid == uuid)
    }

    pub fn sentence_mut(&mut self, uuid: Uuid) -> Option<&mut Sentence> {
        self.sentences.iter_mut().find(|s| s.uuid == uuid)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
