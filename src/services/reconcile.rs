use crate::error::ReconciliationError;
use crate::model::{SentenceResponse, TranslationResponse, WordAlignment};
use crate::text::{normalize_word, split_into_sentences, tokenize_clean};

use tracing::debug;

/// Splits a response that merged several source sentences back into one
/// response per sentence.
///
/// The natural translation must split into exactly `source_sentences.len()`
/// fragments. Each alignment goes to the first source sentence containing its
/// source word (case and surrounding whitespace ignored), then positions are
/// renumbered from 0 inside every sentence.
pub fn redistribute(
    merged: &SentenceResponse,
    source_sentences: &[String],
) -> Result<Vec<SentenceResponse>, ReconciliationError> {
    let fragments = split_into_sentences(&merged.natural_translation);

    if fragments.len() != source_sentences.len() {
        return Err(ReconciliationError::SentenceCountMismatch {
            expected: source_sentences.len(),
            actual: fragments.len(),
            fragments,
        });
    }

    let sentence_words: Vec<Vec<String>> = source_sentences.iter().map(|s| match_words(s)).collect();

    let mut buckets: Vec<Vec<WordAlignment>> = vec![Vec::new(); source_sentences.len()];

    for alignment in &merged.word_alignments {
        let needle = normalize_word(&alignment.source_word);

        let idx = sentence_words
            .iter()
            .position(|words| words.iter().any(|w| *w == needle))
            .ok_or_else(|| ReconciliationError::UnmatchedSourceWord {
                word: alignment.source_word.clone(),
                sentences: source_sentences.to_vec(),
            })?;

        buckets[idx].push(alignment.clone());
    }

    for bucket in buckets.iter_mut() {
        for (i, a) in bucket.iter_mut().enumerate() {
            a.position = i;
        }
    }

    debug!(
        sentences = source_sentences.len(),
        alignments = merged.word_alignments.len(),
        "redistributed merged response"
    );

    Ok(source_sentences
        .iter()
        .zip(fragments)
        .zip(buckets)
        .map(|((source, natural), alignments)| SentenceResponse {
            source_text: source.clone(),
            natural_translation: natural,
            word_alignments: alignments,
        })
        .collect())
}

/// Maps a provider response onto the sentences that were sent. A response
/// with one entry per sentence is kept; a single merged entry for several
/// sentences is redistributed; any other shape is a count mismatch.
pub fn reconcile_response(
    response: TranslationResponse,
    source_sentences: &[String],
) -> Result<Vec<SentenceResponse>, ReconciliationError> {
    let got = response.sentences.len();

    if got == source_sentences.len() {
        return Ok(response.sentences);
    }

    if got == 1 && source_sentences.len() > 1 {
        debug!(expected = source_sentences.len(), "provider merged sentences, redistributing");
        return redistribute(&response.sentences[0], source_sentences);
    }

    Err(ReconciliationError::SentenceCountMismatch {
        expected: source_sentences.len(),
        actual: got,
        fragments: response
            .sentences
            .into_iter()
            .map(|s| s.natural_translation)
            .collect(),
    })
}

// Raw tokens plus their punctuation-free forms, all normalized.
fn match_words(sentence: &str) -> Vec<String> {
    let mut words: Vec<String> = sentence.split_whitespace().map(normalize_word).collect();
    words.extend(tokenize_clean(sentence).iter().map(|w| normalize_word(w)));
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merged() -> SentenceResponse {
        SentenceResponse {
            source_text: "Hello world. How are you".into(),
            natural_translation: "Hello world. How are you".into(),
            word_alignments: vec![
                WordAlignment::new("Hello", "Hallo", 0),
                WordAlignment::new("world", "Welt", 1),
                WordAlignment::new("How", "Wie", 2),
                WordAlignment::new("are", "geht-es", 3),
                WordAlignment::new("you", "dir", 4),
            ],
        }
    }

    fn sources() -> Vec<String> {
        vec!["Hello world".into(), "How are you".into()]
    }

    #[test]
    fn splits_back_into_sentences() {
        let out = redistribute(&merged(), &sources()).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].source_text, "Hello world");
        assert_eq!(out[0].natural_translation, "Hello world.");
        assert_eq!(
            out[0].word_alignments.iter().map(|a| a.position).collect::<Vec<_>>(),
            vec![0, 1]
        );

        assert_eq!(out[1].natural_translation, "How are you");
        assert_eq!(out[1].word_alignments.len(), 3);
        assert_eq!(
            out[1].word_alignments.iter().map(|a| a.position).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(out[1].word_alignments[1].target_word, "geht-es");
    }

    #[test]
    fn count_mismatch_is_an_error() {
        let mut m = merged();
        m.natural_translation = "Hallo Welt wie geht es dir".into();

        let err = redistribute(&m, &sources()).unwrap_err();
        assert!(matches!(
            err,
            ReconciliationError::SentenceCountMismatch { expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn unmatched_source_word_is_an_error() {
        let mut m = merged();
        m.word_alignments.push(WordAlignment::new("today", "heute", 5));

        let err = redistribute(&m, &sources()).unwrap_err();
        assert_eq!(
            err,
            ReconciliationError::UnmatchedSourceWord {
                word: "today".into(),
                sentences: sources(),
            }
        );
    }

    #[test]
    fn matching_ignores_case_and_padding() {
        let mut m = merged();
        m.word_alignments[2].source_word = "  HOW ".into();

        let out = redistribute(&m, &sources()).unwrap();
        assert_eq!(out[1].word_alignments[0].source_word, "  HOW ");
        assert_eq!(out[1].word_alignments[0].target_word, "Wie");
    }

    #[test]
    fn repeated_word_goes_to_earliest_sentence() {
        let m = SentenceResponse {
            source_text: String::new(),
            natural_translation: "Ich sehe dich. Du siehst mich.".into(),
            word_alignments: vec![
                WordAlignment::new("I", "Ich", 0),
                WordAlignment::new("see", "sehe", 1),
                WordAlignment::new("you", "dich", 2),
                WordAlignment::new("You", "Du", 3),
                WordAlignment::new("see", "siehst", 4),
                WordAlignment::new("me", "mich", 5),
            ],
        };
        let src = vec!["I see you.".to_string(), "You see me.".to_string()];

        let out = redistribute(&m, &src).unwrap();
        let targets = |i: usize| -> Vec<&str> {
            out[i].word_alignments.iter().map(|a| a.target_word.as_str()).collect()
        };
        assert_eq!(targets(0), vec!["Ich", "sehe", "dich", "Du", "siehst"]);
        assert_eq!(targets(1), vec!["mich"]);
        assert_eq!(out[0].word_alignments[4].position, 4);
        assert_eq!(out[1].word_alignments[0].position, 0);
    }

    #[test]
    fn punctuated_source_tokens_still_match() {
        let m = SentenceResponse {
            source_text: String::new(),
            natural_translation: "Ja! Nein?".into(),
            word_alignments: vec![
                WordAlignment::new("Sí", "Ja", 0),
                WordAlignment::new("No", "Nein", 1),
            ],
        };
        let src = vec!["¡Sí!".to_string(), "¿No?".to_string()];

        let out = redistribute(&m, &src).unwrap();
        assert_eq!(out[0].word_alignments[0].target_word, "Ja");
        assert_eq!(out[1].word_alignments[0].target_word, "Nein");
        assert_eq!(out[1].word_alignments[0].position, 0);
    }

    #[test]
    fn matching_response_is_kept() {
        let response = TranslationResponse {
            sentences: vec![
                SentenceResponse {
                    source_text: "Hello world".into(),
                    natural_translation: "Hallo Welt.".into(),
                    word_alignments: vec![],
                },
                SentenceResponse {
                    source_text: "How are you".into(),
                    natural_translation: "Wie geht es dir?".into(),
                    word_alignments: vec![],
                },
            ],
        };

        let out = reconcile_response(response.clone(), &sources()).unwrap();
        assert_eq!(out, response.sentences);
    }

    #[test]
    fn single_merged_response_is_redistributed() {
        let response = TranslationResponse {
            sentences: vec![merged()],
        };

        let out = reconcile_response(response, &sources()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].word_alignments[2].position, 2);
    }

    #[test]
    fn other_counts_are_mismatches() {
        let response = TranslationResponse {
            sentences: vec![merged(), merged(), merged()],
        };

        let err = reconcile_response(response, &sources()).unwrap_err();
        assert!(matches!(
            err,
            ReconciliationError::SentenceCountMismatch { expected: 2, actual: 3, .. }
        ));
    }
}
