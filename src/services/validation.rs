use std::collections::BTreeSet;

use crate::error::ValidationError;
use crate::model::WordAlignment;
use crate::text::extract_normalized_words;

/// Checks that the alignment uses every word of the natural translation and
/// nothing else. Comparison is on lowercase words without punctuation, with
/// hyphenated targets counted as their separate words.
pub fn validate_alignment_complete(
    natural_translation: &str,
    alignments: &[WordAlignment],
) -> Result<(), ValidationError> {
    if natural_translation.trim().is_empty() {
        if alignments.is_empty() {
            return Ok(());
        }
        return Err(ValidationError(
            "natural translation is empty but alignments are present".into(),
        ));
    }

    if alignments.is_empty() {
        return Err(ValidationError("no alignments present".into()));
    }

    let expected: BTreeSet<String> = extract_normalized_words(natural_translation)
        .into_iter()
        .flat_map(|w| split_parts(&w))
        .collect();
    let actual: BTreeSet<String> = alignments
        .iter()
        .flat_map(|a| extract_normalized_words(&a.target_word))
        .flat_map(|w| split_parts(&w))
        .collect();

    let missing: Vec<&str> = expected.difference(&actual).map(String::as_str).collect();
    let extra: Vec<&str> = actual.difference(&expected).map(String::as_str).collect();

    let mut problems = Vec::new();
    if !missing.is_empty() {
        problems.push(format!("missing words: {}", missing.join(", ")));
    }
    if !extra.is_empty() {
        problems.push(format!("extra words: {}", extra.join(", ")));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ValidationError(problems.join("; ")))
    }
}

/// Every alignment must carry a non-blank target.
pub fn validate_source_words_mapped(alignments: &[WordAlignment]) -> Result<(), ValidationError> {
    let unmapped: Vec<String> = alignments
        .iter()
        .filter(|a| a.target_word.trim().is_empty())
        .map(|a| format!("'{}'", a.source_word))
        .collect();

    if unmapped.is_empty() {
        Ok(())
    } else {
        Err(ValidationError(format!(
            "source words without target: {}",
            unmapped.join(", ")
        )))
    }
}

/// Both checks an edited alignment must pass before it is stored.
pub fn validate_alignment(natural_translation: &str, alignments: &[WordAlignment]) -> Result<(), ValidationError> {
    validate_alignment_complete(natural_translation, alignments)?;
    validate_source_words_mapped(alignments)
}

fn split_parts(word: &str) -> Vec<String> {
    word.split('-')
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hyphenated_targets_cover_separate_words() {
        let alignments = vec![
            WordAlignment::new("Yo", "Ich", 0),
            WordAlignment::new("te", "dich", 1),
            WordAlignment::new("extrañaré", "werde-vermissen", 2),
        ];
        assert!(validate_alignment_complete("Ich werde dich vermissen.", &alignments).is_ok());
    }

    #[test]
    fn reports_missing_and_extra_words() {
        let alignments = vec![
            WordAlignment::new("Yo", "Ich", 0),
            WordAlignment::new("extrañaré", "vermisse", 1),
        ];

        let err = validate_alignment_complete("Ich werde dich vermissen", &alignments).unwrap_err();
        assert!(err.0.contains("missing words: dich, vermissen, werde"));
        assert!(err.0.contains("extra words: vermisse"));
    }

    #[test]
    fn empty_cases() {
        assert!(validate_alignment_complete("", &[]).is_ok());
        assert!(validate_alignment_complete("  ", &[WordAlignment::new("a", "b", 0)]).is_err());
        assert!(validate_alignment_complete("Hallo", &[]).is_err());
    }

    #[test]
    fn blank_targets_are_unmapped() {
        let alignments = vec![
            WordAlignment::new("no", " ", 0),
            WordAlignment::new("importante", "wichtig", 1),
        ];
        let err = validate_source_words_mapped(&alignments).unwrap_err();
        assert_eq!(err.0, "source words without target: 'no'");
        assert!(validate_source_words_mapped(&alignments[1..]).is_ok());
    }

    #[test]
    fn blank_target_fails_even_when_complete() {
        let alignments = vec![
            WordAlignment::new("Hola", "Hallo-Welt", 0),
            WordAlignment::new("mundo", "  ", 1),
        ];
        assert!(validate_alignment_complete("Hallo Welt", &alignments).is_ok());

        let err = validate_alignment("Hallo Welt", &alignments).unwrap_err();
        assert_eq!(err.0, "source words without target: 'mundo'");
    }
}
