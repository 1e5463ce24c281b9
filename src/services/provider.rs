use crate::error::ProviderError;
use crate::model::{TranslationResponse, WordAlignment};

/// Source of raw translations. Implementations return what the model produced;
/// reconciling merged sentences is the caller's job.
pub trait TranslationProvider {
    fn translate(
        &self,
        sentences: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<TranslationResponse, ProviderError>;

    /// New word-by-word alignment for an edited natural translation.
    fn regenerate_alignment(
        &self,
        source_text: &str,
        natural_translation: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<WordAlignment>, ProviderError>;

    /// Language code (`es`, `de`, ...) of `text`.
    fn detect_language(&self, text: &str) -> Result<String, ProviderError>;
}

pub const SYSTEM_PROMPT: &str = "You are a language translation expert specializing in the Vera F. Birkenbihl \
language learning method.

Provide TWO translations for every sentence:

1. Natural translation: fluent, idiomatic, grammatically correct, same meaning and tone.
2. Word-by-word alignment: every source word paired with its literal translation, \
following the source word order. When one source word needs several target words, \
join them with hyphens (e.g. \"werde-vermissen\"). Positions start at 0.

Every word of the natural translation MUST appear in the word-by-word alignment.

Example:
Source (Spanish): \"Yo te extrañaré\"
Natural (German): \"Ich werde dich vermissen\"
Word-by-word: Yo -> Ich (0), te -> dich (1), extrañaré -> werde-vermissen (2)

Answer with JSON only, shaped as:
{\"sentences\": [{\"source_text\": \"...\", \"natural_translation\": \"...\", \
\"word_alignments\": [{\"source_word\": \"...\", \"target_word\": \"...\", \"position\": 0}]}]}";

pub fn language_name(code: &str) -> String {
    match code {
        "en" => "English".into(),
        "es" => "Spanish".into(),
        "de" => "German".into(),
        "fr" => "French".into(),
        "it" => "Italian".into(),
        "pt" => "Portuguese".into(),
        other => other.to_uppercase(),
    }
}

pub fn translation_prompt(sentences: &[String], source_lang: &str, target_lang: &str) -> String {
    let source = language_name(source_lang);
    let target = language_name(target_lang);

    if sentences.len() == 1 {
        return format!(
            "Translate the following sentence from {source} to {target} using the Birkenbihl method.\n\n\
             Source sentence:\n{}\n\n\
             Provide:\n1. Natural translation in {target}\n\
             2. Word-by-word alignment showing how each source word maps to the target language\n",
            sentences[0]
        );
    }

    let numbered: Vec<String> = sentences
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {}", i + 1, s))
        .collect();
    let n = sentences.len();

    format!(
        "Translate ALL {n} sentences from {source} to {target} using the Birkenbihl method.\n\n\
         Source sentences:\n{}\n\n\
         CRITICAL: You must translate ALL {n} sentences listed above.\n\
         Provide for EACH sentence separately:\n1. Natural translation in {target}\n\
         2. Word-by-word alignment showing how each source word maps to the target language\n\n\
         Your response must contain exactly {n} sentence translations - one for each source sentence.\n",
        numbered.join("\n")
    )
}

pub fn alignment_prompt(
    source_text: &str,
    natural_translation: &str,
    source_lang: &str,
    target_lang: &str,
) -> String {
    let source = language_name(source_lang);
    let target = language_name(target_lang);

    format!(
        "Create a word-by-word alignment for this {source} sentence and its {target} translation.\n\n\
         Source sentence:\n{source_text}\n\n\
         Natural translation (fixed, do not change it):\n{natural_translation}\n\n\
         Use every word of the natural translation exactly once. Join several target words \
         belonging to one source word with hyphens.\n\
         Answer with JSON only: {{\"word_alignments\": [{{\"source_word\": \"...\", \
         \"target_word\": \"...\", \"position\": 0}}]}}\n"
    )
}

pub fn detection_prompt(text: &str) -> String {
    format!(
        "Identify the language of the following text.\n\n\
         Text:\n{text}\n\n\
         Answer with JSON only: {{\"language\": \"<ISO 639-1 code>\"}}\n"
    )
}

/// Two or three letter lowercase code from a model answer such as `"ES"` or
/// `"pt-BR"`.
pub fn normalize_language_code(raw: &str) -> Option<String> {
    let code = raw
        .trim()
        .split(|c: char| c == '-' || c == '_')
        .next()
        .unwrap_or("")
        .to_lowercase();

    let valid = (2..=3).contains(&code.len()) && code.chars().all(|c| c.is_ascii_lowercase());
    valid.then_some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_sentence_prompt_is_not_numbered() {
        let p = translation_prompt(&["Yo te extrañaré".to_string()], "es", "de");
        assert!(p.contains("from Spanish to German"));
        assert!(p.contains("Source sentence:\nYo te extrañaré"));
        assert!(!p.contains("1. Yo"));
    }

    #[test]
    fn multi_sentence_prompt_numbers_and_counts() {
        let p = translation_prompt(&["Hola.".to_string(), "Adiós.".to_string()], "es", "xx");
        assert!(p.contains("ALL 2 sentences from Spanish to XX"));
        assert!(p.contains("1. Hola.\n2. Adiós."));
        assert!(p.contains("exactly 2 sentence translations"));
    }

    #[test]
    fn alignment_prompt_keeps_natural_text() {
        let p = alignment_prompt("Yo te extrañaré", "Ich werde dich vermissen", "es", "de");
        assert!(p.contains("Ich werde dich vermissen"));
        assert!(p.contains("\"word_alignments\""));
    }

    #[test]
    fn language_codes_are_normalized() {
        assert_eq!(normalize_language_code(" ES "), Some("es".to_string()));
        assert_eq!(normalize_language_code("pt-BR"), Some("pt".to_string()));
        assert_eq!(normalize_language_code("Spanish"), None);
        assert_eq!(normalize_language_code(""), None);
        assert!(detection_prompt("Hola mundo").contains("Text:\nHola mundo"));
    }
}
