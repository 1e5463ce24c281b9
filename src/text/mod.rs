pub mod tokenizer;

pub use tokenizer::{
    clean_word, extract_normalized_words, normalize_word, split_hyphenated,
    split_into_sentences, split_trailing_punctuation, tokenize, tokenize_clean,
};
