use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{ColumnState, GridState, Sentence, SourceMappings, WordAlignment};
use crate::services::hooks::{HookManager, MULTI_WORD_SEPARATOR};
use crate::text::{clean_word, split_hyphenated, tokenize_clean};

/// How alignments find their column when a source word occurs more than once.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColumnMatching {
    /// Every column with an equal source word gets the alignment's targets.
    #[default]
    ByValue,
    /// The n-th alignment for a word (by position) fills the n-th column with that word.
    ByOccurrence,
}

pub fn build(sentence: &Sentence) -> GridState {
    build_with(sentence, ColumnMatching::ByValue)
}

/// Rebuilds the editable grid for `sentence`: one column per source token,
/// hyphenated targets split back into separate words, and every word of the
/// natural translation that no column holds listed as unassigned.
pub fn build_with(sentence: &Sentence, matching: ColumnMatching) -> GridState {
    let mut columns: Vec<ColumnState> = tokenize_clean(&sentence.source_text)
        .into_iter()
        .map(ColumnState::new)
        .collect();

    let alignments = sentence.sorted_alignments();

    match matching {
        ColumnMatching::ByValue => fill_by_value(&mut columns, &alignments),
        ColumnMatching::ByOccurrence => fill_by_occurrence(&mut columns, &alignments),
    }

    let unassigned_words = unassigned(&sentence.natural_translation, &columns);

    GridState {
        columns,
        unassigned_words,
    }
}

// Words of a stored target as the natural translation tokenizes them.
fn target_words(target: &str) -> Vec<String> {
    split_hyphenated(target)
        .iter()
        .map(|w| clean_word(w))
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

fn fill_by_value(columns: &mut [ColumnState], alignments: &[&WordAlignment]) {
    for column in columns.iter_mut() {
        for a in alignments.iter().filter(|a| a.source_word == column.source_word) {
            column.assigned_words.extend(target_words(&a.target_word));
        }
    }
}

fn fill_by_occurrence(columns: &mut [ColumnState], alignments: &[&WordAlignment]) {
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for a in alignments {
        let nth = seen.entry(a.source_word.as_str()).or_insert(0);
        let matches: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.source_word == a.source_word)
            .map(|(i, _)| i)
            .collect();

        // Surplus alignments for a word attach to its last column.
        if let Some(&idx) = matches.get(*nth).or(matches.last()) {
            columns[idx].assigned_words.extend(target_words(&a.target_word));
        }
        *nth += 1;
    }
}

// Natural-translation words held by no column, first occurrence order, no repeats.
fn unassigned(natural_translation: &str, columns: &[ColumnState]) -> Vec<String> {
    let assigned: HashSet<&str> = columns
        .iter()
        .flat_map(|c| c.assigned_words.iter().map(String::as_str))
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    tokenize_clean(natural_translation)
        .into_iter()
        .filter(|w| !assigned.contains(w.as_str()))
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

/// Editing state keyed by source word. Columns sharing a word share one entry;
/// words already present under that key are not repeated.
pub fn to_source_mappings(grid: &GridState) -> SourceMappings {
    let mut out = SourceMappings::new();
    for column in &grid.columns {
        let targets = out.entry(&column.source_word);
        for w in &column.assigned_words {
            if !targets.contains(w) {
                targets.push(w.clone());
            }
        }
    }
    out
}

/// Alignments through the hook pipeline, keyed by source word.
pub fn to_word_alignments(grid: &GridState, hooks: &HookManager) -> Vec<WordAlignment> {
    let target_words: Vec<String> = grid.assigned_words().map(String::from).collect();
    hooks.process(&to_source_mappings(grid), &target_words)
}

/// One alignment per non-empty column, in column order. Pairs with
/// `ColumnMatching::ByOccurrence` for sentences that repeat a source word.
pub fn column_alignments(grid: &GridState) -> Vec<WordAlignment> {
    grid.columns
        .iter()
        .filter(|c| !c.is_empty())
        .enumerate()
        .map(|(position, c)| {
            WordAlignment::new(&c.source_word, c.assigned_words.join(MULTI_WORD_SEPARATOR), position)
        })
        .collect()
}
