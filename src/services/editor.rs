use std::collections::HashSet;

use crate::model::{GridState, Sentence, SourceMappings, WordAlignment};
use crate::services::grid::{self, ColumnMatching};
use crate::services::hooks::HookManager;
use crate::text::tokenize_clean;

type Observer = Box<dyn FnMut(&SourceMappings) + Send>;

/// Interactive alignment state for one sentence. The editor owns the mapping;
/// readers get snapshots and observers are told after every effective change.
pub struct AlignmentEditor {
    target_words: Vec<String>,
    mappings: SourceMappings,
    observers: Vec<Observer>,
}

impl std::fmt::Debug for AlignmentEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignmentEditor")
            .field("target_words", &self.target_words)
            .field("mappings", &self.mappings)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl AlignmentEditor {
    pub fn new(target_words: Vec<String>, initial: SourceMappings) -> Self {
        Self {
            target_words,
            mappings: initial,
            observers: Vec::new(),
        }
    }

    pub fn from_grid(grid: &GridState, target_words: Vec<String>) -> Self {
        Self::new(target_words, grid::to_source_mappings(grid))
    }

    /// Seeds the editor from a stored sentence: natural-translation words in
    /// order, and the mapping its grid implies.
    pub fn from_sentence(sentence: &Sentence) -> Self {
        let grid = grid::build_with(sentence, ColumnMatching::ByValue);
        Self::from_grid(&grid, tokenize_clean(&sentence.natural_translation))
    }

    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&SourceMappings) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn target_words(&self) -> &[String] {
        &self.target_words
    }

    /// Assigns `target` to `source`. Re-adding an existing pair changes nothing.
    pub fn add(&mut self, source: &str, target: &str) -> bool {
        let targets = self.mappings.entry(source);
        if targets.iter().any(|t| t == target) {
            return false;
        }
        targets.push(target.to_string());
        self.notify();
        true
    }

    /// Unassigns `target` from `source`. Unknown pairs are ignored.
    pub fn remove(&mut self, source: &str, target: &str) -> bool {
        let removed = match self.mappings.get_mut(source) {
            Some(targets) => match targets.iter().position(|t| t == target) {
                Some(i) => {
                    targets.remove(i);
                    true
                }
                None => false,
            },
            None => false,
        };
        if removed {
            self.notify();
        }
        removed
    }

    pub fn clear(&mut self) {
        if self.mappings.is_empty() {
            return;
        }
        self.mappings.clear();
        self.notify();
    }

    /// Natural-translation words not held by any other source, in natural order.
    /// Words already under `for_source` stay available to it.
    pub fn available(&self, for_source: Option<&str>) -> Vec<String> {
        let taken: HashSet<&str> = self
            .mappings
            .iter()
            .filter(|(s, _)| Some(*s) != for_source)
            .flat_map(|(_, targets)| targets.iter().map(String::as_str))
            .collect();

        self.target_words
            .iter()
            .filter(|w| !taken.contains(w.as_str()))
            .cloned()
            .collect()
    }

    pub fn has_available(&self) -> bool {
        !self.available(None).is_empty()
    }

    pub fn assigned(&self, source: &str) -> Vec<String> {
        self.mappings.get(source).map(<[String]>::to_vec).unwrap_or_default()
    }

    pub fn mappings(&self) -> SourceMappings {
        self.mappings.clone()
    }

    pub fn to_alignments(&self, hooks: &HookManager) -> Vec<WordAlignment> {
        hooks.process(&self.mappings, &self.target_words)
    }

    fn notify(&mut self) {
        for observer in self.observers.iter_mut() {
            observer(&self.mappings);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }

    fn editor() -> AlignmentEditor {
        let initial: SourceMappings = vec![("Yo", words(&["Ich"])), ("te", words(&["dich"]))]
            .into_iter()
            .collect();
        AlignmentEditor::new(words(&["Ich", "werde", "dich", "vermissen"]), initial)
    }

    #[test]
    fn available_excludes_other_sources() {
        let e = editor();
        assert_eq!(e.available(None), words(&["werde", "vermissen"]));
        assert_eq!(e.available(Some("Yo")), words(&["Ich", "werde", "vermissen"]));
        assert!(e.has_available());
    }

    #[test]
    fn add_and_remove_notify_only_on_change() {
        let mut e = editor();
        let calls = Arc::new(Mutex::new(0usize));
        let seen = Arc::clone(&calls);
        e.subscribe(move |_| *seen.lock().unwrap() += 1);

        assert!(e.add("extrañaré", "werde"));
        assert!(e.add("extrañaré", "vermissen"));
        assert!(!e.add("extrañaré", "werde"));
        assert!(!e.remove("extrañaré", "Ich"));
        assert!(!e.remove("nada", "Ich"));
        assert_eq!(*calls.lock().unwrap(), 2);

        assert!(e.remove("te", "dich"));
        assert_eq!(*calls.lock().unwrap(), 3);
        assert_eq!(e.assigned("te"), Vec::<String>::new());
        assert_eq!(e.assigned("extrañaré"), words(&["werde", "vermissen"]));
    }

    #[test]
    fn observers_see_the_new_state() {
        let mut e = editor();
        let last = Arc::new(Mutex::new(SourceMappings::new()));
        let sink = Arc::clone(&last);
        e.subscribe(move |m| *sink.lock().unwrap() = m.clone());

        e.add("extrañaré", "werde");
        assert_eq!(*last.lock().unwrap(), e.mappings());
    }

    #[test]
    fn clear_empties_and_notifies_once() {
        let mut e = editor();
        let calls = Arc::new(Mutex::new(0usize));
        let seen = Arc::clone(&calls);
        e.subscribe(move |_| *seen.lock().unwrap() += 1);

        e.clear();
        e.clear();
        assert!(e.mappings().is_empty());
        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(e.available(None).len(), 4);
    }

    #[test]
    fn snapshot_is_detached() {
        let mut e = editor();
        let snapshot = e.mappings();
        e.add("Yo", "werde");
        assert_eq!(snapshot.get("Yo"), Some(&words(&["Ich"])[..]));
    }

    #[test]
    fn emptied_source_is_skipped_by_hooks() {
        let mut e = editor();
        e.add("extrañaré", "werde");
        e.add("extrañaré", "vermissen");
        e.remove("te", "dich");

        let out = e.to_alignments(&HookManager::default());
        assert_eq!(
            out,
            vec![
                WordAlignment::new("Yo", "Ich", 0),
                WordAlignment::new("extrañaré", "werde-vermissen", 1),
            ]
        );
    }

    #[test]
    fn seeds_from_sentence() {
        let s = Sentence::new(
            "Yo te extrañaré",
            "Ich werde dich vermissen",
            vec![
                WordAlignment::new("Yo", "Ich", 0),
                WordAlignment::new("te", "dich", 1),
                WordAlignment::new("extrañaré", "werde-vermissen", 2),
            ],
        );

        let e = AlignmentEditor::from_sentence(&s);
        assert_eq!(e.target_words(), &words(&["Ich", "werde", "dich", "vermissen"])[..]);
        assert_eq!(e.assigned("extrañaré"), words(&["werde", "vermissen"]));
        assert!(!e.has_available());
        assert_eq!(e.to_alignments(&HookManager::default()), s.word_alignments);
    }
}
