use serde::{Deserialize, Serialize};

use crate::model::{SourceMappings, WordAlignment};

/// Separator between natural-translation words that share one source word.
pub const MULTI_WORD_SEPARATOR: &str = "-";

/// Post-processor turning edited `source -> [targets]` state into alignments.
///
/// `previous` is the output of the hook before this one when hooks are
/// chained, and empty otherwise.
pub trait AlignmentHook: Send + Sync {
    fn name(&self) -> &str;

    fn process(
        &self,
        source_mappings: &SourceMappings,
        target_words: &[String],
        previous: Vec<WordAlignment>,
    ) -> Vec<WordAlignment>;
}

/// Flattens the mapping in insertion order. Sources without targets are
/// skipped, several targets are joined with `-` in assignment order, and
/// positions count only emitted alignments.
pub fn hyphenate(source_mappings: &SourceMappings) -> Vec<WordAlignment> {
    source_mappings
        .iter()
        .filter(|(_, targets)| !targets.is_empty())
        .enumerate()
        .map(|(position, (source, targets))| {
            WordAlignment::new(source, targets.join(MULTI_WORD_SEPARATOR), position)
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HyphenateMultiWords;

impl AlignmentHook for HyphenateMultiWords {
    fn name(&self) -> &str {
        "hyphenate_multi_words"
    }

    fn process(
        &self,
        source_mappings: &SourceMappings,
        _target_words: &[String],
        _previous: Vec<WordAlignment>,
    ) -> Vec<WordAlignment> {
        hyphenate(source_mappings)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HookPolicy {
    /// Only the most recently registered hook runs.
    #[default]
    LastWins,
    /// Every hook runs in registration order, each fed the previous output.
    Chain,
}

pub struct HookManager {
    hooks: Vec<Box<dyn AlignmentHook>>,
    policy: HookPolicy,
}

impl Default for HookManager {
    fn default() -> Self {
        Self::new(HookPolicy::default())
    }
}

impl HookManager {
    /// Manager with the hyphenation hook registered.
    pub fn new(policy: HookPolicy) -> Self {
        let mut m = Self::empty(policy);
        m.register(Box::new(HyphenateMultiWords));
        m
    }

    pub fn empty(policy: HookPolicy) -> Self {
        Self {
            hooks: Vec::new(),
            policy,
        }
    }

    pub fn policy(&self) -> HookPolicy {
        self.policy
    }

    pub fn register(&mut self, hook: Box<dyn AlignmentHook>) {
        self.hooks.push(hook);
    }

    pub fn hook_names(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    pub fn process(&self, source_mappings: &SourceMappings, target_words: &[String]) -> Vec<WordAlignment> {
        match self.policy {
            HookPolicy::LastWins => match self.hooks.last() {
                Some(hook) => hook.process(source_mappings, target_words, Vec::new()),
                None => Vec::new(),
            },
            HookPolicy::Chain => self.hooks.iter().fold(Vec::new(), |acc, hook| {
                hook.process(source_mappings, target_words, acc)
            }),
        }
    }
}
