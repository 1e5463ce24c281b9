use serde::{Deserialize, Serialize};

/// Insertion-ordered `source word -> [target words]` mapping. Source words are
/// unique keys; iteration follows first insertion.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct SourceMappings {
    entries: Vec<(String, Vec<String>)>,
}

impl SourceMappings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, source: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(s, _)| s == source)
            .map(|(_, t)| t.as_slice())
    }

    pub fn contains_key(&self, source: &str) -> bool {
        self.entries.iter().any(|(s, _)| s == source)
    }

    /// Mutable target list for `source`, inserting an empty one at the end if absent.
    pub fn entry(&mut self, source: &str) -> &mut Vec<String> {
        let idx = match self.entries.iter().position(|(s, _)| s == source) {
            Some(i) => i,
            None => {
                self.entries.push((source.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn get_mut(&mut self, source: &str) -> Option<&mut Vec<String>> {
        self.entries
            .iter_mut()
            .find(|(s, _)| s == source)
            .map(|(_, t)| t)
    }

    /// Replaces the targets of `source`, keeping its original slot if present.
    pub fn insert(&mut self, source: impl Into<String>, targets: Vec<String>) {
        let source = source.into();
        *self.entry(&source) = targets;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(s, t)| (s.as_str(), t.as_slice()))
    }
}

impl<S, T> FromIterator<(S, Vec<T>)> for SourceMappings
where
    S: Into<String>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (S, Vec<T>)>>(iter: I) -> Self {
        let mut out = SourceMappings::new();
        for (source, targets) in iter {
            out.insert(source, targets.into_iter().map(Into::into).collect());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_insertion_order() {
        let mut m = SourceMappings::new();
        m.insert("b", vec!["x".into()]);
        m.insert("a", vec!["y".into()]);
        m.insert("b", vec!["z".into()]);

        let keys: Vec<&str> = m.iter().map(|(s, _)| s).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(m.get("b"), Some(&["z".to_string()][..]));
    }

    #[test]
    fn entry_creates_empty_slot() {
        let mut m = SourceMappings::new();
        m.entry("Yo").push("Ich".into());
        assert_eq!(m.get("Yo").map(|t| t.len()), Some(1));
        assert!(m.get("te").is_none());
    }
}
