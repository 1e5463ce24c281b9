use serde::{Deserialize, Serialize};

/// One editable column: a single source token and the target words stacked under it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ColumnState {
    pub source_word: String,

    #[serde(default)]
    pub assigned_words: Vec<String>,
}

impl ColumnState {
    pub fn new(source_word: impl Into<String>) -> Self {
        Self {
            source_word: source_word.into(),
            assigned_words: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assigned_words.is_empty()
    }
}

/// Editable view of one sentence's alignment. Never persisted as such.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct GridState {
    #[serde(default)]
    pub columns: Vec<ColumnState>,

    #[serde(default)]
    pub unassigned_words: Vec<String>,
}

impl GridState {
    /// Every column holds at least one word.
    pub fn is_valid(&self) -> bool {
        self.columns.iter().all(|c| !c.is_empty())
    }

    pub fn error_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_empty())
            .map(|c| c.source_word.as_str())
            .collect()
    }

    pub fn assigned_words(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .flat_map(|c| c.assigned_words.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_columns_make_grid_invalid() {
        let mut grid = GridState {
            columns: vec![ColumnState::new("Yo"), ColumnState::new("te")],
            unassigned_words: vec![],
        };
        grid.columns[0].assigned_words.push("Ich".into());

        assert!(!grid.is_valid());
        assert_eq!(grid.error_columns(), vec!["te"]);

        grid.columns[1].assigned_words.push("dich".into());
        assert!(grid.is_valid());
        assert!(grid.error_columns().is_empty());
    }
}
