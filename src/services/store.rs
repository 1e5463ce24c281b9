use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::Translation;

/// Persistence for `Translation` aggregates keyed by UUID. Last write wins.
pub trait TranslationStore {
    /// Inserts or overwrites; `updated_at` is refreshed before writing.
    fn save(&self, translation: Translation) -> Result<Translation, StoreError>;

    fn get(&self, id: Uuid) -> Result<Option<Translation>, StoreError>;

    /// Most recently updated first.
    fn list_all(&self) -> Result<Vec<Translation>, StoreError>;

    /// `true` iff a record existed and was removed.
    fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Like `save`, but the UUID must already exist.
    fn update(&self, translation: Translation) -> Result<Translation, StoreError>;
}

fn upsert(all: &mut Vec<Translation>, mut translation: Translation, must_exist: bool) -> Result<Translation, StoreError> {
    let idx = all.iter().position(|t| t.uuid == translation.uuid);
    if must_exist && idx.is_none() {
        return Err(StoreError::NotFound(translation.uuid));
    }

    translation.updated_at = Utc::now();

    match idx {
        Some(i) => all[i] = translation.clone(),
        None => all.push(translation.clone()),
    }
    Ok(translation)
}

fn newest_first(mut all: Vec<Translation>) -> Vec<Translation> {
    all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    all
}

/// All translations in one pretty-printed JSON array file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Opens the store, creating parent directories and an empty file if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self { path: path.into() };
        if !store.path.exists() {
            store.write_all(&[])?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<Translation>, StoreError> {
        let data = fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        if data.trim().is_empty() {
            warn!(path = %self.path.display(), "store file is empty, treating as no translations");
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&data)?)
    }

    fn write_all(&self, translations: &[Translation]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(translations)?;
        write_atomic(&self.path, json.as_bytes())?;
        debug!(path = %self.path.display(), count = translations.len(), "store written");
        Ok(())
    }
}

impl TranslationStore for JsonFileStore {
    fn save(&self, translation: Translation) -> Result<Translation, StoreError> {
        let mut all = self.read_all()?;
        let saved = upsert(&mut all, translation, false)?;
        self.write_all(&all)?;
        Ok(saved)
    }

    fn get(&self, id: Uuid) -> Result<Option<Translation>, StoreError> {
        Ok(self.read_all()?.into_iter().find(|t| t.uuid == id))
    }

    fn list_all(&self) -> Result<Vec<Translation>, StoreError> {
        Ok(newest_first(self.read_all()?))
    }

    fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut all = self.read_all()?;
        let before = all.len();
        all.retain(|t| t.uuid != id);

        if all.len() == before {
            return Ok(false);
        }
        self.write_all(&all)?;
        Ok(true)
    }

    fn update(&self, translation: Translation) -> Result<Translation, StoreError> {
        let mut all = self.read_all()?;
        let saved = upsert(&mut all, translation, true)?;
        self.write_all(&all)?;
        Ok(saved)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
    }

    fs::write(&tmp, bytes).map_err(|e| StoreError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "translations.json".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

/// Process-local store, mostly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    translations: Mutex<Vec<Translation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Vec<Translation>) -> R) -> R {
        let mut guard = self.translations.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }
}

impl TranslationStore for MemoryStore {
    fn save(&self, translation: Translation) -> Result<Translation, StoreError> {
        self.with(|all| upsert(all, translation, false))
    }

    fn get(&self, id: Uuid) -> Result<Option<Translation>, StoreError> {
        Ok(self.with(|all| all.iter().find(|t| t.uuid == id).cloned()))
    }

    fn list_all(&self) -> Result<Vec<Translation>, StoreError> {
        Ok(newest_first(self.with(|all| all.clone())))
    }

    fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.with(|all| {
            let before = all.len();
            all.retain(|t| t.uuid != id);
            all.len() != before
        }))
    }

    fn update(&self, translation: Translation) -> Result<Translation, StoreError> {
        self.with(|all| upsert(all, translation, true))
    }
}
