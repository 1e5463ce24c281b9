use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Failure of a single reconciliation attempt. Never retried here; the caller
/// decides whether to query the provider again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationError {
    #[error("natural translation split into {actual} sentences but expected {expected}: {fragments:?}")]
    SentenceCountMismatch {
        expected: usize,
        actual: usize,
        fragments: Vec<String>,
    },

    #[error("could not match source word '{word}' to any source sentence: {sentences:?}")]
    UnmatchedSourceWord { word: String, sentences: Vec<String> },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("translation {0} not found")]
    NotFound(Uuid),

    #[error("storage i/o failed at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage serialization failed")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("provider '{0}' has no api key configured")]
    MissingApiKey(String),

    #[error("http request failed")]
    Http(#[from] reqwest::Error),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("provider gave up after {attempts} attempts: {last_error}")]
    Exhausted { attempts: usize, last_error: String },
}

/// Alignment rejected by the completeness checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid alignment: {0}")]
pub struct ValidationError(pub String);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Error, Debug)]
pub enum SourceTextError {
    #[error("failed to read source text {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source text {0} is empty")]
    Empty(PathBuf),
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    SourceText(#[from] SourceTextError),

    #[error("sentence {sentence} not found in translation {translation}")]
    SentenceNotFound { translation: Uuid, sentence: String },

    #[error("no translation provider configured")]
    NoProvider,
}

pub type CoreResult<T> = Result<T, CoreError>;
