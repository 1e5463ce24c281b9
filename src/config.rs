use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::services::grid::ColumnMatching;
use crate::services::hooks::HookPolicy;

pub const CONFIG_ENV: &str = "BIRKENBIHL_CONFIG";
pub const HOME_ENV: &str = "BIRKENBIHL_HOME";

const CONFIG_FILE: &str = "config.toml";
const STORE_FILE: &str = "translations.json";

fn default_target_language() -> String {
    "de".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub name: String,

    pub provider_type: String,

    pub model: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub storage_path: Option<PathBuf>,

    #[serde(default = "default_target_language")]
    pub target_language: String,

    #[serde(default)]
    pub hook_policy: HookPolicy,

    #[serde(default)]
    pub column_matching: ColumnMatching,

    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_path: None,
            target_language: default_target_language(),
            hook_policy: HookPolicy::default(),
            column_matching: ColumnMatching::default(),
            providers: Vec::new(),
        }
    }
}

impl Settings {
    /// Provider marked as default, else the first one.
    pub fn default_provider(&self) -> Option<&ProviderConfig> {
        self.providers
            .iter()
            .find(|p| p.is_default)
            .or_else(|| self.providers.first())
    }

    pub fn resolved_storage_path(&self) -> PathBuf {
        match &self.storage_path {
            Some(p) => p.clone(),
            None => base_dir().join(STORE_FILE),
        }
    }

    /// `$BIRKENBIHL_CONFIG`, else `config.toml` under the base directory.
    /// A missing file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(p) => PathBuf::from(p),
            None => base_dir().join(CONFIG_FILE),
        };

        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        load_from_file(&path)
    }
}

/// `$BIRKENBIHL_HOME`, else `~/.birkenbihl`, else `./.birkenbihl`.
pub fn base_dir() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return PathBuf::from(home);
    }
    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        return PathBuf::from(home).join(".birkenbihl");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".birkenbihl")
}

pub fn load_from_file(path: &Path) -> Result<Settings, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse(&contents).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

pub fn parse(contents: &str) -> Result<Settings, String> {
    toml::from_str::<Settings>(contents).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let s = parse("").unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.target_language, "de");
        assert!(s.default_provider().is_none());
    }

    #[test]
    fn parses_providers_and_policies() {
        let s = parse(
            r#"
            storage_path = "/tmp/birk/translations.json"
            target_language = "en"
            hook_policy = "chain"
            column_matching = "by_occurrence"

            [[providers]]
            name = "local"
            provider_type = "ollama"
            model = "llama3"

            [[providers]]
            name = "GPT-4o"
            provider_type = "openai"
            model = "gpt-4o"
            api_key = "sk-test"
            is_default = true
            "#,
        )
        .unwrap();

        assert_eq!(s.hook_policy, HookPolicy::Chain);
        assert_eq!(s.column_matching, ColumnMatching::ByOccurrence);
        assert_eq!(s.resolved_storage_path(), PathBuf::from("/tmp/birk/translations.json"));
        assert_eq!(s.default_provider().map(|p| p.name.as_str()), Some("GPT-4o"));
        assert_eq!(s.providers[0].api_key, "");
        assert_eq!(s.target_language, "en");
    }

    #[test]
    fn first_provider_is_fallback_default() {
        let s = parse(
            r#"
            [[providers]]
            name = "a"
            provider_type = "openai"
            model = "m"
            "#,
        )
        .unwrap();
        assert_eq!(s.default_provider().map(|p| p.name.as_str()), Some("a"));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(parse("hook_policy = \"sometimes\"").is_err());
    }

    #[test]
    fn load_from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "target_language = 3").unwrap();

        let err = load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn broken_config_file_is_an_error_not_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "hook_policy = [").unwrap();

        std::env::set_var(CONFIG_ENV, &path);
        let loaded = Settings::load();
        std::env::remove_var(CONFIG_ENV);

        assert!(matches!(loaded, Err(ConfigError::Parse { .. })));
    }
}
