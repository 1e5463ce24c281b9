use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::CoreResult;
use crate::model::{Sentence, SourceMappings, TranslationResponse, WordAlignment};
use crate::services::hooks::HookManager;
use crate::services::openai::OpenAiCompatibleProvider;
use crate::services::provider::TranslationProvider;
use crate::services::store::JsonFileStore;
use crate::services::{grid, reconcile, source_text, validation, TranslationService};
use crate::text;

mod command;
mod translation;

pub use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn str_field<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

/// Deserializes `payload.<key>`, naming the key in the error.
pub(crate) fn field<T: DeserializeOwned>(payload: &Value, key: &str) -> Result<T, String> {
    let v = payload
        .get(key)
        .cloned()
        .ok_or_else(|| format!("payload.{key} is required"))?;
    serde_json::from_value(v).map_err(|e| format!("invalid payload.{key}: {e}"))
}

/// Error message with its source chain, outermost first.
pub(crate) fn describe(e: &dyn std::error::Error) -> String {
    let mut msg = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        msg.push_str(": ");
        msg.push_str(&s.to_string());
        source = s.source();
    }
    msg
}

/// Request handler holding the long-lived service for one process.
pub struct Core {
    service: TranslationService,
    target_language: String,
}

impl Core {
    pub fn new(service: TranslationService) -> Self {
        Self {
            service,
            target_language: Settings::default().target_language,
        }
    }

    /// Target used when a request names none.
    pub fn with_target_language(mut self, lang: impl Into<String>) -> Self {
        self.target_language = lang.into();
        self
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Opens the configured store and, when one is configured, the default
    /// provider. A provider that cannot be built is logged and left out so the
    /// offline commands keep working.
    pub fn from_settings(settings: &Settings) -> CoreResult<Self> {
        let store_path = settings.resolved_storage_path();
        let store = JsonFileStore::open(&store_path)?;

        let provider: Option<Box<dyn TranslationProvider>> = match settings.default_provider() {
            Some(cfg) => match OpenAiCompatibleProvider::new(cfg.clone()) {
                Ok(p) => {
                    info!(provider = %cfg.name, endpoint = %p.endpoint(), "provider ready");
                    Some(Box::new(p))
                }
                Err(e) => {
                    warn!(provider = %cfg.name, error = %describe(&e), "provider unavailable");
                    None
                }
            },
            None => None,
        };

        info!(store = %store_path.display(), "core ready");

        let service = TranslationService::new(Box::new(store), provider)
            .with_hooks(HookManager::new(settings.hook_policy))
            .with_column_matching(settings.column_matching);
        Ok(Self::new(service).with_target_language(settings.target_language.clone()))
    }

    pub fn service(&self) -> &TranslationService {
        &self.service
    }

    /// Answers one request line with one response line.
    pub fn handle(&self, input: &str) -> String {
        let req: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(_) => {
                return json!({
                    "status": "error",
                    "message": "invalid json"
                })
                .to_string();
            }
        };

        let id = get_id(&req);
        let cmd_str = get_cmd(&req);
        let payload = get_payload(&req);
        let cmd = Command::from(cmd_str);

        debug!(cmd = cmd_str, "request");

        if cmd.touches_store() {
            return match translation::handle(cmd, payload, self) {
                Ok(v) => ok(id, v),
                Err(e) => err(id, e),
            };
        }

        match cmd {
            Command::Ping => {
                let hooks = self.service.hooks();
                ok(
                    id,
                    json!({
                        "message": "birkenbihl-core alive",
                        "hooks": hooks.hook_names(),
                        "hook_policy": hooks.policy(),
                        "target_language": self.target_language,
                    }),
                )
            }

            Command::TextSplit => {
                let sentences = text::split_into_sentences(str_field(payload, "text"));
                ok(id, json!({ "sentences": sentences }))
            }

            Command::TextTokenize => {
                let input = str_field(payload, "text");
                let flag = |key: &str| payload.get(key).and_then(|v| v.as_bool()).unwrap_or(false);

                if flag("punctuation") {
                    let pairs: Vec<Value> = text::tokenize(input)
                        .iter()
                        .map(|token| {
                            let (word, punct) = text::split_trailing_punctuation(token);
                            json!({ "word": word, "punctuation": punct })
                        })
                        .collect();
                    return ok(id, json!({ "words": pairs }));
                }

                let words = if flag("clean") {
                    text::tokenize_clean(input)
                } else {
                    text::tokenize(input)
                };
                ok(id, json!({ "words": words }))
            }

            Command::AlignmentReconcile => {
                let response: TranslationResponse = match field(payload, "response") {
                    Ok(v) => v,
                    Err(e) => return err(id, e),
                };
                let sentences: Vec<String> = match field(payload, "sentences") {
                    Ok(v) => v,
                    Err(e) => return err(id, e),
                };
                match reconcile::reconcile_response(response, &sentences) {
                    Ok(out) => ok(id, json!({ "sentences": out })),
                    Err(e) => err(id, e.to_string()),
                }
            }

            Command::AlignmentHyphenate => {
                let mappings: SourceMappings = match field(payload, "mappings") {
                    Ok(v) => v,
                    Err(e) => return err(id, e),
                };
                let target_words: Vec<String> = field(payload, "target_words").unwrap_or_default();
                let alignments = self.service.hooks().process(&mappings, &target_words);
                ok(id, json!({ "word_alignments": alignments }))
            }

            Command::AlignmentValidate => {
                let natural = str_field(payload, "natural_translation");
                let alignments: Vec<WordAlignment> = match field(payload, "word_alignments") {
                    Ok(v) => v,
                    Err(e) => return err(id, e),
                };
                match validation::validate_alignment(natural, &alignments) {
                    Ok(()) => ok(id, json!({ "valid": true })),
                    Err(e) => ok(id, json!({ "valid": false, "message": e.0 })),
                }
            }

            Command::GridBuild => {
                let state = if payload.get("translation_id").is_some() {
                    let ids = (
                        field(payload, "translation_id"),
                        field(payload, "sentence_id"),
                    );
                    match ids {
                        (Ok(t), Ok(s)) => match self.service.grid_for(t, s) {
                            Ok(g) => g,
                            Err(e) => return err(id, describe(&e)),
                        },
                        (Err(e), _) | (_, Err(e)) => return err(id, e),
                    }
                } else {
                    let sentence: Sentence = match field(payload, "sentence") {
                        Ok(v) => v,
                        Err(e) => return err(id, e),
                    };
                    grid::build_with(&sentence, self.service.column_matching())
                };

                ok(
                    id,
                    json!({
                        "valid": state.is_valid(),
                        "error_columns": state.error_columns(),
                        "grid": state,
                    }),
                )
            }

            Command::SourceLoad => {
                let path = str_field(payload, "path");
                if path.is_empty() {
                    return err(id, "payload.path is required");
                }
                match source_text::load_source_text(std::path::Path::new(path)) {
                    Ok(loaded) => ok(id, serde_json::to_value(loaded).unwrap_or(json!({}))),
                    Err(e) => err(id, describe(&e)),
                }
            }

            _ => err(id, format!("unknown cmd: {cmd_str}")),
        }
    }
}
