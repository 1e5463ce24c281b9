use serde_json::{json, Value};
use uuid::Uuid;

use crate::model::{Translation, WordAlignment};
use crate::services::TranslationRequest;

use super::command::Command;
use super::{describe, field, Core};

fn uuid_field(payload: &Value, key: &str) -> Result<Uuid, String> {
    let raw = payload
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("payload.{key} is required"))?;
    Uuid::parse_str(raw).map_err(|e| format!("payload.{key} is not a uuid: {e}"))
}

/// Handles the commands backed by the translation store.
pub fn handle(cmd: Command, payload: &Value, core: &Core) -> Result<Value, String> {
    let service = core.service();

    match cmd {
        Command::TranslationCreate => {
            let mut request: TranslationRequest =
                serde_json::from_value(payload.clone()).map_err(|e| format!("invalid request: {e}"))?;
            if request.text.trim().is_empty() {
                return Err("payload.text is required".into());
            }
            if request.target_lang.trim().is_empty() {
                request.target_lang = core.target_language().to_string();
            }
            let save = payload.get("save").and_then(|v| v.as_bool()).unwrap_or(true);

            let translated = if request.source_lang.trim().is_empty() {
                service.auto_detect_and_translate(&request.text, &request.target_lang, &request.title)
            } else {
                service.translate(&request)
            };
            let translation = translated.map_err(|e| describe(&e))?;

            let result = if save {
                service.save_translation(translation)
            } else {
                Ok(translation)
            };
            result
                .map(|t| json!({ "translation": t }))
                .map_err(|e| describe(&e))
        }

        Command::TranslationList => service
            .list_translations()
            .map(|all| json!({ "translations": all }))
            .map_err(|e| describe(&e)),

        Command::TranslationGet => {
            let id = uuid_field(payload, "id")?;
            match service.get_translation(id).map_err(|e| describe(&e))? {
                Some(t) => Ok(json!({ "translation": t })),
                None => Err(format!("translation {id} not found")),
            }
        }

        Command::TranslationSave | Command::TranslationUpdate => {
            let translation: Translation = field(payload, "translation")?;
            let result = if cmd == Command::TranslationSave {
                service.save_translation(translation)
            } else {
                service.update_translation(translation)
            };
            result
                .map(|t| json!({ "translation": t }))
                .map_err(|e| describe(&e))
        }

        Command::TranslationDelete => {
            let id = uuid_field(payload, "id")?;
            service
                .delete_translation(id)
                .map(|deleted| json!({ "deleted": deleted }))
                .map_err(|e| describe(&e))
        }

        Command::SentenceUpdateAlignment => {
            let translation_id = uuid_field(payload, "translation_id")?;
            let sentence_id = uuid_field(payload, "sentence_id")?;
            let alignments: Vec<WordAlignment> = field(payload, "word_alignments")?;

            service
                .update_sentence_alignment(translation_id, sentence_id, alignments)
                .map(|t| json!({ "translation": t }))
                .map_err(|e| describe(&e))
        }

        Command::SentenceUpdateNatural => {
            let translation_id = uuid_field(payload, "translation_id")?;
            let sentence_id = uuid_field(payload, "sentence_id")?;
            let natural: String = field(payload, "natural_translation")?;

            service
                .update_sentence_natural(translation_id, sentence_id, &natural)
                .map(|t| json!({ "translation": t }))
                .map_err(|e| describe(&e))
        }

        other => Err(format!("{other:?} is not a store command")),
    }
}
