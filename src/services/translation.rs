use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, StoreError, ValidationError};
use crate::model::{GridState, Sentence, Translation, WordAlignment};
use crate::services::editor::AlignmentEditor;
use crate::services::grid::{self, ColumnMatching};
use crate::services::hooks::HookManager;
use crate::services::provider::TranslationProvider;
use crate::services::reconcile::reconcile_response;
use crate::services::store::TranslationStore;
use crate::services::validation::validate_alignment;
use crate::text::split_into_sentences;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    /// Empty when the caller wants the provider to detect it.
    #[serde(default)]
    pub source_lang: String,
    #[serde(default)]
    pub target_lang: String,
    #[serde(default)]
    pub title: String,
}

/// Ties a provider, a store and the alignment rules together. Both
/// collaborators are handed in; the service never locates them itself.
pub struct TranslationService {
    store: Box<dyn TranslationStore>,
    provider: Option<Box<dyn TranslationProvider>>,
    hooks: HookManager,
    column_matching: ColumnMatching,
}

impl TranslationService {
    pub fn new(store: Box<dyn TranslationStore>, provider: Option<Box<dyn TranslationProvider>>) -> Self {
        Self {
            store,
            provider,
            hooks: HookManager::default(),
            column_matching: ColumnMatching::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: HookManager) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_column_matching(mut self, matching: ColumnMatching) -> Self {
        self.column_matching = matching;
        self
    }

    pub fn set_provider(&mut self, provider: Box<dyn TranslationProvider>) {
        self.provider = Some(provider);
    }

    pub fn hooks(&self) -> &HookManager {
        &self.hooks
    }

    pub fn column_matching(&self) -> ColumnMatching {
        self.column_matching
    }

    fn provider(&self) -> CoreResult<&dyn TranslationProvider> {
        self.provider.as_deref().ok_or(CoreError::NoProvider)
    }

    /// Translates a block of text in one provider call and returns an unsaved
    /// `Translation` with one sentence per detected source sentence.
    pub fn translate(&self, request: &TranslationRequest) -> CoreResult<Translation> {
        let sentences = split_into_sentences(&request.text);
        if sentences.is_empty() {
            return Err(ValidationError("nothing to translate".into()).into());
        }
        if request.source_lang.trim().is_empty() || request.target_lang.trim().is_empty() {
            return Err(ValidationError("source and target language are required".into()).into());
        }

        let response = self
            .provider()?
            .translate(&sentences, &request.source_lang, &request.target_lang)?;
        let per_sentence = reconcile_response(response, &sentences)?;

        info!(
            sentences = per_sentence.len(),
            source = %request.source_lang,
            target = %request.target_lang,
            "translation created"
        );

        Ok(Translation::new(
            request.title.clone(),
            request.source_lang.clone(),
            request.target_lang.clone(),
            per_sentence.into_iter().map(|s| s.into_sentence()).collect(),
        ))
    }

    /// Asks the provider for the language of `text`, then translates it.
    /// The result is not saved.
    pub fn auto_detect_and_translate(&self, text: &str, target_lang: &str, title: &str) -> CoreResult<Translation> {
        if text.trim().is_empty() {
            return Err(ValidationError("nothing to translate".into()).into());
        }

        let source_lang = self.provider()?.detect_language(text)?;
        info!(source = %source_lang, "source language detected");

        self.translate(&TranslationRequest {
            text: text.to_string(),
            source_lang,
            target_lang: target_lang.to_string(),
            title: title.to_string(),
        })
    }

    pub fn translate_and_save(&self, request: &TranslationRequest) -> CoreResult<Translation> {
        let translation = self.translate(request)?;
        Ok(self.store.save(translation)?)
    }

    /// Inserts unknown translations, updates known ones.
    pub fn save_translation(&self, translation: Translation) -> CoreResult<Translation> {
        let saved = match self.store.get(translation.uuid)? {
            None => self.store.save(translation)?,
            Some(_) => self.store.update(translation)?,
        };
        Ok(saved)
    }

    pub fn get_translation(&self, id: Uuid) -> CoreResult<Option<Translation>> {
        Ok(self.store.get(id)?)
    }

    pub fn list_translations(&self) -> CoreResult<Vec<Translation>> {
        Ok(self.store.list_all()?)
    }

    pub fn delete_translation(&self, id: Uuid) -> CoreResult<bool> {
        Ok(self.store.delete(id)?)
    }

    pub fn update_translation(&self, translation: Translation) -> CoreResult<Translation> {
        Ok(self.store.update(translation)?)
    }

    fn load(&self, id: Uuid) -> CoreResult<Translation> {
        self.store.get(id)?.ok_or(CoreError::Store(StoreError::NotFound(id)))
    }

    fn sentence_of<'t>(translation: &'t mut Translation, sentence: Uuid) -> CoreResult<&'t mut Sentence> {
        let id = translation.uuid;
        translation
            .sentence_mut(sentence)
            .ok_or_else(|| CoreError::SentenceNotFound {
                translation: id,
                sentence: sentence.to_string(),
            })
    }

    /// Grid view of a stored sentence for editing.
    pub fn grid_for(&self, translation_id: Uuid, sentence: Uuid) -> CoreResult<GridState> {
        let mut translation = self.load(translation_id)?;
        let s = Self::sentence_of(&mut translation, sentence)?;
        Ok(grid::build_with(s, self.column_matching))
    }

    /// Replaces a sentence's alignment after checking it covers the natural
    /// translation exactly and gives every source word a target.
    pub fn update_sentence_alignment(
        &self,
        translation_id: Uuid,
        sentence: Uuid,
        alignments: Vec<WordAlignment>,
    ) -> CoreResult<Translation> {
        let mut translation = self.load(translation_id)?;
        let s = Self::sentence_of(&mut translation, sentence)?;

        validate_alignment(&s.natural_translation, &alignments)?;
        s.word_alignments = alignments;

        translation.touch();
        Ok(self.store.update(translation)?)
    }

    /// Runs the editor state through the hook pipeline and stores the result.
    pub fn apply_edit(
        &self,
        translation_id: Uuid,
        sentence: Uuid,
        editor: &AlignmentEditor,
    ) -> CoreResult<Translation> {
        let alignments = editor.to_alignments(&self.hooks);
        self.update_sentence_alignment(translation_id, sentence, alignments)
    }

    /// Stores a grid edited column by column.
    pub fn apply_grid(&self, translation_id: Uuid, sentence: Uuid, grid_state: &GridState) -> CoreResult<Translation> {
        let alignments = match self.column_matching {
            ColumnMatching::ByValue => grid::to_word_alignments(grid_state, &self.hooks),
            ColumnMatching::ByOccurrence => grid::column_alignments(grid_state),
        };
        self.update_sentence_alignment(translation_id, sentence, alignments)
    }

    /// Sets a new natural translation and asks the provider for a matching alignment.
    pub fn update_sentence_natural(
        &self,
        translation_id: Uuid,
        sentence: Uuid,
        natural_translation: &str,
    ) -> CoreResult<Translation> {
        let mut translation = self.load(translation_id)?;
        let (source_lang, target_lang) = (
            translation.source_language.clone(),
            translation.target_language.clone(),
        );
        let s = Self::sentence_of(&mut translation, sentence)?;

        let alignments = self.provider()?.regenerate_alignment(
            &s.source_text,
            natural_translation,
            &source_lang,
            &target_lang,
        )?;

        s.natural_translation = natural_translation.to_string();
        s.word_alignments = alignments;

        translation.touch();
        Ok(self.store.update(translation)?)
    }
}
