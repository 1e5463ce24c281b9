#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    TextSplit,
    TextTokenize,
    AlignmentReconcile,
    AlignmentHyphenate,
    AlignmentValidate,
    GridBuild,
    TranslationCreate,
    TranslationList,
    TranslationGet,
    TranslationSave,
    TranslationUpdate,
    TranslationDelete,
    SentenceUpdateAlignment,
    SentenceUpdateNatural,
    SourceLoad,
    Unknown,
}

impl Command {
    /// Commands that read or write stored translations.
    pub fn touches_store(self) -> bool {
        matches!(
            self,
            Command::TranslationCreate
                | Command::TranslationList
                | Command::TranslationGet
                | Command::TranslationSave
                | Command::TranslationUpdate
                | Command::TranslationDelete
                | Command::SentenceUpdateAlignment
                | Command::SentenceUpdateNatural
        )
    }
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "text.split" => Command::TextSplit,
            "text.tokenize" => Command::TextTokenize,
            "alignment.reconcile" => Command::AlignmentReconcile,
            "alignment.hyphenate" => Command::AlignmentHyphenate,
            "alignment.validate" => Command::AlignmentValidate,
            "grid.build" => Command::GridBuild,
            "translation.create" => Command::TranslationCreate,
            "translation.list" => Command::TranslationList,
            "translation.get" => Command::TranslationGet,
            "translation.save" => Command::TranslationSave,
            "translation.update" => Command::TranslationUpdate,
            "translation.delete" => Command::TranslationDelete,
            "sentence.update_alignment" => Command::SentenceUpdateAlignment,
            "sentence.update_natural" => Command::SentenceUpdateNatural,
            "source.load" => Command::SourceLoad,
            _ => Command::Unknown,
        }
    }
}
