pub mod grid;
pub mod mappings;
pub mod response;
pub mod translation;

pub use grid::{ColumnState, GridState};
pub use mappings::SourceMappings;
pub use response::{SentenceResponse, TranslationResponse};
pub use translation::{Sentence, Translation, WordAlignment};
