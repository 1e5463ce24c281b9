pub mod editor;
pub mod grid;
pub mod hooks;
pub mod openai;
pub mod provider;
pub mod reconcile;
pub mod source_text;
pub mod store;
pub mod translation;
pub mod validation;

pub use translation::{TranslationRequest, TranslationService};
