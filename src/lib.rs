pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod protocol;
pub mod services;
pub mod text;

pub use error::{CoreError, CoreResult};
