//! Common infrastructure shared across the frontend and the translation core

mod error;
mod span;

pub use error::{DiagnosticReporter, TranslateError, TranslateResult};
pub use span::Span;
