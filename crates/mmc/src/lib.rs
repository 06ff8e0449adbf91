//! MiniMat translator - semantic analysis and three-address-code generation
//!
//! This library translates MiniMat source files into a linear
//! three-address-code program while maintaining a hierarchy of lexical
//! scopes and a minimal type system.
//!
//! ## Architecture
//!
//! - **Frontend** (`frontend/`): logos lexer and the recursive-descent
//!   parser that drives the translation core
//! - **Sema** (`sema/`): symbol tables and the scope manager
//! - **IR** (`ir/`): taco instructions and the backpatching quad store
//! - **Types** (`types/`): the promotion lattice
//! - **Translator** (`translator`): the per-file session tying it together
//! - **Common** (`common/`): shared infrastructure (errors, spans)

pub mod common;
pub mod driver;
pub mod frontend;
pub mod ir;
pub mod sema;
pub mod translator;
pub mod types;

// Re-exports for convenience
pub use common::{DiagnosticReporter, Span, TranslateError, TranslateResult};
pub use translator::Translator;
pub use types::DataType;
