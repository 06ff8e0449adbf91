//! Error types and diagnostic reporting

use super::Span;
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use std::io::Write;
use thiserror::Error;

/// Translation error with source location
#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("lexical error at {span:?}: {message}")]
    Lexer { message: String, span: Span },

    #[error("syntax error at {span:?}: {message}")]
    Parser { message: String, span: Span },

    #[error("semantic error at {span:?}: {message}")]
    Semantic { message: String, span: Span },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranslateError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            span,
        }
    }

    pub fn semantic(message: impl Into<String>, span: Span) -> Self {
        Self::Semantic {
            message: message.into(),
            span,
        }
    }

    /// The source span this error points at, if it carries one
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer { span, .. } | Self::Parser { span, .. } | Self::Semantic { span, .. } => {
                Some(*span)
            }
            Self::Io(_) => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Lexer { message, .. }
            | Self::Parser { message, .. }
            | Self::Semantic { message, .. } => message.clone(),
            Self::Io(err) => err.to_string(),
        }
    }
}

pub type TranslateResult<T> = Result<T, TranslateError>;

/// Diagnostic reporter writing `<file> : <line>:<col> : <message>` lines
/// to the error stream
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(ColorChoice::Auto),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    fn file_name(&self, file_id: usize) -> String {
        self.files
            .get(file_id)
            .map(|f| f.name().clone())
            .unwrap_or_default()
    }

    /// Report a message tagged with a source location
    pub fn report_at(&self, file_id: usize, span: Span, message: &str) {
        let name = self.file_name(file_id);
        let mut out = self.writer.lock();
        match self.files.location(file_id, span.start) {
            Ok(loc) => {
                let _ = writeln!(
                    out,
                    "{} : {}:{} : {}",
                    name, loc.line_number, loc.column_number, message
                );
            }
            Err(_) => {
                let _ = writeln!(out, "{} : {}", name, message);
            }
        }
    }

    /// Report a bare message with no location
    pub fn report(&self, file_id: usize, message: &str) {
        let name = self.file_name(file_id);
        let mut out = self.writer.lock();
        let _ = writeln!(out, "{} : {}", name, message);
    }

    /// Report a translation error, using its span when it has one
    pub fn report_error(&self, file_id: usize, error: &TranslateError) {
        match error.span() {
            Some(span) => self.report_at(file_id, span, &error.message()),
            None => self.report(file_id, &error.message()),
        }
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}
