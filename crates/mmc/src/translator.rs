//! The translation session
//!
//! One `Translator` per input file. It owns all mutable state of a run:
//! the scope manager, the quad store, the temporary counter, the
//! type-context stack and the diagnostic sink. Concurrent translation of
//! several files uses independent sessions; nothing here is shared.

use crate::common::{DiagnosticReporter, Span, TranslateError};
use crate::ir::{QuadStore, Taco, PENDING};
use crate::sema::{ScopeManager, Symbol, SymbolRef};
use crate::types::DataType;
use std::fmt::Write as _;

pub struct Translator {
    pub file: String,
    file_id: usize,
    reporter: DiagnosticReporter,
    pub scopes: ScopeManager,
    pub quads: QuadStore,
    /// Type of the object being declared, pushed on declaration entry
    pub type_context: Vec<DataType>,
    temp_count: u32,
    errors: usize,
}

impl Translator {
    /// Start a fresh session for `file`, opening the global scope
    pub fn new(file: impl Into<String>, source: &str) -> Self {
        let file = file.into();
        let mut reporter = DiagnosticReporter::new();
        let file_id = reporter.add_file(file.clone(), source);
        let mut scopes = ScopeManager::new();
        scopes.enter_scope("global");
        Self {
            file,
            file_id,
            reporter,
            scopes,
            quads: QuadStore::new(),
            type_context: Vec::new(),
            temp_count: 0,
            errors: 0,
        }
    }

    // ==================== diagnostic sink ====================

    /// Report a source-location-tagged message and mark the run failed
    pub fn error_at(&mut self, span: Span, message: &str) {
        self.reporter.report_at(self.file_id, span, message);
        self.errors += 1;
    }

    /// Report a bare message and mark the run failed
    pub fn error(&mut self, message: &str) {
        self.reporter.report(self.file_id, message);
        self.errors += 1;
    }

    /// Report a translation error through the sink
    pub fn report(&mut self, error: &TranslateError) {
        self.reporter.report_error(self.file_id, error);
        self.errors += 1;
    }

    pub fn failed(&self) -> bool {
        self.errors > 0
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    // ==================== temporary allocation ====================

    /// Synthesize a fresh temporary of `ty` in the current scope
    pub fn gen_temp(&mut self, ty: DataType) -> SymbolRef {
        let scope = self.scopes.current_scope_id();
        self.gen_temp_in(scope, ty)
    }

    /// Synthesize a fresh temporary of `ty` in the given scope
    pub fn gen_temp_in(&mut self, scope: usize, ty: DataType) -> SymbolRef {
        let name = format!("${}", self.temp_count);
        self.temp_count += 1;
        // '$' is not a legal identifier character in MiniMat and the
        // counter is never reset, so the name cannot collide
        self.scopes
            .declare(&name, ty, scope)
            .expect("temporary name collided with an existing symbol")
    }

    /// Was this symbol synthesized by the temporary allocator?
    pub fn is_temporary(&self, sym: SymbolRef) -> bool {
        self.scopes.symbol(sym).name.starts_with('$')
    }

    pub fn symbol(&self, sym: SymbolRef) -> &Symbol {
        self.scopes.symbol(sym)
    }

    // ==================== pretty printing ====================

    fn operand(&self, sym: SymbolRef) -> &str {
        &self.scopes.symbol(sym).name
    }

    fn render_target(target: usize) -> String {
        if target == PENDING {
            "_".to_string()
        } else {
            target.to_string()
        }
    }

    /// Render the generated program, one addressed instruction per line
    pub fn dump_tacos(&self) -> String {
        let mut out = String::new();
        for (addr, taco) in self.quads.iter().enumerate() {
            let line = match taco {
                Taco::Binary { op, dst, lhs, rhs } => format!(
                    "{} = {} {} {}",
                    self.operand(*dst),
                    self.operand(*lhs),
                    op,
                    self.operand(*rhs)
                ),
                Taco::Unary { op, dst, src } => {
                    format!("{} = {} {}", self.operand(*dst), op, self.operand(*src))
                }
                Taco::Copy { dst, src } => {
                    format!("{} = {}", self.operand(*dst), self.operand(*src))
                }
                Taco::Convert { dst, src, to } => {
                    format!("{} = ({}) {}", self.operand(*dst), to, self.operand(*src))
                }
                Taco::Goto { target } => format!("goto {}", Self::render_target(*target)),
                Taco::IfFalse { cond, target } => format!(
                    "ifFalse {} goto {}",
                    self.operand(*cond),
                    Self::render_target(*target)
                ),
                Taco::Enter { func } => format!("enter {}", self.operand(*func)),
                Taco::Param { src } => format!("param {}", self.operand(*src)),
                Taco::Call { dst, func, args } => match dst {
                    Some(dst) => format!(
                        "{} = call {}, {}",
                        self.operand(*dst),
                        self.operand(*func),
                        args
                    ),
                    None => format!("call {}, {}", self.operand(*func), args),
                },
                Taco::Return { value } => match value {
                    Some(value) => format!("return {}", self.operand(*value)),
                    None => "return".to_string(),
                },
            };
            let _ = writeln!(out, "{addr:>4} : {line}");
        }
        out
    }

    /// Render every symbol table of the run
    pub fn dump_symbols(&self) -> String {
        let mut out = String::new();
        for table in self.scopes.tables() {
            let _ = write!(out, "{table}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Translator {
        Translator::new("test.mm", "")
    }

    #[test]
    fn test_temporaries_never_collide() {
        let mut tr = session();
        let a = tr.gen_temp(DataType::Int);
        let b = tr.gen_temp(DataType::Real);
        assert_ne!(tr.symbol(a).name, tr.symbol(b).name);
        assert!(tr.is_temporary(a));
        assert!(tr.is_temporary(b));
    }

    #[test]
    fn test_user_symbol_is_not_temporary() {
        let mut tr = session();
        let scope = tr.scopes.current_scope_id();
        let user = tr.scopes.declare("x", DataType::Int, scope).unwrap();
        assert!(!tr.is_temporary(user));
    }

    #[test]
    fn test_temporaries_in_chosen_scope() {
        let mut tr = session();
        let inner = tr.scopes.enter_scope("block");
        let t = tr.gen_temp_in(0, DataType::Int);
        assert_eq!(t.table, 0);
        assert_eq!(tr.scopes.table(inner).len(), 0);
    }

    #[test]
    fn test_errors_mark_failure_without_abort() {
        let mut tr = session();
        assert!(!tr.failed());
        tr.error("something went wrong");
        tr.error_at(Span::new(0, 1), "and here too");
        assert!(tr.failed());
        assert_eq!(tr.error_count(), 2);
    }

    #[test]
    fn test_dump_renders_pending_targets() {
        let mut tr = session();
        let t = tr.gen_temp(DataType::Int);
        tr.quads.emit(Taco::IfFalse {
            cond: t,
            target: PENDING,
        });
        let dump = tr.dump_tacos();
        assert!(dump.contains("ifFalse $0 goto _"));
    }
}
