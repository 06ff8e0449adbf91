//! Scope manager: the index-linked store of symbol tables plus the stack
//! of currently open scopes

use super::symbol::{SemaError, Symbol, SymbolRef, SymbolTable};
use crate::types::DataType;

/// Owns every symbol table of one translation run.
///
/// Tables are linked by parent *indices*, never references, so a
/// `SymbolRef` stays valid after its scope has been exited. Exited tables
/// are kept for the rest of the run; only membership of the stack decides
/// which scope is active.
#[derive(Debug, Default)]
pub struct ScopeManager {
    tables: Vec<SymbolTable>,
    stack: Vec<usize>,
}

impl ScopeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new scope under the currently active one and make it active.
    /// The very first call creates the global scope, which is its own
    /// parent.
    pub fn enter_scope(&mut self, name: &str) -> usize {
        let id = self.tables.len();
        let parent = self.stack.last().copied().unwrap_or(id);
        self.tables.push(SymbolTable::new(id, parent, name));
        self.stack.push(id);
        id
    }

    /// Close the active scope, finalizing its member offsets first.
    /// Returns the closed scope's id, or `None` on an unbalanced call.
    pub fn exit_scope(&mut self) -> Option<usize> {
        let id = self.stack.pop()?;
        self.tables[id].finalize_offsets();
        Some(id)
    }

    /// Declare `name` in the table identified by `scope`
    pub fn declare(
        &mut self,
        name: &str,
        ty: DataType,
        scope: usize,
    ) -> Result<SymbolRef, SemaError> {
        let entry = self.tables[scope].declare(name, ty)?;
        Ok(SymbolRef::new(scope, entry))
    }

    /// Look `name` up in the given table only; no walk to parent scopes,
    /// no insertion on a miss
    pub fn lookup(&self, name: &str, scope: usize) -> Option<SymbolRef> {
        self.tables[scope]
            .find(name)
            .map(|entry| SymbolRef::new(scope, entry))
    }

    /// Id of the active scope; 0 (the global table) when nothing is open
    pub fn current_scope_id(&self) -> usize {
        self.stack.last().copied().unwrap_or(0)
    }

    pub fn current_table(&self) -> &SymbolTable {
        &self.tables[self.current_scope_id()]
    }

    pub fn table(&self, id: usize) -> &SymbolTable {
        &self.tables[id]
    }

    pub fn table_mut(&mut self, id: usize) -> &mut SymbolTable {
        &mut self.tables[id]
    }

    pub fn global_table(&self) -> &SymbolTable {
        &self.tables[0]
    }

    /// Dereference a `{table, entry}` pair
    pub fn symbol(&self, sym: SymbolRef) -> &Symbol {
        self.tables[sym.table].get(sym.entry)
    }

    pub fn symbol_mut(&mut self, sym: SymbolRef) -> &mut Symbol {
        self.tables[sym.table].get_mut(sym.entry)
    }

    /// Number of scopes still open; must be zero at the end of a balanced
    /// run
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn tables(&self) -> &[SymbolTable] {
        &self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_its_own_parent() {
        let mut scopes = ScopeManager::new();
        let global = scopes.enter_scope("global");
        assert_eq!(global, 0);
        assert_eq!(scopes.table(global).parent, global);
    }

    #[test]
    fn test_nesting_links_parents() {
        let mut scopes = ScopeManager::new();
        let global = scopes.enter_scope("global");
        let inner = scopes.enter_scope("f");
        assert_eq!(scopes.table(inner).parent, global);
        assert_eq!(scopes.current_scope_id(), inner);

        assert_eq!(scopes.exit_scope(), Some(inner));
        assert_eq!(scopes.current_scope_id(), global);
        // the exited table is still addressable
        assert_eq!(scopes.table(inner).name, "f");
    }

    #[test]
    fn test_exit_finalizes_offsets() {
        let mut scopes = ScopeManager::new();
        let global = scopes.enter_scope("global");
        scopes.declare("a", DataType::Int, global).unwrap();
        scopes.declare("b", DataType::Real, global).unwrap();
        scopes.declare("c", DataType::Char, global).unwrap();
        scopes.exit_scope();

        let table = scopes.table(global);
        assert_eq!(table.get(0).offset, 0);
        assert_eq!(table.get(1).offset, 4);
        assert_eq!(table.get(2).offset, 12);
        assert_eq!(table.size, 13);
        assert_eq!(scopes.depth(), 0);
    }

    #[test]
    fn test_duplicate_declare_signals_and_preserves() {
        let mut scopes = ScopeManager::new();
        let global = scopes.enter_scope("global");
        scopes.declare("x", DataType::Int, global).unwrap();
        let err = scopes.declare("x", DataType::Real, global).unwrap_err();
        assert_eq!(err, SemaError::DuplicateDeclaration("x".to_string()));
        assert_eq!(scopes.table(global).len(), 1);
        assert_eq!(scopes.table(global).get(0).ty, DataType::Int);
    }

    #[test]
    fn test_lookup_is_scope_local() {
        let mut scopes = ScopeManager::new();
        let global = scopes.enter_scope("global");
        scopes.declare("x", DataType::Int, global).unwrap();
        let inner = scopes.enter_scope("block");

        assert_eq!(scopes.lookup("x", inner), None);
        let found = scopes.lookup("x", global).unwrap();
        assert_eq!(scopes.symbol(found).name, "x");
    }

    #[test]
    fn test_unbalanced_exit_is_reported() {
        let mut scopes = ScopeManager::new();
        scopes.enter_scope("global");
        assert!(scopes.exit_scope().is_some());
        assert_eq!(scopes.exit_scope(), None);
    }
}
