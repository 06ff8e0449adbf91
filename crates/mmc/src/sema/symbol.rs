//! Symbols and per-scope symbol tables

use crate::types::DataType;
use std::fmt;
use thiserror::Error;

/// Error conditions signalled by table operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemaError {
    #[error("'{0}' is already declared in this scope")]
    DuplicateDeclaration(String),
}

/// Initial value of a scalar symbol, tagged by its declared type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InitialValue {
    Char(char),
    Int(i64),
    Real(f64),
}

impl fmt::Display for InitialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "'{c}'"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Real(x) => write!(f, "{x}"),
        }
    }
}

/// Reference to a symbol as a `{table, entry}` index pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolRef {
    pub table: usize,
    pub entry: usize,
}

impl SymbolRef {
    pub fn new(table: usize, entry: usize) -> Self {
        Self { table, entry }
    }
}

/// One declared or synthesized name
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub ty: DataType,
    pub value: Option<InitialValue>,
    pub initialized: bool,
    /// Storage offset within the owning table, finalized at scope close
    pub offset: usize,
    /// Nested scope id when the symbol denotes a structured entity
    pub child: Option<usize>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: DataType) -> Self {
        Self {
            name: name.into(),
            ty,
            value: None,
            initialized: false,
            offset: 0,
            child: None,
        }
    }

    pub fn set_initial(&mut self, value: InitialValue) {
        self.value = Some(value);
        self.initialized = true;
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {} : offset {}", self.name, self.ty, self.offset)?;
        if let Some(value) = &self.value {
            write!(f, " = {value}")?;
        }
        if let Some(child) = self.child {
            write!(f, " -> table #{child}")?;
        }
        Ok(())
    }
}

/// Symbol table of one lexical scope.
///
/// Entries are kept in insertion order; that order determines storage
/// offsets when [`SymbolTable::finalize_offsets`] runs at scope close.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    pub id: usize,
    /// Parent table index; the root table is its own parent
    pub parent: usize,
    pub name: String,
    symbols: Vec<Symbol>,
    /// Total storage size, valid after `finalize_offsets`
    pub size: usize,
}

impl SymbolTable {
    pub fn new(id: usize, parent: usize, name: impl Into<String>) -> Self {
        Self {
            id,
            parent,
            name: name.into(),
            symbols: Vec::new(),
            size: 0,
        }
    }

    /// Append a new symbol, failing if the name is already present.
    /// The existing entry is left untouched on failure.
    pub fn declare(&mut self, name: &str, ty: DataType) -> Result<usize, SemaError> {
        if self.find(name).is_some() {
            return Err(SemaError::DuplicateDeclaration(name.to_string()));
        }
        self.symbols.push(Symbol::new(name, ty));
        Ok(self.symbols.len() - 1)
    }

    /// Entry index of `name`, searching this table only
    pub fn find(&self, name: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s.name == name)
    }

    pub fn get(&self, entry: usize) -> &Symbol {
        &self.symbols[entry]
    }

    pub fn get_mut(&mut self, entry: usize) -> &mut Symbol {
        &mut self.symbols[entry]
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Convert declaration order into layout order: assign each symbol the
    /// running sum of the sizes declared before it. Runs once, at scope
    /// close, so forward references within the scope see stable entries.
    pub fn finalize_offsets(&mut self) {
        let mut offset = 0;
        for symbol in &mut self.symbols {
            symbol.offset = offset;
            offset += symbol.ty.size_of();
        }
        self.size = offset;
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "table #{} ({}) parent #{} size {}",
            self.id, self.name, self.parent, self.size
        )?;
        for symbol in &self.symbols {
            writeln!(f, "  {symbol}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_declaration_keeps_original() {
        let mut table = SymbolTable::new(0, 0, "global");
        table.declare("x", DataType::Int).unwrap();
        let err = table.declare("x", DataType::Real).unwrap_err();
        assert_eq!(err, SemaError::DuplicateDeclaration("x".to_string()));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).ty, DataType::Int);
    }

    #[test]
    fn test_find_is_two_outcome() {
        let mut table = SymbolTable::new(0, 0, "global");
        assert_eq!(table.find("y"), None);
        // a failed find must not have inserted anything
        assert!(table.is_empty());
        table.declare("y", DataType::Char).unwrap();
        assert_eq!(table.find("y"), Some(0));
    }

    #[test]
    fn test_offset_layout() {
        let mut table = SymbolTable::new(0, 0, "global");
        table.declare("c", DataType::Char).unwrap();
        table.declare("i", DataType::Int).unwrap();
        table.declare("r", DataType::Real).unwrap();
        table.declare("m", DataType::matrix(2, 2)).unwrap();
        table.finalize_offsets();

        assert_eq!(table.get(0).offset, 0);
        assert_eq!(table.get(1).offset, 1);
        assert_eq!(table.get(2).offset, 5);
        assert_eq!(table.get(3).offset, 13);
        assert_eq!(table.size, 13 + 32);
    }
}
