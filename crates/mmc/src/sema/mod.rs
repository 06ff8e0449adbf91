//! Symbol tables and scope management
//!
//! One [`SymbolTable`] per lexical scope, held in an index-linked store
//! owned by the [`ScopeManager`]. Symbols are addressed from outside by
//! `{table, entry}` pairs ([`SymbolRef`]) so that instructions can keep
//! referring to symbols of scopes that have already been exited.

mod scope;
mod symbol;

pub use scope::ScopeManager;
pub use symbol::{InitialValue, SemaError, Symbol, SymbolRef, SymbolTable};
