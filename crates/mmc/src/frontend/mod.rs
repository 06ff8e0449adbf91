//! MiniMat frontend: logos lexer and the recursive-descent parser that
//! drives the translation core
//!
//! Translation is syntax-directed: there is no AST. As productions are
//! recognized the parser calls straight into the session's scope manager,
//! temporary allocator and quad store.

mod parser;
mod scanner;
mod token;

pub use parser::Parser;
pub use scanner::Scanner;
pub use token::{Token, TokenKind};
