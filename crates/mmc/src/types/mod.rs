//! The MiniMat type system
//!
//! A small lattice of basic scalar types plus matrices, functions and
//! pointers, used for declaration checking and operand coercion.

mod data_type;

pub use data_type::DataType;
