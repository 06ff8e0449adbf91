//! Taco instruction definitions

use crate::sema::SymbolRef;
use crate::types::DataType;
use std::fmt;

/// Address of an instruction: its index in the quad store
pub type Address = usize;

/// Well-known sentinel for a jump target that still awaits backpatching
pub const PENDING: Address = usize::MAX;

/// Binary operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinOp {
    /// Comparisons produce an int flag rather than a value of the promoted
    /// operand type
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge
        )
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        };
        write!(f, "{op}")
    }
}

/// Unary operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Neg => write!(f, "-"),
        }
    }
}

/// One three-address instruction.
///
/// Operands are resolved `{table, entry}` symbol pairs; jump targets are raw
/// instruction addresses, possibly [`PENDING`] until backpatched. The
/// instruction's own address is implicit in its store index.
#[derive(Debug, Clone, PartialEq)]
pub enum Taco {
    /// dst = lhs op rhs
    Binary {
        op: BinOp,
        dst: SymbolRef,
        lhs: SymbolRef,
        rhs: SymbolRef,
    },
    /// dst = op src
    Unary {
        op: UnOp,
        dst: SymbolRef,
        src: SymbolRef,
    },
    /// dst = src
    Copy { dst: SymbolRef, src: SymbolRef },
    /// dst = (to) src
    Convert {
        dst: SymbolRef,
        src: SymbolRef,
        to: DataType,
    },
    /// Unconditional jump
    Goto { target: Address },
    /// Jump when cond is zero
    IfFalse { cond: SymbolRef, target: Address },
    /// Function prologue marker
    Enter { func: SymbolRef },
    /// Push one call argument
    Param { src: SymbolRef },
    /// dst = call func with `args` pushed parameters
    Call {
        dst: Option<SymbolRef>,
        func: SymbolRef,
        args: usize,
    },
    /// Return from the enclosing function
    Return { value: Option<SymbolRef> },
}

impl Taco {
    /// Mutable access to the jump-target slot, for instructions that have
    /// one
    pub fn target_mut(&mut self) -> Option<&mut Address> {
        match self {
            Self::Goto { target } | Self::IfFalse { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<Address> {
        match self {
            Self::Goto { target } | Self::IfFalse { target, .. } => Some(*target),
            _ => None,
        }
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Self::Return { .. })
    }
}
