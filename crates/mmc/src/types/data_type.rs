//! Data types and the promotion lattice

use std::fmt;

/// Declared type of a symbol or expression
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    /// No value
    Void,
    /// 1-byte character
    Char,
    /// 4-byte integer
    Int,
    /// 8-byte floating point
    Real,
    /// Two-dimensional matrix of a basic element type
    Matrix {
        elem: Box<DataType>,
        rows: usize,
        cols: usize,
    },
    /// Function returning `ret`; never participates in arithmetic
    Function { ret: Box<DataType> },
    /// Pointer to `inner`; never participates in arithmetic
    Pointer(Box<DataType>),
}

impl DataType {
    /// Matrix of reals, the only matrix element type in MiniMat sources
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self::Matrix {
            elem: Box::new(Self::Real),
            rows,
            cols,
        }
    }

    pub fn function(ret: DataType) -> Self {
        Self::Function { ret: Box::new(ret) }
    }

    /// Storage size in bytes, derivable from the variant alone
    pub fn size_of(&self) -> usize {
        match self {
            Self::Void | Self::Function { .. } => 0,
            Self::Char => 1,
            Self::Int => 4,
            Self::Real | Self::Pointer(_) => 8,
            Self::Matrix { elem, rows, cols } => rows * cols * elem.size_of(),
        }
    }

    /// Is this one of the scalar basic types (char, int, real)?
    pub fn is_basic(&self) -> bool {
        matches!(self, Self::Char | Self::Int | Self::Real)
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, Self::Matrix { .. })
    }

    /// Position in the char < int < real ranking
    fn rank(&self) -> Option<u8> {
        match self {
            Self::Char => Some(0),
            Self::Int => Some(1),
            Self::Real => Some(2),
            _ => None,
        }
    }

    /// The wider of two basic types along char < int < real.
    ///
    /// Returns `Void` whenever either side is not a basic scalar type;
    /// matrix operands are outside this function's contract and are handled
    /// by the expression layer.
    pub fn promote(a: &DataType, b: &DataType) -> DataType {
        match (a.rank(), b.rank()) {
            (Some(ra), Some(rb)) => {
                if ra >= rb {
                    a.clone()
                } else {
                    b.clone()
                }
            }
            _ => DataType::Void,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Char => write!(f, "char"),
            Self::Int => write!(f, "int"),
            Self::Real => write!(f, "real"),
            Self::Matrix { elem, rows, cols } => write!(f, "Matrix({rows},{cols}) of {elem}"),
            Self::Function { ret } => write!(f, "function -> {ret}"),
            Self::Pointer(inner) => write!(f, "*{inner}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(DataType::Void.size_of(), 0);
        assert_eq!(DataType::Char.size_of(), 1);
        assert_eq!(DataType::Int.size_of(), 4);
        assert_eq!(DataType::Real.size_of(), 8);
        assert_eq!(DataType::matrix(2, 3).size_of(), 48);
        assert_eq!(DataType::function(DataType::Int).size_of(), 0);
        assert_eq!(DataType::Pointer(Box::new(DataType::Char)).size_of(), 8);
    }

    #[test]
    fn test_promote_ranking() {
        assert_eq!(
            DataType::promote(&DataType::Real, &DataType::Int),
            DataType::Real
        );
        assert_eq!(
            DataType::promote(&DataType::Int, &DataType::Char),
            DataType::Int
        );
        assert_eq!(
            DataType::promote(&DataType::Char, &DataType::Char),
            DataType::Char
        );
    }

    #[test]
    fn test_promote_commutative() {
        let basics = [DataType::Char, DataType::Int, DataType::Real];
        for a in &basics {
            for b in &basics {
                assert_eq!(DataType::promote(a, b), DataType::promote(b, a));
            }
        }
    }

    #[test]
    fn test_promote_non_basic_is_void() {
        let func = DataType::function(DataType::Int);
        assert_eq!(DataType::promote(&func, &DataType::Real), DataType::Void);
        assert_eq!(DataType::promote(&DataType::Real, &func), DataType::Void);
        assert_eq!(
            DataType::promote(&DataType::Void, &DataType::Int),
            DataType::Void
        );
        let ptr = DataType::Pointer(Box::new(DataType::Int));
        assert_eq!(DataType::promote(&ptr, &DataType::Char), DataType::Void);
        assert_eq!(
            DataType::promote(&DataType::matrix(2, 2), &DataType::Real),
            DataType::Void
        );
    }
}
