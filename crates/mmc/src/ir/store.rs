//! Append-only instruction store with backpatching

use super::taco::{Address, Taco};

/// The generated program: an index-addressed, append-only sequence of
/// instructions. Emission order equals final program order; the only
/// post-emission mutation allowed is patching a jump target.
#[derive(Debug, Default)]
pub struct QuadStore {
    quads: Vec<Taco>,
}

impl QuadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instruction and return its address, the only stable handle
    /// for later patching
    pub fn emit(&mut self, taco: Taco) -> Address {
        self.quads.push(taco);
        self.quads.len() - 1
    }

    /// Address the next emitted instruction will receive
    pub fn next_address(&self) -> Address {
        self.quads.len()
    }

    /// Resolve the jump target of the instruction at `addr`.
    ///
    /// Patching an instruction without a target slot is a caller defect;
    /// the instruction is left untouched.
    pub fn patch(&mut self, addr: Address, target: Address) {
        match self.quads[addr].target_mut() {
            Some(slot) => *slot = target,
            None => debug_assert!(false, "patch on instruction without a jump target"),
        }
    }

    /// Patch every address in `addrs` to the same resolved target; the
    /// standard idiom for a chain of pending exits
    pub fn patch_list(&mut self, addrs: &[Address], target: Address) {
        for &addr in addrs {
            self.patch(addr, target);
        }
    }

    pub fn get(&self, addr: Address) -> &Taco {
        &self.quads[addr]
    }

    pub fn last(&self) -> Option<&Taco> {
        self.quads.last()
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Taco> + ExactSizeIterator {
        self.quads.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::taco::{BinOp, PENDING};
    use crate::sema::SymbolRef;

    fn sym(entry: usize) -> SymbolRef {
        SymbolRef::new(0, entry)
    }

    fn binary(dst: usize) -> Taco {
        Taco::Binary {
            op: BinOp::Add,
            dst: sym(dst),
            lhs: sym(0),
            rhs: sym(1),
        }
    }

    #[test]
    fn test_emit_returns_indices() {
        let mut quads = QuadStore::new();
        assert_eq!(quads.next_address(), 0);
        assert_eq!(quads.emit(binary(2)), 0);
        assert_eq!(quads.emit(binary(3)), 1);
        assert_eq!(quads.next_address(), 2);
    }

    #[test]
    fn test_patch_single() {
        let mut quads = QuadStore::new();
        quads.emit(Taco::Goto { target: PENDING });
        quads.emit(binary(2));
        quads.emit(binary(3));

        quads.patch(0, 2);
        assert_eq!(quads.get(0).target(), Some(2));
        // neighbours untouched
        assert_eq!(*quads.get(1), binary(2));
        assert_eq!(*quads.get(2), binary(3));
    }

    #[test]
    fn test_patch_list_resolves_chain() {
        let mut quads = QuadStore::new();
        quads.emit(Taco::Goto { target: PENDING });
        quads.emit(Taco::IfFalse {
            cond: sym(0),
            target: PENDING,
        });

        quads.patch_list(&[0, 1], 5);
        assert_eq!(quads.get(0).target(), Some(5));
        assert_eq!(quads.get(1).target(), Some(5));
    }
}
