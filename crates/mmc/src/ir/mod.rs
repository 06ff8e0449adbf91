//! Three-address-code ("taco") intermediate representation
//!
//! Instructions are addressed by their index in the append-only
//! [`QuadStore`]; forward jump targets are emitted as [`PENDING`] and fixed
//! up later by backpatching.

mod store;
mod taco;

pub use store::QuadStore;
pub use taco::{Address, BinOp, Taco, UnOp, PENDING};
