//! Canonicalization and seal computation
//!
//! The seal binds a Deal's terms, signature, verifications, and
//! confirmation time into one digest that any third party can recompute.
//! Everything that feeds the digest is reduced to a fixed canonical shape
//! first, so independent implementations agree byte-for-byte.

mod seal;

pub use seal::*;
