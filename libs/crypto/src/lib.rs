//! Cryptographic primitives used by the threshold signature service and the twins harness.

pub use fmt::*;

mod fmt;
pub mod keccak256;
pub mod secp256k1;
