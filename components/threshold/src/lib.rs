//! Threshold signature service.
//!
//! A quorum certificate is a set of secp256k1 partial signatures from distinct
//! replicas over the same message hash. [`ThresholdCrypto`] signs on behalf of
//! the local replica, checks single signatures through a registered
//! [`Verifier`] and assembles or verifies quorum certificates against the
//! quorum size reported by a [`Roster`].
//!
//! Aggregation tolerates bad input: duplicate and mistyped signatures are
//! recorded and skipped, invalid ones are silently dropped, and only a missing
//! quorum fails the whole request.

pub use self::{
    cache::SignatureCache,
    config::Config,
    crypto::ThresholdCrypto,
    error::Error,
    verifier::{EcdsaVerifier, Roster, Verifier},
};

mod cache;
mod config;
mod crypto;
mod error;
mod metrics;
pub mod testonly;
mod verifier;
