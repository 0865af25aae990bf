//! Types describing the replica role of the protocol.
//!
//! A replica is a member of the committee: it holds a secp256k1 key, signs
//! votes with it and checks the quorum certificates of others. Everything the
//! threshold signature service and the twins network exchange is defined here.

pub mod replica;
