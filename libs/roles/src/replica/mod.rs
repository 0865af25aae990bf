//! Replica role implementation.

mod committee;
mod keys;
mod messages;
mod signatures;
pub mod testonly;

pub use self::{committee::*, keys::*, messages::*, signatures::*};
