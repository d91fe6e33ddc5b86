//! Common types, outcome reports, and errors shared across `recover` crates.

pub mod error;
pub mod protocol;

pub use error::{ErrorKind, RecoveryError};
