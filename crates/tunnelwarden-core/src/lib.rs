//! tunnelWarden core: restriction taxonomy, instruction envelope, and error
//! types.
//!
//! This crate defines the restriction catalog and its resolution rules, the
//! framed-instruction contract shared by the gateway and its tests, and the
//! error surface. It intentionally carries no transport or runtime
//! dependencies so it can be reused in multiple contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `WardenError`/`Result` so production
//! processes do not crash on malformed input or bad traffic.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;
pub mod restrict;

/// Shared result type.
pub use error::{Result, WardenError};
