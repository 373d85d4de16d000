//! Top-level facade crate for tunnelWarden.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use tunnelwarden_core::*;
}

pub mod gateway {
    pub use tunnelwarden_gateway::*;
}
