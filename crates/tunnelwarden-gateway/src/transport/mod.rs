//! Transport layer: client-facing WebSocket sessions and the upstream leg.

pub mod codec;
pub mod upstream;
pub mod ws;
