//! Protocol module (framed session instructions).
//!
//! An instruction is the discrete unit of the interactive session protocol:
//! an opcode plus an opaque argument payload. The gateway only inspects
//! opcodes; argument payloads are carried as raw JSON and are never
//! re-framed or mutated in flight.
//!
//! All parsers are panic-free: malformed input is reported as `WardenError`
//! instead of panicking, keeping the gateway resilient to hostile traffic.

pub mod instruction;
