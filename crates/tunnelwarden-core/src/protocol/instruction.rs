//! Instruction envelope (JSON).
//!
//! The envelope stores `args` as `RawValue` so the gateway can route on the
//! opcode without parsing (or reserializing) the argument payload. The
//! original frame text is what gets forwarded; the decoded envelope exists
//! only for inspection.

use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::{Result, WardenError};

/// Supported envelope version.
pub const PROTOCOL_VERSION: u8 = 1;

/// A single framed instruction on an established session stream.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Instruction {
    /// Protocol version.
    pub v: u8,
    /// Instruction opcode (e.g., "key", "mouse", "sync").
    pub opcode: String,
    /// Optional argument payload, stored as raw JSON (never parsed here).
    #[serde(default)]
    pub args: Option<Box<RawValue>>,
}

/// Decode an instruction from a text frame.
pub fn decode(frame: &str) -> Result<Instruction> {
    let ins: Instruction = serde_json::from_str(frame)
        .map_err(|e| WardenError::BadRequest(format!("invalid instruction json: {e}")))?;

    if ins.v != PROTOCOL_VERSION {
        return Err(WardenError::UnsupportedVersion);
    }

    if ins.opcode.is_empty() {
        return Err(WardenError::BadRequest("empty opcode".into()));
    }

    Ok(ins)
}

/// A decoded instruction together with its original framing. Forwarding
/// always uses the original text, so an instruction that passes inspection
/// reaches the other side byte for byte as it arrived.
#[derive(Debug)]
pub struct Frame {
    raw: String,
    ins: Instruction,
}

impl Frame {
    /// Decode-once constructor.
    pub fn parse(raw: String) -> Result<Frame> {
        let ins = decode(&raw)?;
        Ok(Frame { raw, ins })
    }

    pub fn opcode(&self) -> &str {
        &self.ins.opcode
    }

    pub fn instruction(&self) -> &Instruction {
        &self.ins
    }

    /// The exact text as received.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn into_raw(self) -> String {
        self.raw
    }
}
