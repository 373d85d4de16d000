//! Live instruction filtering for established tunnels.
//!
//! The filter wraps the two halves of an already-open session stream. Each
//! outbound (client -> resource) instruction is independently forwarded or
//! silently dropped; the inbound direction always passes through. Decisions
//! depend only on the instruction's opcode and the session's fixed
//! restriction set: no state is kept across instructions, no buffering or
//! reordering is introduced, and a forwarded instruction is transmitted
//! exactly as it arrived.

use std::sync::Arc;

use async_trait::async_trait;

use tunnelwarden_core::error::Result;
use tunnelwarden_core::protocol::instruction::Frame;
use tunnelwarden_core::restrict::{Restriction, RestrictionSet};

use crate::connect::tracker::AccessGuard;
use crate::obs::GatewayMetrics;

/// Opcodes of all instructions which are safe to transmit even for sessions
/// restricted to read-only access.
///
/// "ack" acknowledges receipt of streams (image/audio rendering depends on
/// it), "disconnect" signals a normal client disconnect, "nop" is a
/// keep-alive ping, and "sync" tells the server a frame was fully processed
/// so it can adjust frame timing. None of them allow interaction with the
/// remote resource.
pub const OPCODE_WHITELIST: [&str; 4] = ["ack", "disconnect", "nop", "sync"];

/// Whether a session with the given restrictions may write an instruction
/// with the given opcode.
pub fn can_write(restrictions: RestrictionSet, opcode: &str) -> bool {
    // Always allow universally whitelisted instructions
    if OPCODE_WHITELIST.contains(&opcode) {
        return true;
    }

    // Otherwise, allow instructions through only if the session is not
    // subject to read-only restrictions
    !restrictions.contains(Restriction::ForceReadOnly)
}

/// Outbound half of a session stream.
#[async_trait]
pub trait InstructionWriter: Send {
    /// Transmit one framed instruction to the resource.
    async fn write(&mut self, frame: Frame) -> Result<()>;

    /// Close the outbound half.
    async fn shutdown(&mut self) -> Result<()>;
}

/// Inbound half of a session stream. Frames travel resource -> client and
/// are never filtered, so they stay raw text.
#[async_trait]
pub trait InstructionReader: Send {
    /// Next framed instruction from the resource; `None` on clean close.
    async fn read(&mut self) -> Result<Option<String>>;
}

#[async_trait]
impl<W: InstructionWriter + ?Sized> InstructionWriter for Box<W> {
    async fn write(&mut self, frame: Frame) -> Result<()> {
        (**self).write(frame).await
    }

    async fn shutdown(&mut self) -> Result<()> {
        (**self).shutdown().await
    }
}

/// An [`InstructionWriter`] that drops instructions the session's
/// restrictions prohibit. Dropped instructions get no error and no
/// substitute: the client-side protocol tolerates instructions that receive
/// no reaction.
pub struct FilteredWriter<W> {
    inner: W,
    restrictions: RestrictionSet,
    metrics: Arc<GatewayMetrics>,
}

impl<W> FilteredWriter<W> {
    pub fn new(inner: W, restrictions: RestrictionSet, metrics: Arc<GatewayMetrics>) -> Self {
        Self {
            inner,
            restrictions,
            metrics,
        }
    }
}

#[async_trait]
impl<W: InstructionWriter> InstructionWriter for FilteredWriter<W> {
    async fn write(&mut self, frame: Frame) -> Result<()> {
        if !can_write(self.restrictions, frame.opcode()) {
            tracing::debug!(opcode = %frame.opcode(), "instruction dropped by restriction");
            self.metrics.instructions.inc(&[("action", "dropped")]);
            return Ok(());
        }

        self.metrics.instructions.inc(&[("action", "forwarded")]);
        self.inner.write(frame).await
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.inner.shutdown().await
    }
}

/// An established tunnel with restriction enforcement applied: outbound
/// writes are filtered, inbound reads pass through, and the usage
/// reservation taken at admission is released exactly once when the tunnel
/// is closed or dropped.
pub struct RestrictedTunnel {
    reader: Box<dyn InstructionReader>,
    writer: FilteredWriter<Box<dyn InstructionWriter>>,
    _guard: AccessGuard,
}

impl std::fmt::Debug for RestrictedTunnel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestrictedTunnel").finish_non_exhaustive()
    }
}

impl RestrictedTunnel {
    pub fn new(
        reader: Box<dyn InstructionReader>,
        writer: Box<dyn InstructionWriter>,
        restrictions: RestrictionSet,
        guard: AccessGuard,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            reader,
            writer: FilteredWriter::new(writer, restrictions, metrics),
            _guard: guard,
        }
    }

    /// Forward one client instruction toward the resource, subject to the
    /// session's restrictions.
    pub async fn write(&mut self, frame: Frame) -> Result<()> {
        self.writer.write(frame).await
    }

    /// Receive the next instruction from the resource, unfiltered.
    pub async fn read(&mut self) -> Result<Option<String>> {
        self.reader.read().await
    }

    /// Close the tunnel. The underlying stream is shut down and the usage
    /// reservation is released (also guaranteed if the tunnel is simply
    /// dropped after a transport failure).
    pub async fn close(mut self) -> Result<()> {
        self.writer.shutdown().await
    }

    /// Split into independently driven halves so the two directions can be
    /// pumped from separate tasks. The reservation is released once both
    /// halves are gone, still exactly once per tunnel.
    pub fn into_split(self) -> (RestrictedReader, RestrictedWriter) {
        let guard = Arc::new(self._guard);
        (
            RestrictedReader {
                inner: self.reader,
                _guard: Arc::clone(&guard),
            },
            RestrictedWriter {
                inner: self.writer,
                _guard: guard,
            },
        )
    }
}

/// Inbound half of a split tunnel (resource -> client, unfiltered).
pub struct RestrictedReader {
    inner: Box<dyn InstructionReader>,
    _guard: Arc<AccessGuard>,
}

impl RestrictedReader {
    pub async fn read(&mut self) -> Result<Option<String>> {
        self.inner.read().await
    }
}

/// Outbound half of a split tunnel (client -> resource, filtered).
pub struct RestrictedWriter {
    inner: FilteredWriter<Box<dyn InstructionWriter>>,
    _guard: Arc<AccessGuard>,
}

impl RestrictedWriter {
    pub async fn write(&mut self, frame: Frame) -> Result<()> {
        self.inner.write(frame).await
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.inner.shutdown().await
    }
}
