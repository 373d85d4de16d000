//! Upstream leg: TCP connection to the remote-session broker.
//!
//! Instructions travel as newline-delimited envelope text. The connector is
//! the gateway's [`Connectable`] implementation; everything above it only
//! sees the reader/writer seam.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use tunnelwarden_core::error::{Result, WardenError};
use tunnelwarden_core::protocol::instruction::Frame;

use crate::config::schema::UpstreamSection;
use crate::connect::Connectable;
use crate::filter::{InstructionReader, InstructionWriter};

/// Dials the configured broker address for each new tunnel.
pub struct TcpConnector {
    addr: String,
    connect_timeout: Duration,
}

impl TcpConnector {
    pub fn from_config(cfg: &UpstreamSection) -> Self {
        Self {
            addr: cfg.addr.clone(),
            connect_timeout: Duration::from_millis(cfg.connect_timeout_ms),
        }
    }
}

#[async_trait]
impl Connectable for TcpConnector {
    async fn connect(&self) -> Result<(Box<dyn InstructionReader>, Box<dyn InstructionWriter>)> {
        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| WardenError::Internal(format!("upstream connect timed out: {}", self.addr)))?
            .map_err(|e| WardenError::Internal(format!("upstream connect failed: {e}")))?;

        let (read_half, write_half) = stream.into_split();
        Ok((
            Box::new(UpstreamReader {
                lines: BufReader::new(read_half).lines(),
            }),
            Box::new(UpstreamWriter { inner: write_half }),
        ))
    }
}

struct UpstreamReader {
    lines: Lines<BufReader<OwnedReadHalf>>,
}

#[async_trait]
impl InstructionReader for UpstreamReader {
    async fn read(&mut self) -> Result<Option<String>> {
        self.lines
            .next_line()
            .await
            .map_err(|e| WardenError::Internal(format!("upstream read failed: {e}")))
    }
}

struct UpstreamWriter {
    inner: OwnedWriteHalf,
}

#[async_trait]
impl InstructionWriter for UpstreamWriter {
    async fn write(&mut self, frame: Frame) -> Result<()> {
        let mut line = frame.into_raw();
        line.push('\n');
        self.inner
            .write_all(line.as_bytes())
            .await
            .map_err(|e| WardenError::Internal(format!("upstream write failed: {e}")))
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.inner
            .shutdown()
            .await
            .map_err(|e| WardenError::Internal(format!("upstream shutdown failed: {e}")))
    }
}
