//! Shared mocks for gateway integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use tunnelwarden_core::error::{Result, WardenError};
use tunnelwarden_core::protocol::instruction::Frame;
use tunnelwarden_gateway::connect::Connectable;
use tunnelwarden_gateway::filter::{InstructionReader, InstructionWriter};

/// Records every frame transmitted toward the (mock) resource.
#[derive(Clone, Default)]
pub struct Transcript(Arc<Mutex<Vec<String>>>);

impl Transcript {
    pub fn frames(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, frame: String) {
        self.0.lock().unwrap().push(frame);
    }
}

/// Replays a fixed sequence of inbound frames, then reports a clean close.
pub struct ScriptedReader {
    lines: Vec<String>,
}

#[async_trait]
impl InstructionReader for ScriptedReader {
    async fn read(&mut self) -> Result<Option<String>> {
        if self.lines.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.lines.remove(0)))
        }
    }
}

pub struct RecordingWriter {
    pub transcript: Transcript,
}

#[async_trait]
impl InstructionWriter for RecordingWriter {
    async fn write(&mut self, frame: Frame) -> Result<()> {
        self.transcript.push(frame.into_raw());
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Connectable that always succeeds, wiring the scripted inbound frames and
/// the shared transcript.
pub struct MockConnector {
    pub transcript: Transcript,
    pub inbound: Vec<String>,
}

#[async_trait]
impl Connectable for MockConnector {
    async fn connect(&self) -> Result<(Box<dyn InstructionReader>, Box<dyn InstructionWriter>)> {
        Ok((
            Box::new(ScriptedReader {
                lines: self.inbound.clone(),
            }),
            Box::new(RecordingWriter {
                transcript: self.transcript.clone(),
            }),
        ))
    }
}

/// Connectable whose dial always fails.
pub struct FailingConnector;

#[async_trait]
impl Connectable for FailingConnector {
    async fn connect(&self) -> Result<(Box<dyn InstructionReader>, Box<dyn InstructionWriter>)> {
        Err(WardenError::Internal("dial failed".into()))
    }
}

pub fn frame(opcode: &str) -> Frame {
    Frame::parse(format!(r#"{{"v":1,"opcode":"{opcode}"}}"#)).unwrap()
}
