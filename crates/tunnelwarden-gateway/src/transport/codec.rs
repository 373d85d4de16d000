//! Decode-once codec for the client-facing transport.
//!
//! Text frames carry instruction envelopes; the decoded frame keeps its
//! original text so forwarding never re-serializes. Ping/Pong/Close are
//! surfaced for lifecycle management. The session protocol has no binary
//! frames.

use axum::extract::ws::Message;
use tunnelwarden_core::{
    error::{Result, WardenError},
    protocol::instruction::Frame,
};

#[derive(Debug)]
pub enum Inbound {
    Instruction(Frame),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

pub fn decode(msg: Message) -> Result<Inbound> {
    match msg {
        Message::Text(s) => Ok(Inbound::Instruction(Frame::parse(s)?)),
        Message::Binary(_) => Err(WardenError::BadRequest(
            "binary frames are not part of the session protocol".into(),
        )),
        Message::Ping(v) => Ok(Inbound::Ping(v)),
        Message::Pong(v) => Ok(Inbound::Pong(v)),
        Message::Close(_) => Ok(Inbound::Close),
    }
}
