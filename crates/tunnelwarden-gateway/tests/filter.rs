//! Instruction filter tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::Arc;

use common::{frame, MockConnector, RecordingWriter, Transcript};

use tunnelwarden_core::restrict::{Restriction, RestrictionSet};
use tunnelwarden_gateway::connect::{AccessTracker, Connectable, GlobalResourceId, ProviderId};
use tunnelwarden_gateway::filter::{can_write, FilteredWriter, InstructionWriter, RestrictedTunnel};
use tunnelwarden_gateway::obs::GatewayMetrics;

fn read_only() -> RestrictionSet {
    [Restriction::ForceReadOnly].into_iter().collect()
}

#[test]
fn whitelist_is_always_writable() {
    for opcode in ["ack", "disconnect", "nop", "sync"] {
        assert!(can_write(read_only(), opcode), "opcode {opcode:?}");
        assert!(can_write(RestrictionSet::EMPTY, opcode), "opcode {opcode:?}");
    }
}

#[test]
fn interactive_opcodes_blocked_only_under_read_only() {
    for opcode in ["key", "mouse", "clipboard", "size"] {
        assert!(!can_write(read_only(), opcode), "opcode {opcode:?}");
        assert!(can_write(RestrictionSet::EMPTY, opcode), "opcode {opcode:?}");
    }

    // An unrelated restriction does not affect writability.
    let concurrent_only: RestrictionSet = [Restriction::DisallowConcurrent].into_iter().collect();
    assert!(can_write(concurrent_only, "key"));
}

#[tokio::test]
async fn read_only_session_drops_interactive_instructions_silently() {
    let transcript = Transcript::default();
    let metrics = Arc::new(GatewayMetrics::default());
    let mut writer = FilteredWriter::new(
        RecordingWriter {
            transcript: transcript.clone(),
        },
        read_only(),
        Arc::clone(&metrics),
    );

    // Dropped instructions still report success: no error, no substitute.
    writer.write(frame("key")).await.unwrap();
    writer.write(frame("sync")).await.unwrap();
    writer.write(frame("mouse")).await.unwrap();
    writer.write(frame("nop")).await.unwrap();

    let frames = transcript.frames();
    assert_eq!(frames.len(), 2);
    assert!(frames[0].contains("\"sync\""));
    assert!(frames[1].contains("\"nop\""));

    assert_eq!(metrics.instructions.get(&[("action", "dropped")]), 2);
    assert_eq!(metrics.instructions.get(&[("action", "forwarded")]), 2);
}

#[tokio::test]
async fn unrestricted_session_forwards_everything_in_order() {
    let transcript = Transcript::default();
    let metrics = Arc::new(GatewayMetrics::default());
    let mut writer = FilteredWriter::new(
        RecordingWriter {
            transcript: transcript.clone(),
        },
        RestrictionSet::EMPTY,
        metrics,
    );

    for opcode in ["key", "sync", "mouse"] {
        writer.write(frame(opcode)).await.unwrap();
    }

    let frames = transcript.frames();
    assert_eq!(frames.len(), 3);
    assert!(frames[0].contains("\"key\""));
    assert!(frames[1].contains("\"sync\""));
    assert!(frames[2].contains("\"mouse\""));
}

#[tokio::test]
async fn inbound_direction_is_never_filtered() {
    let tracker = AccessTracker::new();
    let id = GlobalResourceId::connection(ProviderId::allocate(), "c1");
    let guard = tracker.try_acquire(id.clone(), false).unwrap();

    let connector = MockConnector {
        transcript: Transcript::default(),
        inbound: vec![
            r#"{"v":1,"opcode":"img","args":{"stream":1}}"#.to_string(),
            r#"{"v":1,"opcode":"blob","args":{"stream":1}}"#.to_string(),
        ],
    };

    let (reader, writer) = connector.connect().await.unwrap();
    let mut tunnel = RestrictedTunnel::new(
        reader,
        writer,
        read_only(),
        guard,
        Arc::new(GatewayMetrics::default()),
    );

    // Resource -> client frames pass through untouched under read-only.
    assert!(tunnel.read().await.unwrap().unwrap().contains("\"img\""));
    assert!(tunnel.read().await.unwrap().unwrap().contains("\"blob\""));
    assert!(tunnel.read().await.unwrap().is_none());

    drop(tunnel);
    assert_eq!(tracker.active(&id), 0);
}

#[tokio::test]
async fn split_tunnel_releases_once_after_both_halves_drop() {
    let tracker = AccessTracker::new();
    let id = GlobalResourceId::connection(ProviderId::allocate(), "c1");
    let guard = tracker.try_acquire(id.clone(), false).unwrap();

    let connector = MockConnector {
        transcript: Transcript::default(),
        inbound: vec![],
    };

    let (reader, writer) = connector.connect().await.unwrap();
    let tunnel = RestrictedTunnel::new(
        reader,
        writer,
        RestrictionSet::EMPTY,
        guard,
        Arc::new(GatewayMetrics::default()),
    );

    let (read_half, write_half) = tunnel.into_split();

    drop(write_half);
    assert_eq!(tracker.active(&id), 1, "reservation held until both halves drop");

    drop(read_half);
    assert_eq!(tracker.active(&id), 0);
}
