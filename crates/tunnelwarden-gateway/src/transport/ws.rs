//! WebSocket session handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS
//! - Extract ticket/resource from the query string
//! - Resolve identity and the session's effective restrictions (fixed for
//!   the session's lifetime)
//! - Admission via the connection broker, then relay client <-> upstream
//!   with outbound instructions gated by the filter
//! - Lifecycle: ping/pong + idle timeout; the usage reservation is released
//!   exactly once when the session ends, however it ends

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, Query, State},
    response::Response,
};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use tunnelwarden_core::error::Result;
use tunnelwarden_core::restrict::resolver;

use crate::app_state::AppState;
use crate::connect::GlobalResourceId;
use crate::transport::codec::{self, Inbound};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub ticket: String,
    pub resource: String,
    #[serde(default)]
    pub kind: KindParam,
}

/// Resource kind as it appears in the query string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindParam {
    #[default]
    Connection,
    Group,
}

fn sys_ready_json(user: &str) -> String {
    json!({
        "v": 1,
        "opcode": "ready",
        "args": { "user": user }
    })
    .to_string()
}

fn sys_error_json(code: &str, msg: &str) -> String {
    json!({
        "v": 1,
        "opcode": "error",
        "args": { "code": code, "msg": msg }
    })
    .to_string()
}

pub async fn ws_upgrade(
    State(app): State<AppState>,
    ws: WebSocketUpgrade,
    Query(q): Query<WsQuery>,
) -> Response {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = run_session(app, q, socket).await {
            tracing::debug!(error = %e, "session ended with error");
        }
    })
}

async fn run_session(app: AppState, q: WsQuery, socket: WebSocket) -> Result<()> {
    let (mut ws_tx, mut ws_rx) = socket.split();

    // ---- identity
    let user = match app.identity().resolve_ticket(&q.ticket) {
        Ok(user) => user.clone(),
        Err(e) => {
            let _ = ws_tx
                .send(Message::Text(sys_error_json(e.client_code().as_str(), "auth failed")))
                .await;
            return Err(e);
        }
    };

    app.metrics().ws_upgrades.inc(&[]);

    // ---- effective restrictions, fixed for the session's lifetime.
    // A failed group lookup degrades to the user's own attributes.
    let group_attributes = app.identity().effective_groups(&user).map(|names| {
        app.groups()
            .attribute_maps_for(&names)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>()
    });
    let restrictions = resolver::resolve_degradable(&user.attributes, group_attributes);

    // ---- admission + upstream dial
    let id = match q.kind {
        KindParam::Connection => GlobalResourceId::connection(app.provider(), q.resource.clone()),
        KindParam::Group => GlobalResourceId::connection_group(app.provider(), q.resource.clone()),
    };

    let tunnel = match app.broker().connect(restrictions, id, app.connector()).await {
        Ok(tunnel) => tunnel,
        Err(e) => {
            let _ = ws_tx
                .send(Message::Text(sys_error_json(
                    e.client_code().as_str(),
                    &e.to_string(),
                )))
                .await;
            return Err(e);
        }
    };

    tracing::info!(
        user = %user.username,
        resource = %q.resource,
        restrictions = restrictions.len(),
        "tunnel established"
    );
    app.metrics().tunnels_active.inc(&[]);

    let result = relay(&app, &user.username, tunnel, &mut ws_tx, &mut ws_rx).await;

    app.metrics().tunnels_active.dec(&[]);
    result
}

async fn relay(
    app: &AppState,
    username: &str,
    tunnel: crate::filter::RestrictedTunnel,
    ws_tx: &mut SplitSink<WebSocket, Message>,
    ws_rx: &mut SplitStream<WebSocket>,
) -> Result<()> {
    let (mut reader, mut writer) = tunnel.into_split();

    // ---- upstream -> client pump (unfiltered)
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(1024);
    let pump = tokio::spawn(async move {
        loop {
            match reader.read().await {
                Ok(Some(line)) => {
                    if out_tx.send(Message::Text(line)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "upstream read failed");
                    break;
                }
            }
        }
    });

    if ws_tx
        .send(Message::Text(sys_ready_json(username)))
        .await
        .is_err()
    {
        pump.abort();
        return Ok(());
    }

    // ---- timers
    let gw = &app.cfg().gateway;
    let idle_timeout = Duration::from_millis(gw.idle_timeout_ms);
    let mut ping_tick = tokio::time::interval(Duration::from_millis(gw.ping_interval_ms));
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            // outbound writer (upstream traffic + lifecycle frames)
            maybe_out = out_rx.recv() => {
                match maybe_out {
                    Some(m) => {
                        if ws_tx.send(m).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // inbound reader (client -> upstream, filtered)
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break; };
                let Ok(msg) = incoming else { break; };

                last_activity = Instant::now();

                match codec::decode(msg) {
                    Ok(Inbound::Instruction(frame)) => {
                        if let Err(e) = writer.write(frame).await {
                            tracing::warn!(error = %e, "upstream write failed");
                            break;
                        }
                    }
                    Ok(Inbound::Ping(payload)) => {
                        let _ = ws_tx.send(Message::Pong(payload)).await;
                    }
                    Ok(Inbound::Pong(_)) => {}
                    Ok(Inbound::Close) => break,
                    Err(e) => {
                        app.metrics().decode_errors.inc(&[]);
                        let _ = ws_tx
                            .send(Message::Text(sys_error_json(
                                e.client_code().as_str(),
                                "invalid instruction",
                            )))
                            .await;
                    }
                }
            }

            // ping
            _ = ping_tick.tick() => {
                let _ = ws_tx.send(Message::Ping(Vec::new())).await;
            }

            // idle timeout
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                if last_activity.elapsed() >= idle_timeout {
                    let _ = ws_tx
                        .send(Message::Text(sys_error_json("TIMEOUT", "idle timeout")))
                        .await;
                    break;
                }
            }
        }
    }

    pump.abort();
    let _ = writer.shutdown().await;

    Ok(())
}
