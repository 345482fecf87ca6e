//! WebSocket upgrade handler.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use sidechain_realtime::connection::authenticator::{AuthenticatedConnection, WsAuthenticator};
use sidechain_realtime::connection::handle::ConnectionHandle;
use sidechain_realtime::{ClientSession, OutboundMessage};

use crate::error::ApiResult;
use crate::extractors::bearer_token;
use crate::state::AppState;

/// Query parameters accepted on the upgrade request.
#[derive(Debug, Default, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token. Falls back to the `Authorization` header.
    pub token: Option<String>,
}

/// GET /ws?token={jwt}
///
/// Authentication happens before the upgrade; a bad token gets a plain
/// 401 and no socket is registered.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let header_token = bearer_token(&headers);
    let token = query.token.as_deref().or(header_token.as_deref());
    let authenticator = WsAuthenticator::new(state.jwt_decoder.clone());
    let auth = authenticator.authenticate(token).await?;

    Ok(ws.on_upgrade(move |socket| handle_socket(state, auth, socket)))
}

/// Drives one established connection until either side closes.
async fn handle_socket(state: AppState, auth: AuthenticatedConnection, socket: WebSocket) {
    let registration = match state.engine.connect(auth.user_id, auth.username.clone()).await {
        Ok(registration) => registration,
        Err(e) => {
            warn!(user_id = %auth.user_id, error = %e, "Rejecting socket");
            return;
        }
    };
    let handle = registration.handle;
    let conn_id = handle.id;

    info!(
        conn_id = %conn_id,
        user_id = %auth.user_id,
        evicted = registration.evicted.is_some(),
        "WebSocket connection established"
    );

    let (ws_tx, mut ws_rx) = socket.split();
    let keepalive = Keepalive {
        ping_every: Duration::from_secs(state.config.realtime.ping_interval_seconds.max(1)),
        pong_timeout: Duration::from_secs(state.config.realtime.pong_timeout_seconds),
    };
    let writer = tokio::spawn(write_loop(
        ws_tx,
        registration.receiver,
        handle.clone(),
        keepalive,
    ));

    let mut session = ClientSession::new(state.engine.clone(), handle.clone());
    loop {
        tokio::select! {
            _ = handle.closed() => break,
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => session.on_text(text.as_str()).await,
                Some(Ok(Message::Pong(_) | Message::Ping(_))) => session.on_pong(),
                Some(Ok(Message::Binary(_))) => {
                    handle.try_deliver(OutboundMessage::error(
                        "invalid_message",
                        "Binary frames are not supported",
                    ));
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    debug!(conn_id = %conn_id, error = %e, "WebSocket read error");
                    break;
                }
            }
        }
    }

    // Ask the writer to flush what is queued and send a close frame.
    handle.close();
    let drain = Duration::from_secs(state.config.realtime.drain_timeout_seconds);
    if tokio::time::timeout(drain, writer).await.is_err() {
        warn!(conn_id = %conn_id, "Writer did not finish within drain timeout");
    }
    session.close().await;

    info!(
        conn_id = %conn_id,
        user_id = %auth.user_id,
        "WebSocket connection closed"
    );
}

async fn send_frame(
    sink: &mut SplitSink<WebSocket, Message>,
    message: &OutboundMessage,
) -> Result<(), axum::Error> {
    match message.to_frame() {
        Ok(frame) => sink.send(Message::Text(frame.into())).await,
        Err(e) => {
            warn!(error = %e, "Dropping unserializable outbound message");
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Keepalive {
    ping_every: Duration,
    /// Close when nothing was heard from the client for this long.
    pong_timeout: Duration,
}

/// Forwards queued messages to the socket and sends protocol pings. On
/// close, flushes whatever is still queued before the close frame.
async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<OutboundMessage>,
    handle: Arc<ConnectionHandle>,
    keepalive: Keepalive,
) {
    let mut ping = tokio::time::interval(keepalive.ping_every);
    ping.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = handle.closed() => {
                while let Ok(message) = outbound.try_recv() {
                    if send_frame(&mut sink, &message).await.is_err() {
                        break;
                    }
                }
                let _ = sink
                    .send(Message::Close(Some(CloseFrame {
                        code: close_code::AWAY,
                        reason: "closing".into(),
                    })))
                    .await;
                break;
            }
            message = outbound.recv() => match message {
                Some(message) => {
                    if send_frame(&mut sink, &message).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            _ = ping.tick() => {
                let silent = (chrono::Utc::now() - handle.last_ping())
                    .to_std()
                    .unwrap_or_default();
                if silent > keepalive.pong_timeout {
                    warn!(
                        conn_id = %handle.id,
                        silent_secs = silent.as_secs(),
                        "No pong within timeout, closing"
                    );
                    handle.close();
                    continue;
                }
                if sink.send(Message::Ping(Default::default())).await.is_err() {
                    break;
                }
            }
        }
    }

    handle.mark_dead();
}
