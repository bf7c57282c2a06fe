//! Deck protocol over WebSocket text frames

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        ConnectInfo, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};

use crate::dispatch::{Dispatch, Dispatcher};

/// Handle WebSocket upgrade request
pub(super) async fn ws_upgrade(
    State(dispatcher): State<Arc<Dispatcher>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, dispatcher, remote))
}

/// Handle one connection
///
/// Frames are handled one at a time, so a running macro holds back the
/// next frame from the same client but not from other clients.
async fn handle_socket(socket: WebSocket, dispatcher: Arc<Dispatcher>, remote: SocketAddr) {
    let (mut sender, mut receiver) = socket.split();

    let (mut session, greeting) = dispatcher.on_open(remote).await;
    if sender
        .send(Message::Text(greeting.to_string().into()))
        .await
        .is_err()
    {
        dispatcher.on_close(&session).await;
        return;
    }

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(session_id = %session.id(), error = %e, "receive failed");
                break;
            }
        };

        match msg {
            Message::Text(text) => match dispatcher.on_message(&mut session, text.as_str()).await {
                Dispatch::Ignore => {}
                Dispatch::Reply(frame) => {
                    if sender.send(Message::Text(frame.to_string().into())).await.is_err() {
                        break;
                    }
                }
                Dispatch::ReplyAndClose(frame) => {
                    let _ = sender.send(Message::Text(frame.to_string().into())).await;
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            },
            Message::Binary(_) => {
                tracing::debug!(session_id = %session.id(), "ignoring binary frame");
            }
            Message::Close(_) => break,
            // Ping/pong is answered by axum
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    dispatcher.on_close(&session).await;
}
