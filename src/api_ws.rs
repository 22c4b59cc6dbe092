use std::time::Duration;

use axum::extract::ws::{WebSocket, Message};
use futures::{StreamExt, SinkExt};
use tokio::select;
use tokio::sync::broadcast::error::RecvError;
use tracing::log;

use crate::api::ApiState;
use crate::msg_bus::Msg;
use crate::LogResult;

pub struct ApiWs;

impl ApiWs {
    /// Forwards every bus message as JSON. Incoming frames are only drained.
    pub async fn handle(stream: WebSocket, state: ApiState) {
        let (mut sender, mut receiver) = stream.split();
        let mut bus_receiver = state.msg_bus.subscribe();

        log::info!("[API.WS] Open, in total = {}", ApiWs::update_nr_connections(1, &state).await);

        let receive_handle = tokio::spawn(async move {
            while let Some(Ok(msg)) = receiver.next().await {
                if let Message::Close(_) = msg {
                    break;
                }
            }
        });
        _ = tokio::spawn(async move {
            loop {
                let msg = select! {
                    msg = bus_receiver.recv() => match msg {
                        Ok(msg) => match ApiWs::to_frame(&msg) {
                            Some(frame) => frame,
                            None => continue,
                        },
                        Err(RecvError::Lagged(n)) => {
                            log::warn!("[API.WS] Lagged {n} messages");
                            continue;
                        },
                        Err(RecvError::Closed) => break,
                    },
                    _ = tokio::time::sleep(Duration::from_secs(60)) => {
                        // keep idle connections open
                        Message::Ping(vec![42])
                    }
                };
                if let Err(e) = sender.send(msg).await {
                    log::info!("[API.WS] Error sending {e}");
                    break;
                }
            }
        }).await;

        receive_handle.abort();

        log::info!("[API.WS] Close, in total = {}", ApiWs::update_nr_connections(-1, &state).await);
    }

    fn to_frame(msg: &Msg) -> Option<Message> {
        serde_json::to_string(msg)
            .ok_log("[API.WS] Error encoding")
            .map(Message::Text)
    }

    async fn update_nr_connections(delta: i16, state: &ApiState) -> i16 {
        let mut nr_ws = state.nr_ws.write().await;
        *nr_ws += delta;
        *nr_ws
    }
}
