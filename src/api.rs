use std::{net::SocketAddr, sync::Arc};

use axum::{Router, extract::{Query, State, WebSocketUpgrade}, response::IntoResponse, Json};
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tracing::log;

use crate::{api_ws::ApiWs, match_controller::SafeMatchController, models::{MatchDetail, MatchSummary}, msg_bus::MsgBus};

#[derive(Clone)]
pub struct ApiState {
    pub controller: SafeMatchController,
    pub msg_bus: Arc<MsgBus>,

    pub nr_ws: Arc<RwLock<i16>>,
}

pub struct Api;
impl Api {
    pub async fn serve(port: u16, controller: SafeMatchController, msg_bus: Arc<MsgBus>) {
        let state = ApiState {
            controller,
            msg_bus,
            nr_ws: Arc::new(RwLock::new(0)),
        };
        let app = Router::new()
            .route("/matches", axum::routing::get(Api::get_matches))
            .route("/match", axum::routing::get(Api::get_match))
            .route("/select", axum::routing::post(Api::select))
            .route("/refresh", axum::routing::post(Api::refresh))

            .route("/ws", axum::routing::get(Api::ws_handler))

            .route("/", axum::routing::get(Api::root))
            .with_state(state)
            .layer(ServiceBuilder::new()
                .layer(CompressionLayer::new())
            );
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        log::info!("[API] Listening on {}", addr);
        _ = axum::Server::bind(&addr)
            .serve(app.into_make_service())
            .await;
    }

    async fn root() -> &'static str {
        "Howzat"
    }

    async fn get_matches(State(state): State<ApiState>) -> Json<Vec<MatchSummary>> {
        Json(state.controller.get_match_list().await)
    }

    async fn get_match(Query(query): Query<MatchQuery>, State(state): State<ApiState>) -> impl IntoResponse {
        match state.controller.get_match_detail(&query.url).await {
            Some(detail) => (StatusCode::OK, Json(Some(detail))),
            None => (StatusCode::NOT_FOUND, Json(None::<MatchDetail>)),
        }
    }

    async fn select(State(state): State<ApiState>, Json(body): Json<SelectBody>) -> Json<Option<MatchDetail>> {
        log::info!("[API] Select {:?}", body.url);
        Json(state.controller.select_match(body.url).await)
    }

    async fn refresh(State(state): State<ApiState>) -> Json<Vec<MatchSummary>> {
        Json(state.controller.refresh_list().await)
    }

    async fn ws_handler(
        ws: WebSocketUpgrade,
        State(state): State<ApiState>) -> impl IntoResponse {
        ws.on_upgrade(|socket| ApiWs::handle(socket, state))
    }
}

#[derive(Deserialize)]
struct MatchQuery {
    url: String,
}

#[derive(Deserialize)]
pub struct SelectBody {
    pub url: Option<String>,
}
