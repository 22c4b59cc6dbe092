use std::{sync::Arc, time::Duration, collections::HashMap, net::SocketAddr};

use axum::{Router, extract::{Path, State}, response::IntoResponse, body::StreamBody, routing::get};
use reqwest::StatusCode;
use tokio::{sync::RwLock, task::JoinHandle};
use tokio_util::io::ReaderStream;

const FIXTURES: &str = "./tests/fixtures";

#[derive(Default)]
pub struct AppState {
    pub homepage: String,
    /// match id => fixture files, served in order, the last one repeats
    pub pages: HashMap<String, Vec<String>>,
    pub nr_requests: HashMap<String, u16>,
}

pub type SafeAppState = Arc<RwLock<AppState>>;

/// Stand-in for the scraped website.
pub struct ExternalServer {
    port: u16,
    handles: Vec<JoinHandle<()>>,
    state: SafeAppState,
}

impl Drop for ExternalServer {
    fn drop(&mut self) {
        for e in &self.handles {
            e.abort();
        }
    }
}

impl ExternalServer {
    pub fn new(port: u16) -> ExternalServer {
        let state = AppState { homepage: "homepage.html".to_string(), ..Default::default() };
        ExternalServer { port, handles: vec![], state: Arc::new(RwLock::new(state)) }
    }

    pub async fn start(&mut self) -> SafeAppState {
        let external_mock = {
            let port = self.port;
            let state = self.state.clone();
            tokio::spawn(async move { ExternalServer::serve_external_data(state, port).await })
        };
        self.handles.push(external_mock);

        tokio::time::sleep(Duration::from_millis(500)).await; // wait for mock to start

        self.state.clone()
    }

    pub fn get_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    pub fn match_url(&self, id: &str) -> String {
        format!("{}/live-cricket-scores/{id}/match-{id}", self.get_url())
    }

    pub fn slow_match_url(&self, id: &str) -> String {
        format!("{}/slow/live-cricket-scores/{id}/match-{id}", self.get_url())
    }

    pub async fn set_homepage(&self, file: &str) {
        self.state.write().await.homepage = file.to_string();
    }

    pub async fn set_pages(&self, id: &str, files: &[&str]) {
        self.state.write().await.pages.insert(id.to_string(), files.iter().map(|e| e.to_string()).collect());
    }

    pub async fn nr_requests(&self, id: &str) -> u16 {
        self.state.read().await.nr_requests.get(id).cloned().unwrap_or_default()
    }

    async fn serve_external_data(state: SafeAppState, port: u16) {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let app = Router::new()
            .route("/", get(ExternalServer::get_homepage))
            .route("/live-cricket-scores/:id/:slug", get(ExternalServer::get_match_page))
            .route("/slow/live-cricket-scores/:id/:slug", get(ExternalServer::get_slow_match_page))
            .with_state(state);

        axum::Server::bind(&addr)
            .serve(app.into_make_service())
            .await
            .unwrap();
    }

    async fn get_homepage(State(state): State<SafeAppState>) -> impl IntoResponse {
        let file = state.read().await.homepage.clone();
        ExternalServer::get_file_from(format!("{FIXTURES}/{file}")).await
    }

    async fn get_match_page(Path((id, _)): Path<(String, String)>, State(state): State<SafeAppState>) -> impl IntoResponse {
        let file = {
            let mut state = state.write().await;
            *state.nr_requests.entry(id.clone()).or_insert(0) += 1;
            match state.pages.get_mut(&id) {
                Some(files) if files.len() > 1 => Some(files.remove(0)),
                Some(files) => files.first().cloned(),
                None => None,
            }
        };
        match file {
            Some(file) => ExternalServer::get_file_from(format!("{FIXTURES}/{file}")).await,
            None => Err((StatusCode::NOT_FOUND, format!("No page for {id}"))),
        }
    }

    async fn get_slow_match_page(Path((id, slug)): Path<(String, String)>, State(state): State<SafeAppState>) -> impl IntoResponse {
        tokio::time::sleep(Duration::from_secs(5)).await;
        ExternalServer::get_match_page(Path((id, slug)), State(state)).await
    }

    async fn get_file_from(path: String) -> Result<StreamBody<ReaderStream<tokio::fs::File>>, (StatusCode, String)> {
        let file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(err) => return Err((StatusCode::NOT_FOUND, format!("File not found: {}", err))),
        };
        let stream = ReaderStream::new(file);
        let body = StreamBody::new(stream);
        Ok(body)
    }
}
