use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::log;

use crate::config_handler::Config;
use crate::detail_service::MatchDetailService;
use crate::event_service::EventService;
use crate::list_service::MatchListService;
use crate::models::{MatchDetail, MatchSummary};
use crate::msg_bus::{Msg, MsgBus};

pub type SafeMatchController = Arc<MatchController>;

#[derive(Default)]
struct Selection {
    url: Option<String>,
    /// Bumped on every select/deselect, so a reselection of the same url still invalidates older fetches.
    id: u64,
}

/// Owns everything that outlives a single poll: the selection, the last good list and per-url event state.
/// Lock order is `selection` before `event_service`.
pub struct MatchController {
    list_service: MatchListService,
    detail_service: MatchDetailService,
    event_service: RwLock<EventService>,
    selection: RwLock<Selection>,
    matches_cache: RwLock<Vec<MatchSummary>>,
    msg_bus: Arc<MsgBus>,
}

impl MatchController {
    pub fn new(config: &Config, msg_bus: Arc<MsgBus>) -> SafeMatchController {
        let client = reqwest::Client::new();
        Arc::new(MatchController {
            list_service: MatchListService::new(client.clone(), config),
            detail_service: MatchDetailService::new(client, config),
            event_service: RwLock::new(EventService::new(config)),
            selection: RwLock::new(Selection::default()),
            matches_cache: RwLock::new(vec![]),
            msg_bus,
        })
    }

    /// Fresh list, or the last good one when the fetch came back empty.
    pub async fn get_match_list(&self) -> Vec<MatchSummary> {
        self.load_list().await.0
    }

    /// Timer and manual refresh. Only a fresh, non-empty list is published.
    pub async fn refresh_list(&self) -> Vec<MatchSummary> {
        let (matches, fresh) = self.load_list().await;
        if fresh {
            self.msg_bus.send(Msg::ListRefreshed { matches: matches.clone() });
        }
        matches
    }

    async fn load_list(&self) -> (Vec<MatchSummary>, bool) {
        let matches = self.list_service.fetch().await;
        if matches.is_empty() {
            let cached = self.matches_cache.read().await.clone();
            log::warn!("[CONTROLLER] Empty list, keep {} cached", cached.len());
            return (cached, false);
        }
        *self.matches_cache.write().await = matches.clone();
        (matches, true)
    }

    pub async fn get_selected(&self) -> Option<String> {
        self.selection.read().await.url.clone()
    }

    /// Sets or clears the selection. A new url gets one immediate fetch whose event is always suppressed;
    /// its result seeds the poll state and is published unless the selection moved on meanwhile.
    pub async fn select_match(&self, url: Option<String>) -> Option<MatchDetail> {
        let id = {
            let mut selection = self.selection.write().await;
            let mut events = self.event_service.write().await;
            if let Some(previous) = selection.url.take() {
                events.forget(&previous);
            }
            if let Some(url) = &url {
                events.forget(url);
            }
            selection.url = url.clone();
            selection.id += 1;
            selection.id
        };
        log::info!("[CONTROLLER] Selected {:?}", url);

        let url = url?;
        let detail = self.detail_service.fetch(&url).await;

        let selection = self.selection.read().await;
        if selection.id != id {
            log::info!("[CONTROLLER] Discard initial fetch of {url}, selection changed");
            return detail.map(MatchController::suppressed);
        }
        match detail {
            Some(detail) => {
                let detail = self.seed(&url, detail).await;
                self.msg_bus.send(Msg::DetailRefreshed { detail: detail.clone() });
                Some(detail)
            },
            None => {
                self.msg_bus.send(Msg::DetailUnavailable { url });
                None
            },
        }
    }

    /// Immediate fetch with the event suppressed. Seeds the poll state only when `url` is the
    /// current selection and has no baseline yet, so it never consumes an event the timer should report.
    pub async fn get_match_detail(&self, url: &str) -> Option<MatchDetail> {
        let detail = self.detail_service.fetch(url).await?;
        let selection = self.selection.read().await;
        if selection.url.as_deref() == Some(url) {
            Some(self.seed(url, detail).await)
        } else {
            Some(MatchController::suppressed(detail))
        }
    }

    /// Timer path for the selected match. A failed fetch changes nothing; a result for a selection
    /// that has since changed is dropped without touching poll state.
    pub async fn refresh_detail(&self) -> Option<MatchDetail> {
        let (url, id) = {
            let selection = self.selection.read().await;
            (selection.url.clone()?, selection.id)
        };
        let mut detail = self.detail_service.fetch(&url).await?;

        let selection = self.selection.read().await;
        if selection.id != id {
            log::info!("[CONTROLLER] Discard stale detail of {url}");
            return None;
        }
        {
            let mut events = self.event_service.write().await;
            let has_baseline = events.get_state(&url).is_some();
            let event = events.process(&url, &detail, Utc::now());
            detail.last_event = if has_baseline { event } else { None };
        }
        drop(selection);

        self.msg_bus.send(Msg::DetailRefreshed { detail: detail.clone() });
        Some(detail)
    }

    async fn seed(&self, url: &str, detail: MatchDetail) -> MatchDetail {
        let mut events = self.event_service.write().await;
        if events.get_state(url).is_none() {
            events.process(url, &detail, Utc::now());
        }
        MatchController::suppressed(detail)
    }

    fn suppressed(mut detail: MatchDetail) -> MatchDetail {
        detail.last_event = None;
        detail
    }
}
