use std::sync::Arc;
use std::time::{Duration, Instant};

use cricket_score_rs::{
    config_handler::Config,
    detail_service::MatchDetailService,
    list_service::MatchListService,
    match_controller::MatchController,
    models::EventKind,
    msg_bus::{Msg, MsgBus},
};
use tempdir::TempDir;

use crate::common::{external_server::ExternalServer, score_server::ScoreServer};

mod common;

fn config_for(external_server: &ExternalServer) -> Config {
    Config {
        base_url: external_server.get_url(),
        list_timeout_s: 2,
        detail_timeout_s: 1,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_list_selector_fallback() {
    // Given - homepage without the primary list markup
    let mut external_server = ExternalServer::new(8101);
    external_server.start().await;
    external_server.set_homepage("homepage_fallback.html").await;
    let service = MatchListService::new(reqwest::Client::new(), &config_for(&external_server));

    // When
    let matches = service.fetch().await;

    // Then
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].title, "NZ vs PAK, 3rd T20I");
    assert_eq!(matches[0].score, "NZ 88/2 (9)");
    assert_eq!(matches[0].url, format!("{}/live-cricket-scores/201/nz-vs-pak-3rd-t20i-pakistan-tour-of-new-zealand-2025", external_server.get_url()));
    assert_eq!(matches[1].title, "SL vs BAN, 2nd ODI");
    assert_eq!(matches[1].score, "SL v BAN (ODI)");
}

#[tokio::test]
async fn test_list_keeps_last_good() {
    // Given
    let mut external_server = ExternalServer::new(8102);
    external_server.start().await;
    let msg_bus = Arc::new(MsgBus::new());
    let mut receiver = msg_bus.subscribe();
    let controller = MatchController::new(&config_for(&external_server), msg_bus.clone());

    // When
    let matches = controller.refresh_list().await;

    // Then
    assert_eq!(matches.len(), 3);
    assert_eq!(matches[0].title, "MI vs CSK, 54th Match");
    assert_eq!(matches[0].score, "MI 120/3 (14.2) • CSK 187/6 (20)");
    assert_eq!(matches[1].title, "IND vs AUS");
    assert_eq!(matches[1].score, "IND won by 6 wkts");
    assert_eq!(matches[2].title, "ENG vs SA, 1st Test");
    assert_eq!(matches[2].score, "ENG v SA (Test)");
    assert!(matches!(receiver.try_recv(), Ok(Msg::ListRefreshed { matches }) if matches.len() == 3));

    // When - site breaks
    external_server.set_homepage("homepage_empty.html").await;
    let matches = controller.refresh_list().await;

    // Then - cached list, nothing published
    assert_eq!(matches.len(), 3);
    assert!(receiver.try_recv().is_err());
    assert_eq!(controller.get_match_list().await.len(), 3);
}

#[tokio::test]
async fn test_detail_failures_give_none() {
    // Given
    let mut external_server = ExternalServer::new(8103);
    external_server.start().await;
    external_server.set_pages("101", &["match_live.html"]).await;
    let service = MatchDetailService::new(reqwest::Client::new(), &config_for(&external_server));

    // When - slower than the timeout
    let before = Instant::now();
    let detail = service.fetch(&external_server.slow_match_url("101")).await;

    // Then
    assert!(detail.is_none());
    assert!(before.elapsed().as_secs() < 4);

    // When - non-2xx and unreachable host
    let not_found = service.fetch(&external_server.match_url("999")).await;
    let unreachable = service.fetch("http://localhost:1/live-cricket-scores/1/match-1").await;

    // Then
    assert!(not_found.is_none());
    assert!(unreachable.is_none());
}

#[tokio::test]
async fn test_select_suppresses_first_event_then_detects_wicket() {
    // Given - a page showing a boundary, then the same match a wicket later
    let mut external_server = ExternalServer::new(8104);
    external_server.start().await;
    external_server.set_pages("101", &["match_live.html", "match_wicket.html"]).await;
    let url = external_server.match_url("101");

    let msg_bus = Arc::new(MsgBus::new());
    let mut receiver = msg_bus.subscribe();
    let controller = MatchController::new(&config_for(&external_server), msg_bus.clone());

    // When
    let detail = controller.select_match(Some(url.clone())).await.expect("initial detail");

    // Then - the boundary is on the page but not reported
    assert_eq!(detail.latest_commentary.as_deref(), Some("Pathirana to Rohit Sharma, FOUR"));
    assert_eq!(detail.last_event, None);
    assert_eq!(detail.score, "MI 120/3 (14.2)");
    assert_eq!(detail.batters[0].name, "R. Sharma");
    assert_eq!(detail.bowlers[0].economy_rate, "8.00");
    assert_eq!(controller.get_selected().await, Some(url.clone()));
    match receiver.try_recv() {
        Ok(Msg::DetailRefreshed { detail }) => assert_eq!(detail.last_event, None),
        other => panic!("unexpected {:?}", other),
    }

    // When - timer poll
    let detail = controller.refresh_detail().await.expect("timer detail");

    // Then
    assert_eq!(detail.score, "MI 121/4 (14.4)");
    assert_eq!(detail.last_event, Some(EventKind::Wicket));
    match receiver.try_recv() {
        Ok(Msg::DetailRefreshed { detail }) => assert_eq!(detail.last_event, Some(EventKind::Wicket)),
        other => panic!("unexpected {:?}", other),
    }

    // When - same delivery again
    let detail = controller.refresh_detail().await.expect("timer detail");

    // Then
    assert_eq!(detail.last_event, None);
    assert_eq!(external_server.nr_requests("101").await, 3);

    // When - deselect
    let detail = controller.select_match(None).await;

    // Then
    assert!(detail.is_none());
    assert_eq!(controller.get_selected().await, None);
    assert!(controller.refresh_detail().await.is_none());
}

#[tokio::test]
async fn test_failed_poll_keeps_baseline() {
    // Given - a selected match seeded at three wickets
    let mut external_server = ExternalServer::new(8109);
    external_server.start().await;
    external_server.set_pages("101", &["match_live.html"]).await;
    let url = external_server.match_url("101");
    let msg_bus = Arc::new(MsgBus::new());
    let mut receiver = msg_bus.subscribe();
    let controller = MatchController::new(&config_for(&external_server), msg_bus.clone());
    controller.select_match(Some(url.clone())).await.expect("initial detail");
    assert!(matches!(receiver.try_recv(), Ok(Msg::DetailRefreshed { .. })));

    // When - the site stops serving the match
    external_server.set_pages("101", &[]).await;
    let detail = controller.refresh_detail().await;

    // Then - nothing published
    assert!(detail.is_none());
    assert!(receiver.try_recv().is_err());
    assert_eq!(controller.get_selected().await, Some(url));

    // When - back, one wicket later
    external_server.set_pages("101", &["match_wicket.html"]).await;
    let detail = controller.refresh_detail().await.expect("timer detail");

    // Then - compared against the seeded baseline
    assert_eq!(detail.last_event, Some(EventKind::Wicket));
    assert_eq!(external_server.nr_requests("101").await, 3);
}

#[tokio::test]
async fn test_stale_detail_discarded() {
    // Given - a selection whose pages take longer than the poll
    let mut external_server = ExternalServer::new(8110);
    external_server.start().await;
    external_server.set_pages("101", &["match_live.html", "match_wicket.html"]).await;
    external_server.set_pages("102", &["match_complete.html"]).await;
    let slow_url = external_server.slow_match_url("101");
    let other_url = external_server.match_url("102");
    let config = Config { detail_timeout_s: 10, ..config_for(&external_server) };
    let msg_bus = Arc::new(MsgBus::new());
    let mut receiver = msg_bus.subscribe();
    let controller = MatchController::new(&config, msg_bus.clone());
    controller.select_match(Some(slow_url.clone())).await.expect("initial detail");
    assert!(matches!(receiver.try_recv(), Ok(Msg::DetailRefreshed { .. })));

    // When - the selection changes while a timer poll is in flight
    let in_flight = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.refresh_detail().await })
    };
    tokio::time::sleep(Duration::from_secs(1)).await;
    controller.select_match(Some(other_url.clone())).await.expect("other detail");
    let stale = in_flight.await.expect("poll to finish");

    // Then - the old match's result is dropped, only the new selection is published
    assert!(stale.is_none());
    assert_eq!(external_server.nr_requests("101").await, 2);
    let mut published = vec![];
    while let Ok(msg) = receiver.try_recv() {
        published.push(msg);
    }
    assert_eq!(published.len(), 1);
    match &published[0] {
        Msg::DetailRefreshed { detail } => assert_eq!(detail.url, other_url),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(controller.get_selected().await, Some(other_url));
}

#[tokio::test]
async fn test_select_unavailable() {
    // Given
    let mut external_server = ExternalServer::new(8105);
    external_server.start().await;
    let url = external_server.match_url("404");
    let msg_bus = Arc::new(MsgBus::new());
    let mut receiver = msg_bus.subscribe();
    let controller = MatchController::new(&config_for(&external_server), msg_bus.clone());

    // When
    let detail = controller.select_match(Some(url.clone())).await;

    // Then
    assert!(detail.is_none());
    match receiver.try_recv() {
        Ok(Msg::DetailUnavailable { url: unavailable }) => assert_eq!(unavailable, url),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_get_match_detail_complete() {
    // Given
    let mut external_server = ExternalServer::new(8106);
    external_server.start().await;
    external_server.set_pages("102", &["match_complete.html"]).await;
    let controller = MatchController::new(&config_for(&external_server), Arc::new(MsgBus::new()));

    // When
    let detail = controller.get_match_detail(&external_server.match_url("102")).await.expect("detail");

    // Then
    assert_eq!(detail.title, "IND vs AUS");
    assert_eq!(detail.score, "IND 272/4 (48.1)");
    assert_eq!(detail.opponent_score.as_deref(), Some("AUS 271/9 (50)"));
    assert!(detail.is_complete);
    assert_eq!(detail.headline(), "India won by 6 wkts");
    assert_eq!(detail.player_of_match.as_deref(), Some("R. Jadeja"));
    assert_eq!(detail.latest_commentary.as_deref(), Some("Starc to Jadeja, SIX"));
    assert_eq!(detail.last_event, None);
}

#[tokio::test]
async fn test_server() -> Result<(), Box<dyn std::error::Error>> {
    // Given - Start external server
    let temp_dir = TempDir::new("integration_test").expect("dir to be created");
    let path = temp_dir.path().to_str().unwrap();

    let mut external_server = ExternalServer::new(8107);
    external_server.start().await;
    external_server.set_pages("101", &["match_live.html"]).await;

    // Given - Start server
    let mut server = ScoreServer::new(8108);
    server.start(path, &external_server.get_url());

    // When
    let matches = server.retry_until_matches(predicates::function::function(|e: &Vec<_>| e.len() == 3), 200).await;

    // Then
    assert_eq!(matches[0].title, "MI vs CSK, 54th Match");
    assert!(matches[0].url.starts_with(&external_server.get_url()));

    // When
    let url = external_server.match_url("101");
    let selected = server.select(Some(&url)).await?;

    // Then
    let selected = selected.expect("selected detail");
    assert_eq!(selected.url, url);
    assert_eq!(selected.last_event, None);

    // When
    let detail = server.get_match(&url).await?;

    // Then
    assert_eq!(detail.map(|e| e.score), Some("MI 120/3 (14.2)".to_string()));

    // When - detail timer keeps polling the selection
    let mut nr_requests = external_server.nr_requests("101").await;
    for _ in 0..10 {
        if nr_requests >= 4 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
        nr_requests = external_server.nr_requests("101").await;
    }

    // Then - select and get_match account for two requests
    assert!(nr_requests >= 4, "expected timer polls, got {nr_requests} requests");
    Ok(())
}
