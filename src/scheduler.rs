use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::log;

use crate::config_handler::Config;
use crate::match_controller::SafeMatchController;

pub struct Scheduler;

impl Scheduler {
    /// Starts the list and detail timers. Each loop awaits its own fetch, and ticks missed
    /// while a fetch is in flight are skipped rather than queued.
    pub fn spawn(config: &Config, controller: SafeMatchController) -> Vec<JoinHandle<()>> {
        let list = {
            let controller = controller.clone();
            let period = config.list_poll();
            tokio::spawn(async move { Scheduler::list_loop(controller, period).await })
        };
        let detail = {
            let period = config.detail_poll();
            tokio::spawn(async move { Scheduler::detail_loop(controller, period).await })
        };
        vec![list, detail]
    }

    async fn list_loop(controller: SafeMatchController, period: Duration) {
        log::info!("[SCHEDULER] List every {:?}", period);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if controller.get_selected().await.is_some() {
                continue;
            }
            let matches = controller.refresh_list().await;
            log::info!("[SCHEDULER] List has {} matches", matches.len());
        }
    }

    async fn detail_loop(controller: SafeMatchController, period: Duration) {
        log::info!("[SCHEDULER] Detail every {:?}", period);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // first tick completes immediately, selection already triggers its own fetch
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if controller.get_selected().await.is_none() {
                continue;
            }
            if let Some(detail) = controller.refresh_detail().await {
                if let Some(event) = detail.last_event {
                    log::info!("[SCHEDULER] {} {event}", detail.title);
                }
            }
        }
    }
}
