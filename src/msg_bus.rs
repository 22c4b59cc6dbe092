use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, Receiver, Sender};

use crate::models::{MatchDetail, MatchSummary};
use crate::LogResult;

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Msg {
    ListRefreshed { matches: Vec<MatchSummary> },
    DetailRefreshed { detail: MatchDetail },
    /// First fetch after a selection failed, nothing to show for `url` yet.
    DetailUnavailable { url: String },
}

pub struct MsgBus {
    sender: Sender<Msg>,
}

impl Default for MsgBus {
    fn default() -> Self {
        MsgBus::new()
    }
}

impl MsgBus {
    pub fn new() -> MsgBus {
        let (sender, _) = broadcast::channel(1000);
        MsgBus { sender }
    }

    pub fn subscribe(&self) -> Receiver<Msg> {
        self.sender.subscribe()
    }

    /// Sending without subscribers is not an error worth more than a log line.
    pub fn send(&self, msg: Msg) {
        if self.sender.receiver_count() == 0 {
            return;
        }
        self.sender.send(msg)
            .ok_log("[MSGBUS] Error sending");
    }
}
