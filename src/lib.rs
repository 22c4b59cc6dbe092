use std::fmt::Display;

use tracing::log;

pub mod config_handler;
pub mod models;
pub mod text_normalizer;
pub mod html;
pub mod rest_client;
pub mod list_service;
pub mod detail_service;
pub mod status_resolver;
pub mod scorecard;
pub mod event_service;
pub mod msg_bus;
pub mod match_controller;
pub mod scheduler;
pub mod api;
pub mod api_ws;

pub trait LogResult<T, E: Display> {
    fn ok_log(self, msg: &str) -> Option<T>;
}

impl<T, E: Display> LogResult<T, E> for Result<T, E> {
    fn ok_log(self, msg: &str) -> Option<T> {
        match self {
            Ok(o) => Some(o),
            Err(e) => {
                log::error!("{}: {}", msg, e);
                None
            }
        }
    }
}
