use std::sync::Arc;

use cricket_score_rs::api::Api;
use cricket_score_rs::config_handler;
use cricket_score_rs::match_controller::MatchController;
use cricket_score_rs::msg_bus::MsgBus;
use cricket_score_rs::scheduler::Scheduler;
use futures::future::join_all;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        // Set the RUST_LOG, if it hasn't been explicitly defined
        std::env::set_var("RUST_LOG", "info")
    }

    let format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_target(false)
        .with_ansi(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .compact();
    tracing_subscriber::fmt()
        .event_format(format)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = config_handler::get_config()?;
    let msg_bus = Arc::new(MsgBus::new());
    let controller = MatchController::new(&config, msg_bus.clone());

    let mut handles = Scheduler::spawn(&config, controller.clone());
    let api = {
        let port = config.port;
        tokio::spawn(async move { Api::serve(port, controller, msg_bus).await })
    };
    handles.push(api);

    join_all(handles).await;
    Ok(())
}
