pub mod bot;
pub mod calculation;
pub mod config;
pub mod crawler;
pub mod declare;
pub mod error;
pub mod event;
pub mod logging;
pub mod narrative;
pub mod scheduler;
pub mod util;

use anyhow::Result;
use axum::{routing::get, Router};
use tokio_cron_scheduler::JobScheduler;

/// 代管平台的健康檢查端點
async fn index() -> &'static str {
    "Market agent is running!"
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let sched = JobScheduler::new().await?;
    if let Err(why) = scheduler::start(&sched).await {
        logging::error_file_async(format!("Failed to scheduler::start because {:?}", why));
    }

    let app = Router::new().route("/", get(index));
    let addr = format!("0.0.0.0:{}", config::SETTINGS.system.http_port);

    logging::info_console(format!("listening on {}", addr));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
