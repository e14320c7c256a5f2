use std::{env, future::Future};

use anyhow::{Error, Result};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{bot, config::SETTINGS, event, logging};

/// 啟動排程
pub async fn start(sched: &JobScheduler) -> Result<()> {
    run_cron(sched).await?;

    let msg = format!(
        "MarketAgent 已啟動\r\nRust OS/Arch: {}/{}\r\n",
        env::consts::OS,
        env::consts::ARCH
    );

    bot::telegram::send(&msg).await
}

async fn run_cron(sched: &JobScheduler) -> Result<()> {
    //                 sec  min   hour   day of month   month   day of week   year
    // UTC 時間，預設 12:30 為印度時間 18:00
    let jobs = vec![
        // 每日收盤後發送行情訊息
        create_job(SETTINGS.market.cron.clone(), event::market_update::execute),
    ];

    for job in jobs.into_iter().flatten() {
        sched.add(job).await?;
    }

    sched.start().await?;

    Ok(())
}

fn create_job<F, Fut>(cron_expr: String, task: F) -> Result<Job>
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Error>> + Send,
{
    let expr_for_log = cron_expr.clone();

    Ok(Job::new_async(cron_expr.as_str(), move |_uuid, _l| {
        let task = task.clone();
        let cron_expr = expr_for_log.clone();
        Box::pin(async move {
            if let Err(why) = task().await {
                logging::error_file_async(format!(
                    "Failed to execute task({}) because {:?}",
                    cron_expr, why
                ));
            }
        })
    })?)
}
