use anyhow::Context;
use chrono::Utc;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stake_watch::config::{BotSettings, Credentials};
use stake_watch::modules::scheduler::{AppContext, SchedulerLoop};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    info!("Starting Stake Watch v1.0 (institutional news alerts)...");

    // 1. 配置与凭证，缺失即退出
    let settings = BotSettings::load().context("Failed to load bot settings")?;
    let creds = Credentials::from_env().context("Missing Telegram credentials")?;

    // 2. 模块初始化
    let ctx = AppContext::bootstrap(&settings, &creds, Utc::now()).await?;
    info!(
        "📇 {} symbols, {} queries, lookback {}h",
        ctx.classifier.directory().len(),
        settings.queries.len(),
        settings.lookback_hours
    );

    // 3. 主循环
    let scheduler = SchedulerLoop::new(ctx, &settings)?;
    scheduler.run().await;
    Ok(())
}
