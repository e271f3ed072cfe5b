use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

use crate::config::{BotSettings, Credentials};
use crate::config::settings::TimingConfig;
use crate::modules::analysis::NewsClassifier;
use crate::modules::memory::SeenLinkStore;
use crate::modules::perception::{MorningBrief, NewsFeedClient, StockDirectory};
use crate::modules::reporting::DigestReporter;
use crate::utils::{HttpClientFactory, TelegramNotifier};

use super::scanner::{NewsScanner, ScanSummary};

/// 运行期全部状态，由调度循环独占持有
pub struct AppContext {
    pub notifier: TelegramNotifier,
    pub scanner: NewsScanner,
    pub classifier: NewsClassifier,
    pub seen: SeenLinkStore,
    pub digest: DigestReporter,
    pub brief: Option<MorningBrief>,
}

impl AppContext {
    /// Builds the HTTP client and loads the stock list and the seen-link file.
    /// Neither load can fail the startup.
    pub async fn bootstrap(settings: &BotSettings, creds: &Credentials, now: DateTime<Utc>) -> Result<Self> {
        let client = HttpClientFactory::create(&settings.sources.user_agent)?;

        let notifier = TelegramNotifier::new(
            client.clone(),
            &settings.sources.telegram_api_base,
            &creds.bot_token,
            &creds.chat_id,
        );
        let directory = StockDirectory::load(&client, &settings.sources.stock_list_url).await;
        let seen = SeenLinkStore::load(&settings.seen_links_path, settings.seen_retention_days, now);
        info!("🗂️ {} seen links retained", seen.len());

        let scanner = NewsScanner::new(
            NewsFeedClient::new(client.clone(), &settings.sources.feed_base_url),
            settings.queries.clone(),
            settings.lookback_hours,
        );
        let brief = settings.morning_brief_enabled().then(|| {
            MorningBrief::new(client.clone(), &settings.sources.morning_brief_url, settings.sources.brief_headline_limit)
        });

        Ok(Self {
            notifier,
            scanner,
            classifier: NewsClassifier::new(directory),
            seen,
            digest: DigestReporter::new(),
            brief,
        })
    }

    pub async fn scan(&mut self, now: DateTime<Utc>) -> ScanSummary {
        self.scanner
            .scan(&self.classifier, &mut self.seen, &mut self.digest, &self.notifier, now)
            .await
    }

    pub async fn send_daily(&mut self) {
        self.digest.flush(&self.notifier).await;
        if let Some(brief) = &self.brief {
            brief.send(&self.notifier).await;
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub scanned: bool,
    pub digest_sent: bool,
}

/// Local minute (seconds dropped) when `local` sits on the scan cadence.
pub fn scan_slot(local: &DateTime<Tz>, interval_min: u32) -> Option<NaiveDateTime> {
    if interval_min == 0 || local.minute() % interval_min != 0 {
        return None;
    }
    local.naive_local().with_second(0)?.with_nanosecond(0)
}

pub fn scan_due(local: &DateTime<Tz>, interval_min: u32, last_slot: Option<NaiveDateTime>) -> bool {
    match scan_slot(local, interval_min) {
        Some(slot) => last_slot != Some(slot),
        None => false,
    }
}

pub fn digest_due(local: &DateTime<Tz>, hour: u32, minute: u32, last_date: Option<NaiveDate>) -> bool {
    local.hour() == hour && local.minute() == minute && last_date != Some(local.date_naive())
}

pub struct SchedulerLoop {
    ctx: AppContext,
    tz: Tz,
    timing: TimingConfig,
    last_scan_slot: Option<NaiveDateTime>,
    last_digest_date: Option<NaiveDate>,
}

impl SchedulerLoop {
    pub fn new(ctx: AppContext, settings: &BotSettings) -> Result<Self> {
        Ok(Self {
            ctx,
            tz: settings.time_zone()?,
            timing: settings.timing.clone(),
            last_scan_slot: None,
            last_digest_date: None,
        })
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Evaluates both triggers once. Markers are set before the work runs so a
    /// failing scan is not retried inside the same minute. Scan problems are
    /// reported only after the digest trigger has had its turn.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<TickOutcome> {
        let local = now.with_timezone(&self.tz);
        let mut outcome = TickOutcome::default();
        let mut unsaved_links = 0;

        if scan_due(&local, self.timing.scan_interval_min, self.last_scan_slot) {
            self.last_scan_slot = scan_slot(&local, self.timing.scan_interval_min);
            info!("⏱️ Scan triggered at {}", local.format("%Y-%m-%d %H:%M %Z"));
            unsaved_links = self.ctx.scan(now).await.persist_failures;
            outcome.scanned = true;
        }

        // 同一 tick 先扫描再汇总，本轮提醒会进入当日汇总
        if digest_due(&local, self.timing.digest_hour, self.timing.digest_minute, self.last_digest_date) {
            self.last_digest_date = Some(local.date_naive());
            self.ctx.send_daily().await;
            outcome.digest_sent = true;
        }

        if unsaved_links > 0 {
            bail!("{} seen links could not be persisted this scan", unsaved_links);
        }
        Ok(outcome)
    }

    /// Runs until the process is killed.
    pub async fn run(mut self) {
        let poll = Duration::from_secs(self.timing.poll_sec);
        let post_digest = Duration::from_secs(self.timing.post_digest_pause_sec);
        let backoff = Duration::from_secs(self.timing.error_backoff_sec);

        info!(
            "✅ Loop starting: scan every {} min, digest at {:02}:{:02} {}",
            self.timing.scan_interval_min, self.timing.digest_hour, self.timing.digest_minute, self.tz
        );

        loop {
            match self.tick(Utc::now()).await {
                Ok(outcome) => {
                    let rest = if outcome.digest_sent { poll + post_digest } else { poll };
                    sleep(rest).await;
                },
                Err(e) => {
                    error!("🔥 Tick failed: {:#}. Sleeping {}s...", e, backoff.as_secs());
                    sleep(backoff).await;
                }
            }
        }
    }
}
