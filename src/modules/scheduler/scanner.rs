use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::modules::analysis::{is_recent, NewsClassifier};
use crate::modules::memory::SeenLinkStore;
use crate::modules::perception::NewsFeedClient;
use crate::modules::reporting::{Alert, DigestReporter};
use crate::utils::TelegramNotifier;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub queries_failed: usize,
    pub fetched: usize,
    pub stale: usize,
    pub already_seen: usize,
    pub unmatched: usize,
    pub alerts_sent: usize,
    /// Links alerted but not written to the seen-link file.
    pub persist_failures: usize,
}

pub struct NewsScanner {
    feeds: NewsFeedClient,
    queries: Vec<String>,
    lookback_hours: i64,
}

impl NewsScanner {
    pub fn new(feeds: NewsFeedClient, queries: Vec<String>, lookback_hours: i64) -> Self {
        let queries = queries.into_iter().filter(|q| !q.trim().is_empty()).collect();
        Self { feeds, queries, lookback_hours }
    }

    /// One pass over every query. A failing feed or a failed seen-link write
    /// is logged and counted; the pass always runs to the end. An unpersisted
    /// link is still held in memory, so it is not re-sent by this process.
    pub async fn scan(
        &self,
        classifier: &NewsClassifier,
        seen: &mut SeenLinkStore,
        digest: &mut DigestReporter,
        notifier: &TelegramNotifier,
        now: DateTime<Utc>,
    ) -> ScanSummary {
        let mut summary = ScanSummary::default();

        for query in &self.queries {
            let entries = match self.feeds.search(query).await {
                Ok(e) => e,
                Err(e) => {
                    error!("❌ Feed error for '{}': {:#}", query, e);
                    summary.queries_failed += 1;
                    continue;
                }
            };
            summary.fetched += entries.len();

            for entry in entries {
                if !is_recent(&entry, self.lookback_hours, now) {
                    summary.stale += 1;
                    continue;
                }
                if seen.contains(&entry.link) {
                    summary.already_seen += 1;
                    continue;
                }

                let result = classifier.classify(&entry.title);
                let Some(symbol) = result.symbol else {
                    summary.unmatched += 1;
                    continue;
                };

                let alert = Alert::new(&symbol, result.action, &entry.title);
                let text = alert.format();
                info!("🔔 [{}] {:?}: {}", alert.symbol, alert.action, alert.title);

                notifier.send_text(&text).await;
                digest.record(text);
                summary.alerts_sent += 1;
                if let Err(e) = seen.add(&entry.link, now) {
                    error!("❌ Could not persist seen link {}: {:#}", entry.link, e);
                    summary.persist_failures += 1;
                }
            }
        }

        info!(
            "🔍 Scan done: {} alerts, {} fetched, {} stale, {} seen, {} unmatched, {} feeds failed, {} unsaved links",
            summary.alerts_sent, summary.fetched, summary.stale,
            summary.already_seen, summary.unmatched, summary.queries_failed, summary.persist_failures
        );
        summary
    }
}
