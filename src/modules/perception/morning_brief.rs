use reqwest::Client;
use anyhow::{anyhow, Result};
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::utils::TelegramNotifier;

/// 早报：抓取财经新闻页头条，随每日汇总一起发送
pub struct MorningBrief {
    client: Client,
    page_url: String,
    limit: usize,
}

impl MorningBrief {
    pub fn new(client: Client, page_url: &str, limit: usize) -> Self {
        Self { client, page_url: page_url.to_string(), limit }
    }

    pub async fn fetch_headlines(&self) -> Result<Vec<String>> {
        let html = self.client
            .get(&self.page_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        extract_headlines(&html, self.limit)
    }

    /// Sends the brief. A failed fetch or an empty page skips the message.
    pub async fn send(&self, notifier: &TelegramNotifier) {
        match self.fetch_headlines().await {
            Ok(headlines) if headlines.is_empty() => {
                warn!("⚠️ Morning brief: no headlines found at {}. Skipping.", self.page_url);
            },
            Ok(headlines) => {
                info!("📈 Sending morning brief ({} headlines)", headlines.len());
                notifier.send_text(&compose_brief(&headlines)).await;
            },
            Err(e) => warn!("⚠️ Morning brief fetch failed: {}. Skipping.", e),
        }
    }
}

pub fn extract_headlines(html: &str, limit: usize) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let item_sel = Selector::parse("li.clearfix").map_err(|e| anyhow!("selector: {:?}", e))?;
    let title_sel = Selector::parse("h2").map_err(|e| anyhow!("selector: {:?}", e))?;

    // 只看前 N 个条目，没有 h2 的条目直接跳过 (不补位)
    let headlines = doc
        .select(&item_sel)
        .take(limit)
        .filter_map(|item| item.select(&title_sel).next())
        .map(|h2| h2.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    Ok(headlines)
}

pub fn compose_brief(headlines: &[String]) -> String {
    let mut message = String::from("📈 Morning Market Brief – India\n\n");
    for h in headlines {
        message.push_str(&format!("• {}\n\n", h));
    }
    message.push_str("\nHave a disciplined trading day.");
    message
}
