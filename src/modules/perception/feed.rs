// 文件名: feed.rs

use reqwest::Client;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::debug;
use url::form_urlencoded;

/// 单条新闻，每轮扫描重新抓取，不落盘
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsEntry {
    pub title: String,
    pub link: String,
    /// Raw feed date as published (RFC 2822 for RSS).
    pub published: Option<String>,
}

impl NewsEntry {
    /// Publish time normalised to UTC, or `None` when absent or unparseable.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.published.as_deref()?.trim();
        DateTime::parse_from_rfc2822(raw)
            .or_else(|_| DateTime::parse_from_rfc3339(raw))
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// 新闻搜索 RSS (默认 Google News)
pub struct NewsFeedClient {
    client: Client,
    base_url: String,
}

impl NewsFeedClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self { client, base_url: base_url.to_string() }
    }

    pub fn search_url(&self, query: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        let sep = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{}q={}&hl=en-IN&gl=IN&ceid=IN:en", self.base_url, sep, encoded)
    }

    /// Entries in feed order. Items without a title or link are dropped.
    pub async fn search(&self, query: &str) -> Result<Vec<NewsEntry>> {
        let url = self.search_url(query);
        let bytes = self.client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let entries = parse_rss(&bytes).with_context(|| format!("bad RSS for query '{}'", query))?;
        debug!("Feed '{}' returned {} entries", query, entries.len());
        Ok(entries)
    }
}

pub fn parse_rss(bytes: &[u8]) -> Result<Vec<NewsEntry>> {
    let channel = rss::Channel::read_from(bytes)?;
    let entries = channel
        .items()
        .iter()
        .filter_map(|item| {
            let title = item.title()?.trim();
            let link = item.link()?.trim();
            if title.is_empty() || link.is_empty() {
                return None;
            }
            Some(NewsEntry {
                title: title.to_string(),
                link: link.to_string(),
                published: item.pub_date().map(|d| d.to_string()),
            })
        })
        .collect();
    Ok(entries)
}
