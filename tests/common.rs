#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use httpmock::{Method::POST, Mock, MockServer};
use reqwest::Client;
use serde_json::json;
use std::path::PathBuf;

use stake_watch::modules::analysis::NewsClassifier;
use stake_watch::modules::memory::SeenLinkStore;
use stake_watch::modules::perception::{NewsFeedClient, StockDirectory, StockRecord};
use stake_watch::modules::reporting::DigestReporter;
use stake_watch::modules::scheduler::{AppContext, NewsScanner};
use stake_watch::utils::TelegramNotifier;

pub const TOKEN: &str = "TEST:TOKEN";
pub const CHAT_ID: &str = "4242";
pub const FEED_PATH: &str = "/rss/search";

pub fn send_message_path() -> String {
    format!("/bot{}/sendMessage", TOKEN)
}

pub struct Item<'a> {
    pub title: &'a str,
    pub link: &'a str,
    pub pub_date: Option<String>,
}

pub fn rss(items: &[Item<'_>]) -> String {
    let mut body = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>search</title><link>https://news.example</link><description>feed</description>"#,
    );
    for item in items {
        body.push_str("<item>");
        body.push_str(&format!("<title>{}</title><link>{}</link>", item.title, item.link));
        if let Some(d) = &item.pub_date {
            body.push_str(&format!("<pubDate>{}</pubDate>", d));
        }
        body.push_str("</item>");
    }
    body.push_str("</channel></rss>");
    body
}

pub fn hours_before(now: DateTime<Utc>, hours: i64) -> String {
    (now - Duration::hours(hours)).to_rfc2822()
}

pub fn temp_store_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("stake_watch-it-{}-{}.json", tag, uuid::Uuid::new_v4()))
}

pub fn tcs_directory() -> StockDirectory {
    StockDirectory::from_records(vec![StockRecord {
        symbol: "TCS".into(),
        aliases: vec!["Tata Consultancy Services".into(), "TCS".into()],
    }])
}

pub fn mock_feed<'a>(server: &'a MockServer, query: &str, body: String) -> Mock<'a> {
    let query = query.to_string();
    server.mock(|when, then| {
        when.method(httpmock::Method::GET)
            .path(FEED_PATH)
            .query_param("q", query.as_str());
        then.status(200)
            .header("content-type", "application/rss+xml")
            .body(body.clone());
    })
}

/// Accepts any sendMessage call.
pub fn mock_any_send(server: &MockServer) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(POST).path(send_message_path());
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"ok":true,"result":{}}"#);
    })
}

/// Accepts exactly one message text.
pub fn mock_send_text<'a>(server: &'a MockServer, text: &str) -> Mock<'a> {
    let payload = json!({
        "chat_id": CHAT_ID,
        "text": text,
        "disable_web_page_preview": true
    });
    server.mock(|when, then| {
        when.method(POST).path(send_message_path()).json_body(payload.clone());
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"ok":true,"result":{}}"#);
    })
}

pub fn context(
    server: &MockServer,
    queries: &[&str],
    directory: StockDirectory,
    seen: SeenLinkStore,
) -> AppContext {
    let client = Client::new();
    AppContext {
        notifier: TelegramNotifier::new(client.clone(), &server.base_url(), TOKEN, CHAT_ID),
        scanner: NewsScanner::new(
            NewsFeedClient::new(client, &server.url(FEED_PATH)),
            queries.iter().map(|q| q.to_string()).collect(),
            6,
        ),
        classifier: NewsClassifier::new(directory),
        seen,
        digest: DigestReporter::new(),
        brief: None,
    }
}
