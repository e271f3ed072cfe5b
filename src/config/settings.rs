use serde::Deserialize;
use config::{Config, Environment, File};
use anyhow::{anyhow, bail, Context, Result};
use chrono_tz::Tz;
use std::env;

use crate::modules::analysis::DEFAULT_WINDOW_HOURS;

pub const DEFAULT_QUERIES: [&str; 4] = [
    "promoter increases stake",
    "mutual fund buys stake",
    "bulk deal",
    "block deal",
];

#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub poll_sec: u64,
    pub post_digest_pause_sec: u64,
    pub error_backoff_sec: u64,
    pub scan_interval_min: u32,
    pub digest_hour: u32,
    pub digest_minute: u32,
    pub timezone: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub stock_list_url: String,
    pub feed_base_url: String,
    pub telegram_api_base: String,
    /// 为空则关闭早报
    pub morning_brief_url: String,
    pub brief_headline_limit: usize,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BotSettings {
    pub lookback_hours: i64,
    pub seen_links_path: String,
    pub seen_retention_days: i64,
    pub queries: Vec<String>,
    pub timing: TimingConfig,
    pub sources: SourceConfig,
}

impl BotSettings {
    pub fn load() -> Result<Self> {
        Self::load_from("bot_config")
    }

    /// Defaults, then the optional config file, then `STAKE_WATCH_*` env vars
    /// (nested keys use `__`, e.g. `STAKE_WATCH_TIMING__POLL_SEC`).
    pub fn load_from(file_stem: &str) -> Result<Self> {
        let settings = Config::builder()
            .set_default("lookback_hours", DEFAULT_WINDOW_HOURS)?
            .set_default("seen_links_path", "seen_links.json")?
            .set_default("seen_retention_days", 30)?
            .set_default("queries", DEFAULT_QUERIES.to_vec())?
            .set_default("timing.poll_sec", 20)?
            .set_default("timing.post_digest_pause_sec", 60)?
            .set_default("timing.error_backoff_sec", 30)?
            .set_default("timing.scan_interval_min", 15)?
            .set_default("timing.digest_hour", 8)?
            .set_default("timing.digest_minute", 0)?
            .set_default("timing.timezone", "Asia/Kolkata")?
            .set_default(
                "sources.stock_list_url",
                "https://archives.nseindia.com/content/equities/EQUITY_L.csv",
            )?
            .set_default("sources.feed_base_url", "https://news.google.com/rss/search")?
            .set_default("sources.telegram_api_base", "https://api.telegram.org")?
            .set_default("sources.morning_brief_url", "https://www.moneycontrol.com/news/business/")?
            .set_default("sources.brief_headline_limit", 5)?
            .set_default(
                "sources.user_agent",
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
            )?
            .add_source(File::with_name(file_stem).required(false))
            .add_source(
                Environment::with_prefix("STAKE_WATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let profile: BotSettings = settings.try_deserialize()?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lookback_hours <= 0 {
            bail!("lookback_hours must be positive (got {})", self.lookback_hours);
        }
        let interval = self.timing.scan_interval_min;
        if interval == 0 || 60 % interval != 0 {
            bail!("timing.scan_interval_min must divide 60 (got {})", interval);
        }
        if self.timing.digest_hour > 23 || self.timing.digest_minute > 59 {
            bail!(
                "digest time {:02}:{:02} is not a valid wall-clock time",
                self.timing.digest_hour, self.timing.digest_minute
            );
        }
        if self.queries.iter().all(|q| q.trim().is_empty()) {
            bail!("at least one search query is required");
        }
        // 保留期必须长于回看窗口，否则被清理的链接可能再次推送
        if self.seen_retention_days * 24 <= self.lookback_hours {
            bail!(
                "seen_retention_days ({}) must cover more than the {}h lookback window",
                self.seen_retention_days, self.lookback_hours
            );
        }
        self.time_zone()?;
        Ok(())
    }

    pub fn time_zone(&self) -> Result<Tz> {
        self.timing
            .timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("invalid timezone '{}': {}", self.timing.timezone, e))
    }

    pub fn morning_brief_enabled(&self) -> bool {
        !self.sources.morning_brief_url.trim().is_empty()
    }
}

/// Telegram 凭证，只从环境变量读取
#[derive(Clone)]
pub struct Credentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_token = required_var("TELEGRAM_BOT_TOKEN", &lookup)?;
        let chat_id = required_var("TELEGRAM_CHAT_ID", &lookup)?;
        Ok(Self { bot_token, chat_id })
    }
}

fn required_var(key: &str, lookup: &impl Fn(&str) -> Option<String>) -> Result<String> {
    let value = lookup(key).with_context(|| format!("{} must be set in the environment or .env", key))?;
    if value.trim().is_empty() {
        bail!("{} is set but empty", key);
    }
    Ok(value.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> BotSettings {
        BotSettings::load_from("stake_watch_missing_config_for_tests").unwrap()
    }

    #[test]
    fn defaults_match_the_documented_cadence() {
        let s = defaults();
        assert_eq!(s.lookback_hours, 6);
        assert_eq!(s.timing.scan_interval_min, 15);
        assert_eq!((s.timing.digest_hour, s.timing.digest_minute), (8, 0));
        assert_eq!(s.timing.poll_sec, 20);
        assert_eq!(s.timing.post_digest_pause_sec, 60);
        assert_eq!(s.timing.error_backoff_sec, 30);
        assert_eq!(s.queries.len(), DEFAULT_QUERIES.len());
        assert_eq!(s.time_zone().unwrap(), chrono_tz::Asia::Kolkata);
        assert!(s.morning_brief_enabled());
    }

    #[test]
    fn rejects_interval_that_does_not_divide_an_hour() {
        let mut s = defaults();
        s.timing.scan_interval_min = 7;
        assert!(s.validate().is_err());
        s.timing.scan_interval_min = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn rejects_retention_shorter_than_lookback() {
        let mut s = defaults();
        s.lookback_hours = 48;
        s.seen_retention_days = 2;
        assert!(s.validate().is_err());
        s.seen_retention_days = 3;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_timezone_and_bad_digest_time() {
        let mut s = defaults();
        s.timing.timezone = "Mars/Olympus".to_string();
        assert!(s.validate().is_err());

        let mut s = defaults();
        s.timing.digest_hour = 24;
        assert!(s.validate().is_err());
    }

    fn lookup_from<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    }

    #[test]
    fn credentials_are_read_and_trimmed() {
        let vars = [("TELEGRAM_BOT_TOKEN", " 123:abc "), ("TELEGRAM_CHAT_ID", "4242")];
        let creds = Credentials::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(creds.bot_token, "123:abc");
        assert_eq!(creds.chat_id, "4242");
    }

    #[test]
    fn missing_or_blank_credentials_are_fatal_and_name_the_key() {
        let cases: [(&[(&str, &str)], &str); 4] = [
            (&[("TELEGRAM_CHAT_ID", "4242")], "TELEGRAM_BOT_TOKEN"),
            (&[("TELEGRAM_BOT_TOKEN", "   "), ("TELEGRAM_CHAT_ID", "4242")], "TELEGRAM_BOT_TOKEN"),
            (&[("TELEGRAM_BOT_TOKEN", "123:abc")], "TELEGRAM_CHAT_ID"),
            (&[("TELEGRAM_BOT_TOKEN", "123:abc"), ("TELEGRAM_CHAT_ID", "")], "TELEGRAM_CHAT_ID"),
        ];
        for (vars, key) in cases {
            let err = Credentials::from_lookup(lookup_from(vars)).err().expect("should fail");
            assert!(format!("{:#}", err).contains(key), "{} not named in: {:#}", key, err);
        }
    }

    #[test]
    fn blank_brief_url_disables_morning_brief() {
        let mut s = defaults();
        s.sources.morning_brief_url = "  ".to_string();
        assert!(!s.morning_brief_enabled());
    }
}
