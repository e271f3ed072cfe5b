use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct SeenRecord {
    link: String,
    seen_at: DateTime<Utc>,
}

/// Accepts both the old plain-string array and stamped records.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredLink {
    Plain(String),
    Stamped(SeenRecord),
}

/// 已推送链接集合。每次新增后整体原子写回 (临时文件 + rename)。
pub struct SeenLinkStore {
    path: PathBuf,
    links: HashMap<String, DateTime<Utc>>,
}

impl SeenLinkStore {
    /// Missing or unreadable files give an empty store. Links older than
    /// `retention_days` are dropped on load.
    pub fn load(path: impl AsRef<Path>, retention_days: i64, now: DateTime<Utc>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut links = HashMap::new();

        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Vec<StoredLink>>(&raw) {
                Ok(stored) => {
                    for item in stored {
                        let (link, seen_at) = match item {
                            StoredLink::Plain(link) => (link, now),
                            StoredLink::Stamped(r) => (r.link, r.seen_at),
                        };
                        let entry = links.entry(link).or_insert(seen_at);
                        if seen_at < *entry {
                            *entry = seen_at;
                        }
                    }
                },
                Err(e) => warn!("⚠️ Seen-link file {} is malformed ({}). Starting empty.", path.display(), e),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No seen-link file at {}. Starting empty.", path.display());
            },
            Err(e) => warn!("⚠️ Could not read {} ({}). Starting empty.", path.display(), e),
        }

        let cutoff = now - Duration::days(retention_days);
        let before = links.len();
        links.retain(|_, seen_at| *seen_at >= cutoff);
        if links.len() < before {
            info!("🧹 Pruned {} seen links older than {} days", before - links.len(), retention_days);
        }

        Self { path, links }
    }

    pub fn contains(&self, link: &str) -> bool {
        self.links.contains_key(link)
    }

    /// Inserts and persists. Re-adding a known link keeps its first-seen time.
    pub fn add(&mut self, link: &str, now: DateTime<Utc>) -> Result<()> {
        self.links.entry(link.to_string()).or_insert(now);
        self.persist()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    fn persist(&self) -> Result<()> {
        let mut records: Vec<SeenRecord> = self
            .links
            .iter()
            .map(|(link, seen_at)| SeenRecord { link: link.clone(), seen_at: *seen_at })
            .collect();
        records.sort_by(|a, b| a.seen_at.cmp(&b.seen_at).then_with(|| a.link.cmp(&b.link)));

        let json = serde_json::to_string_pretty(&records)?;

        let file_name = self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "seen_links.json".to_string());
        let tmp = self.path.with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e).with_context(|| format!("replacing {}", self.path.display()));
        }
        Ok(())
    }
}
