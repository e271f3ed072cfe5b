use reqwest::Client;
use anyhow::{bail, Result};
use std::collections::HashSet;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRecord {
    pub symbol: String,
    pub aliases: Vec<String>,
}

/// symbol -> aliases，按 CSV 行顺序保存，分类时按此顺序匹配
#[derive(Debug, Clone, Default)]
pub struct StockDirectory {
    records: Vec<StockRecord>,
}

impl StockDirectory {
    pub fn from_records(records: Vec<StockRecord>) -> Self {
        let mut seen = HashSet::new();
        let records = records
            .into_iter()
            .filter(|r| !r.symbol.is_empty() && seen.insert(r.symbol.clone()))
            .collect();
        Self { records }
    }

    /// Fetches and parses the listing CSV. Never fails: any network or parse
    /// problem is logged and an empty directory comes back, so classification
    /// simply finds no matches.
    pub async fn load(client: &Client, url: &str) -> Self {
        match Self::fetch(client, url).await {
            Ok(dir) => {
                info!("📇 Stock directory loaded: {} symbols", dir.len());
                dir
            },
            Err(e) => {
                warn!("⚠️ Failed to load stock list from {}: {}. Continuing with no symbols.", url, e);
                Self::default()
            }
        }
    }

    async fn fetch(client: &Client, url: &str) -> Result<Self> {
        let resp = client.get(url).send().await?.error_for_status()?;
        let body = resp.text().await?;
        let dir = Self::parse_csv(&body);
        if dir.is_empty() {
            bail!("stock list contained no usable rows");
        }
        Ok(dir)
    }

    /// Header line skipped; each row with at least two fields is read as
    /// `(company name, symbol)`. Quoted fields may contain commas; a row with
    /// an unterminated quote is dropped.
    pub fn parse_csv(body: &str) -> Self {
        let mut broken = 0;
        let records = body
            .lines()
            .skip(1)
            .filter_map(|line| {
                let Some(fields) = split_row(line) else {
                    broken += 1;
                    return None;
                };
                if fields.len() < 2 {
                    return None;
                }
                let company = fields[0].clone();
                let symbol = fields[1].clone();
                let aliases = [company, symbol.clone()]
                    .into_iter()
                    .filter(|a| !a.is_empty())
                    .collect();
                Some(StockRecord { symbol, aliases })
            })
            .collect();
        if broken > 0 {
            warn!("⚠️ Skipped {} stock list rows with unbalanced quotes", broken);
        }
        Self::from_records(records)
    }

    pub fn records(&self) -> &[StockRecord] {
        &self.records
    }

    pub fn get(&self, symbol: &str) -> Option<&StockRecord> {
        self.records.iter().find(|r| r.symbol == symbol)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Splits one CSV row, honouring `"..."` quoting and `""` escapes.
/// `None` when a quote is left open.
fn split_row(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            },
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    if in_quotes {
        return None;
    }
    fields.push(current);
    Some(fields.into_iter().map(|f| f.trim().to_string()).collect())
}
