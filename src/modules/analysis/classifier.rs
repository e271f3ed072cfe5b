use serde::{Deserialize, Serialize};

use crate::modules::perception::StockDirectory;

pub const BUY_KEYWORDS: [&str; 4] = ["increases stake", "buys", "acquires", "allotment"];
pub const SELL_KEYWORDS: [&str; 4] = ["reduces stake", "sells", "divests", "offloads"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionLabel {
    Buying,
    Selling,
    GenericUpdate,
}

impl ActionLabel {
    pub fn heading(&self) -> &'static str {
        match self {
            ActionLabel::Buying => "🟢 Buying Alert",
            ActionLabel::Selling => "🔴 Selling Alert",
            ActionLabel::GenericUpdate => "⚪ Institutional Update",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    pub symbol: Option<String>,
    /// Only `Buying` or `Selling`; `None` means a neutral mention.
    pub action: Option<ActionLabel>,
}

impl Classification {
    pub fn none() -> Self {
        Self::default()
    }
}

/// 标题关键词 + 别名子串匹配。
///
/// This is a headline heuristic, not a parser: "buys" also matches "buyside",
/// a short alias such as "TCS" matches inside longer words, and a title naming
/// two companies is credited to whichever comes first in the directory.
pub struct NewsClassifier {
    directory: StockDirectory,
}

impl NewsClassifier {
    pub fn new(directory: StockDirectory) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &StockDirectory {
        &self.directory
    }

    pub fn detect_action(title: &str) -> Option<ActionLabel> {
        let lower = title.to_lowercase();
        // 买入优先：同时出现买卖关键词时按买入处理
        if BUY_KEYWORDS.iter().any(|k| lower.contains(k)) {
            Some(ActionLabel::Buying)
        } else if SELL_KEYWORDS.iter().any(|k| lower.contains(k)) {
            Some(ActionLabel::Selling)
        } else {
            None
        }
    }

    pub fn classify(&self, title: &str) -> Classification {
        let lower = title.to_lowercase();
        let action = Self::detect_action(title);

        for record in self.directory.records() {
            let hit = record
                .aliases
                .iter()
                .filter(|a| !a.is_empty())
                .any(|alias| lower.contains(&alias.to_lowercase()));
            if hit {
                return Classification { symbol: Some(record.symbol.clone()), action };
            }
        }
        Classification::none()
    }
}
