use crate::modules::analysis::ActionLabel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub symbol: String,
    pub action: ActionLabel,
    pub title: String,
}

impl Alert {
    /// No buy/sell keyword -> generic institutional update.
    pub fn new(symbol: &str, action: Option<ActionLabel>, title: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            action: action.unwrap_or(ActionLabel::GenericUpdate),
            title: title.to_string(),
        }
    }

    pub fn format(&self) -> String {
        format!("{}\n\nStock: {}\nNews: {}", self.action.heading(), self.symbol, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_each_label() {
        let buy = Alert::new("TCS", Some(ActionLabel::Buying), "Mutual fund buys stake in Tata Consultancy Services");
        assert_eq!(
            buy.format(),
            "🟢 Buying Alert\n\nStock: TCS\nNews: Mutual fund buys stake in Tata Consultancy Services"
        );
        let sell = Alert::new("INFY", Some(ActionLabel::Selling), "x");
        assert!(sell.format().starts_with("🔴 Selling Alert\n\n"));
        let neutral = Alert::new("INFY", None, "x");
        assert_eq!(neutral.action, ActionLabel::GenericUpdate);
        assert!(neutral.format().starts_with("⚪ Institutional Update\n\n"));
    }
}
