use tracing::info;

use crate::utils::TelegramNotifier;

pub const DIGEST_HEADER: &str = "📊 Daily Institutional Summary\n\n";
pub const NO_ACTIVITY_TEXT: &str = "📊 Daily Institutional Summary\n\nNo institutional activity detected today.";

/// 当日已发送提醒的缓冲区，每日汇总发送后清空 (唯一的清空入口)
#[derive(Debug, Default)]
pub struct DigestReporter {
    buffer: Vec<String>,
}

impl DigestReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, alert_text: String) {
        self.buffer.push(alert_text);
    }

    pub fn entries(&self) -> &[String] {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn compose(&self) -> String {
        if self.buffer.is_empty() {
            return NO_ACTIVITY_TEXT.to_string();
        }
        let mut message = String::from(DIGEST_HEADER);
        for entry in &self.buffer {
            message.push_str(entry);
            message.push_str("\n\n");
        }
        message
    }

    pub async fn flush(&mut self, notifier: &TelegramNotifier) {
        let message = self.compose();
        info!("📊 Sending daily digest ({} alerts)", self.buffer.len());
        notifier.send_text(&message).await;
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_composes_no_activity_text() {
        assert_eq!(DigestReporter::new().compose(), NO_ACTIVITY_TEXT);
    }

    #[test]
    fn entries_follow_header_in_insertion_order() {
        let mut d = DigestReporter::new();
        d.record("first".to_string());
        d.record("second".to_string());
        assert_eq!(d.compose(), format!("{}first\n\nsecond\n\n", DIGEST_HEADER));
    }
}
