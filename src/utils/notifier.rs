use reqwest::Client;
use serde_json::json;
use tracing::{debug, error};

/// Telegram Bot API 推送。所有失败只写日志，不会回传到聊天频道。
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(client: Client, api_base: &str, bot_token: &str, chat_id: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        }
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }

    async fn send(&self, body: &serde_json::Value) {
        let url = self.send_message_url();
        match self.client.post(&url).json(body).send().await {
            Ok(resp) => {
                let status = resp.status();
                match resp.text().await {
                    Ok(text) => {
                        let accepted = serde_json::from_str::<serde_json::Value>(&text)
                            .map(|v| v["ok"].as_bool().unwrap_or(false))
                            .unwrap_or(false);
                        if !status.is_success() || !accepted {
                            error!("❌ Telegram Error ({}): {}", status, text);
                        } else {
                            debug!("Telegram message delivered");
                        }
                    },
                    Err(e) => error!("❌ Failed to read Telegram response body: {}", e),
                }
            },
            // reqwest 的错误信息里带完整 URL (含 token)，这里去掉
            Err(e) => error!("❌ Telegram Network Error: {}", e.without_url()),
        }
    }

    /// Plain-text message to the configured chat.
    pub async fn send_text(&self, content: &str) {
        let body = json!({
            "chat_id": self.chat_id,
            "text": content,
            "disable_web_page_preview": true
        });
        self.send(&body).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_bot_api_url_without_double_slash() {
        let n = TelegramNotifier::new(Client::new(), "https://api.telegram.org/", "123:abc", "42");
        assert_eq!(n.send_message_url(), "https://api.telegram.org/bot123:abc/sendMessage");
    }
}
