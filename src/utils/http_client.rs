use reqwest::Client;
use std::time::Duration;
use anyhow::Result;
use tracing::info;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// 通用 HTTP Client：股票列表、新闻 RSS、Telegram 共用
    /// 部分站点 (NSE, Moneycontrol) 会拒绝默认 UA，所以统一带上自定义 User-Agent
    pub fn create(user_agent: &str) -> Result<Client> {
        let builder = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(30)));

        info!("🌐 [Http Client] Ready (UA: {})", user_agent);

        let client = builder.build()?;
        Ok(client)
    }
}
