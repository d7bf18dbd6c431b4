//! Discord Webhook 客户端
//!
//! 把通知文档 POST 到 Discord incoming webhook。失败不重试，只记录日志。

use anyhow::{bail, Context, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::channel::{DeliveryChannel, DiscordMessage, SendResult, SenderIdentity};
use crate::webhook::NotificationDocument;

/// Discord 渠道配置
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Incoming webhook 地址
    pub webhook_url: String,
    /// 发送者身份
    pub sender: SenderIdentity,
    /// 超时时间 (秒)
    pub timeout_secs: u64,
}

/// Discord 渠道
#[derive(Debug, Clone)]
pub struct DiscordChannel {
    client: Client,
    config: Arc<DiscordConfig>,
}

impl DiscordChannel {
    /// 创建新的 Discord 渠道
    pub fn new(config: DiscordConfig) -> Result<Self> {
        if config.webhook_url.is_empty() {
            bail!("webhook_url is required");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// 同步等待发送完成
    pub async fn send(&self, document: NotificationDocument) -> Result<SendResult> {
        let message = DiscordMessage::wrap(&self.config.sender, document);

        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&message)
            .send()
            .await
            .context("HTTP request to Discord failed")?;

        let status = response.status();
        if status.is_success() {
            return Ok(SendResult::Sent);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %body, "Discord rejected webhook message");
        Ok(SendResult::Failed(format!("HTTP {}: {}", status, body)))
    }
}

impl DeliveryChannel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    fn send_async(&self, document: NotificationDocument) -> Result<()> {
        let handle = tokio::runtime::Handle::try_current()
            .context("send_async requires a tokio runtime")?;

        let channel = self.clone();
        handle.spawn(async move {
            match channel.send(document).await {
                Ok(SendResult::Sent) => info!(channel = "discord", "Notification delivered"),
                Ok(other) => warn!(channel = "discord", result = ?other, "Notification not delivered"),
                Err(e) => error!(channel = "discord", error = %e, "Failed to deliver notification"),
            }
        });

        Ok(())
    }
}
