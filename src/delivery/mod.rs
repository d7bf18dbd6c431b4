//! 出站投递 - 把通知文档发送到 Discord
//!
//! # 设计目标
//! 1. 统一接口：所有渠道实现 `DeliveryChannel` trait
//! 2. 发送即返回：投递在独立 task 中完成，不阻塞 webhook 响应
//! 3. 失败只记录：投递失败不会影响对 Plane 的确认
//!
//! # 使用示例
//! ```ignore
//! use plane_discord_bridge::delivery::{build_channel, SenderIdentity};
//!
//! let channel = build_channel(&config)?;
//! channel.send_async(document)?;
//! ```

pub mod channel;
pub mod discord;
pub mod dry_run;

pub use channel::{DeliveryChannel, DiscordMessage, SendResult, SenderIdentity};
pub use discord::{DiscordChannel, DiscordConfig};
pub use dry_run::DryRunChannel;

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::BridgeConfig;

/// 根据配置选择渠道：配置了 webhook 地址时使用 Discord，否则 dry-run
pub fn build_channel(config: &BridgeConfig) -> Result<Arc<dyn DeliveryChannel>> {
    let sender = SenderIdentity::plane(config.plane_icon_url());

    if config.discord_webhook_url.is_empty() {
        warn!("DISCORD_WEBHOOK_URL is empty, notifications will only be logged");
        return Ok(Arc::new(DryRunChannel::new(sender)));
    }

    let channel = DiscordChannel::new(DiscordConfig {
        webhook_url: config.discord_webhook_url.clone(),
        sender,
        timeout_secs: config.delivery_timeout_secs,
    })?;
    info!(channel = channel.name(), "Delivery channel ready");
    Ok(Arc::new(channel))
}
