//! Dry-run 渠道 - 未配置 webhook 地址时只打印将要发送的内容

use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use super::channel::{DeliveryChannel, DiscordMessage, SenderIdentity};
use crate::webhook::NotificationDocument;

/// 只记录日志的渠道
#[derive(Debug)]
pub struct DryRunChannel {
    sender: SenderIdentity,
    logged: AtomicUsize,
}

impl DryRunChannel {
    pub fn new(sender: SenderIdentity) -> Self {
        Self {
            sender,
            logged: AtomicUsize::new(0),
        }
    }

    /// 已记录的消息数
    pub fn logged_count(&self) -> usize {
        self.logged.load(Ordering::SeqCst)
    }
}

impl DeliveryChannel for DryRunChannel {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn send_async(&self, document: NotificationDocument) -> Result<()> {
        let message = DiscordMessage::wrap(&self.sender, document);
        let payload = serde_json::to_string(&message)?;
        info!(channel = "dry-run", payload = %payload, "[DRY-RUN] Would send to Discord");
        self.logged.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::AccentColor;

    #[test]
    fn test_dry_run_counts_messages() {
        let channel = DryRunChannel::new(SenderIdentity::plane("https://plane.so/plane-icon.png"));
        assert_eq!(channel.name(), "dry-run");

        let doc = NotificationDocument::new(AccentColor::Created).with_title("Fix bug");
        channel.send_async(doc).unwrap();
        assert_eq!(channel.logged_count(), 1);
    }
}
