//! `render` 命令 - 离线转换一个 payload，打印将要发送的 Discord 消息
//!
//! 跳过签名校验，便于调试模板和字段映射。

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use super::read_input;
use crate::config::BridgeConfig;
use crate::delivery::{DiscordChannel, DiscordConfig, DiscordMessage, SendResult, SenderIdentity};
use crate::webhook::{InboundEvent, Outcome, WebhookEngine};

/// render 命令参数
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// payload 文件路径，`-` 表示 stdin
    pub input: PathBuf,
    /// 渲染后实际发送到 DISCORD_WEBHOOK_URL
    #[arg(long)]
    pub send: bool,
}

/// 把 payload 渲染为 Discord 消息；不产生通知时返回处理结果
pub fn render_payload(config: &BridgeConfig, body: &[u8]) -> std::result::Result<DiscordMessage, Outcome> {
    let engine = WebhookEngine::new(config.engine_config());
    match engine.transform(&InboundEvent::parse(body)) {
        Outcome::Emit(document) => Ok(DiscordMessage::wrap(
            &SenderIdentity::plane(config.plane_icon_url()),
            document,
        )),
        other => Err(other),
    }
}

/// 处理 render 命令
pub async fn handle_render(args: RenderArgs) -> Result<()> {
    let config = BridgeConfig::from_env();
    let body = read_input(&args.input)?;

    let message = match render_payload(&config, &body) {
        Ok(message) => message,
        Err(outcome) => {
            eprintln!("No notification produced: {:?}", outcome);
            return Ok(());
        }
    };

    println!("{}", serde_json::to_string_pretty(&message)?);

    if args.send {
        let channel = DiscordChannel::new(DiscordConfig {
            webhook_url: config.discord_webhook_url.clone(),
            sender: SenderIdentity::plane(config.plane_icon_url()),
            timeout_secs: config.delivery_timeout_secs,
        })?;

        for document in message.embeds {
            match channel.send(document).await? {
                SendResult::Sent => info!("Notification delivered"),
                other => anyhow::bail!("Discord did not accept the message: {:?}", other),
            }
        }
    }

    Ok(())
}
