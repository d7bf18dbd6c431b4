//! `serve` 命令 - 启动 webhook bridge

use anyhow::Result;
use clap::Args;
use tracing::warn;

use crate::config::BridgeConfig;
use crate::delivery::build_channel;
use crate::server::{AppState, BridgeServer};
use crate::webhook::WebhookEngine;

/// serve 命令参数
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// 监听地址（覆盖 WEB_HOST）
    #[arg(long)]
    pub host: Option<String>,
    /// 监听端口（覆盖 WEB_PORT）
    #[arg(long, short)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// 把命令行参数叠加到环境配置上
    pub fn apply(&self, mut config: BridgeConfig) -> BridgeConfig {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config
    }
}

/// 处理 serve 命令
pub async fn handle_serve(args: ServeArgs) -> Result<()> {
    let config = args.apply(BridgeConfig::from_env());

    if config.verification_disabled() {
        warn!("WEBHOOK_SECRET is empty, signature verification is disabled");
    }

    let engine = WebhookEngine::new(config.engine_config());
    let channel = build_channel(&config)?;

    BridgeServer::new(&config, AppState::new(engine, channel))
        .run()
        .await
}
