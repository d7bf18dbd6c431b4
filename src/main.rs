//! Plane Discord Bridge CLI
//!
//! 接收 Plane webhook 并转发到 Discord

use anyhow::Result;
use clap::{Parser, Subcommand};
use plane_discord_bridge::cli::{
    handle_render, handle_serve, handle_sign, RenderArgs, ServeArgs, SignArgs,
};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "plane-bridge")]
#[command(about = "Plane → Discord webhook bridge")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 启动 webhook 服务
    Serve(ServeArgs),
    /// 离线渲染一个 payload 并打印 Discord 消息
    Render(RenderArgs),
    /// 计算 payload 的 HMAC 签名
    Sign(SignArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化 tracing 日志系统
    // 通过 RUST_LOG 环境变量控制日志级别，默认为 info
    // 例如: RUST_LOG=debug plane-bridge serve
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("plane_discord_bridge=info,plane_bridge=info,tower_http=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => handle_serve(args).await?,
        Commands::Render(args) => handle_render(args).await?,
        Commands::Sign(args) => handle_sign(args)?,
    }

    Ok(())
}
