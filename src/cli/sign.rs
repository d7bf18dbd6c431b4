//! `sign` 命令 - 计算 payload 的签名，配合 curl 手动测试

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;

use super::read_input;
use crate::config::BridgeConfig;
use crate::webhook::sign;

/// sign 命令参数
#[derive(Args, Debug)]
pub struct SignArgs {
    /// payload 文件路径，`-` 表示 stdin
    pub input: PathBuf,
    /// 共享密钥（默认读取 WEBHOOK_SECRET）
    #[arg(long)]
    pub secret: Option<String>,
}

/// `--secret` 优先，其次使用配置中的密钥
fn resolve_secret(arg: Option<String>, config: &BridgeConfig) -> String {
    arg.unwrap_or_else(|| config.webhook_secret.clone())
}

/// 处理 sign 命令
pub fn handle_sign(args: SignArgs) -> Result<()> {
    let secret = resolve_secret(args.secret, &BridgeConfig::from_env());
    if secret.is_empty() {
        bail!("No secret given: pass --secret or set WEBHOOK_SECRET");
    }

    let body = read_input(&args.input)?;
    println!("{}", sign(&body, &secret));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_secret_prefers_argument() {
        let config = BridgeConfig {
            webhook_secret: "from-env".to_string(),
            ..BridgeConfig::default()
        };
        assert_eq!(resolve_secret(Some("cli".to_string()), &config), "cli");
    }

    #[test]
    fn test_resolve_secret_falls_back_to_config() {
        let config = BridgeConfig {
            webhook_secret: "s3cret".to_string(),
            ..BridgeConfig::default()
        };
        assert_eq!(resolve_secret(None, &config), "s3cret");
        assert_eq!(resolve_secret(None, &BridgeConfig::default()), "");
    }
}
