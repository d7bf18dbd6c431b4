//! 进程配置 - 从环境变量读取
//!
//! | 变量 | 默认值 |
//! |------|--------|
//! | `WORKSPACE_NAME` | `Workspace` |
//! | `WEBHOOK_SECRET` | 空（关闭签名校验） |
//! | `DISCORD_WEBHOOK_URL` | 空（dry-run） |
//! | `APP_URL` | `https://plane.so` |
//! | `WEB_HOST` | `0.0.0.0` |
//! | `WEB_PORT` | `8080` |
//! | `DELIVERY_TIMEOUT_SECS` | `10` |

use tracing::warn;

use crate::webhook::normalizer::absolutize;
use crate::webhook::renderer::PLANE_ICON_PATH;
use crate::webhook::EngineConfig;

/// Bridge 配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub workspace_name: String,
    pub webhook_secret: String,
    pub discord_webhook_url: String,
    /// 应用地址（已去掉末尾 `/`）
    pub app_url: String,
    pub host: String,
    pub port: u16,
    pub delivery_timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            workspace_name: "Workspace".to_string(),
            webhook_secret: String::new(),
            discord_webhook_url: String::new(),
            app_url: "https://plane.so".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            delivery_timeout_secs: 10,
        }
    }
}

impl BridgeConfig {
    /// 从进程环境变量读取
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意 key 查找函数读取（便于测试）
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let string = |key: &str, fallback: String| lookup(key).unwrap_or(fallback);

        let port = match lookup("WEB_PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Invalid WEB_PORT, using default {}", defaults.port);
                defaults.port
            }),
            None => defaults.port,
        };

        let delivery_timeout_secs = match lookup("DELIVERY_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Invalid DELIVERY_TIMEOUT_SECS, using default");
                defaults.delivery_timeout_secs
            }),
            None => defaults.delivery_timeout_secs,
        };

        Self {
            workspace_name: string("WORKSPACE_NAME", defaults.workspace_name),
            webhook_secret: string("WEBHOOK_SECRET", defaults.webhook_secret),
            discord_webhook_url: string("DISCORD_WEBHOOK_URL", defaults.discord_webhook_url),
            app_url: string("APP_URL", defaults.app_url)
                .trim_end_matches('/')
                .to_string(),
            host: string("WEB_HOST", defaults.host),
            port,
            delivery_timeout_secs,
        }
    }

    /// 签名校验是否关闭
    pub fn verification_disabled(&self) -> bool {
        self.webhook_secret.is_empty()
    }

    /// Plane 图标地址，同时作为发送者头像
    pub fn plane_icon_url(&self) -> String {
        absolutize(&self.app_url, PLANE_ICON_PATH)
    }

    /// 引擎所需的配置子集
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            workspace_name: self.workspace_name.clone(),
            webhook_secret: self.webhook_secret.clone(),
            app_url: self.app_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = BridgeConfig::from_lookup(lookup(&[]));
        assert_eq!(config, BridgeConfig::default());
        assert!(config.verification_disabled());
        assert_eq!(config.plane_icon_url(), "https://plane.so/plane-icon.png");
    }

    #[test]
    fn test_reads_all_variables() {
        let config = BridgeConfig::from_lookup(lookup(&[
            ("WORKSPACE_NAME", "Acme"),
            ("WEBHOOK_SECRET", "s3cret"),
            ("DISCORD_WEBHOOK_URL", "https://discord.com/api/webhooks/1/abc"),
            ("APP_URL", "https://plane.acme.io/"),
            ("WEB_HOST", "127.0.0.1"),
            ("WEB_PORT", "9090"),
            ("DELIVERY_TIMEOUT_SECS", "3"),
        ]));

        assert_eq!(config.workspace_name, "Acme");
        assert!(!config.verification_disabled());
        assert_eq!(config.app_url, "https://plane.acme.io");
        assert_eq!(config.plane_icon_url(), "https://plane.acme.io/plane-icon.png");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9090);
        assert_eq!(config.delivery_timeout_secs, 3);

        let engine = config.engine_config();
        assert_eq!(engine.workspace_name, "Acme");
        assert_eq!(engine.webhook_secret, "s3cret");
        assert_eq!(engine.app_url, "https://plane.acme.io");
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = BridgeConfig::from_lookup(lookup(&[("WEB_PORT", "eighty")]));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_plane_icon_url_with_trailing_slash() {
        let config = BridgeConfig {
            app_url: "https://x.io/".to_string(),
            ..BridgeConfig::default()
        };
        assert_eq!(config.plane_icon_url(), "https://x.io/plane-icon.png");
    }
}
