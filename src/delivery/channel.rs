//! 投递渠道 trait 定义

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::webhook::NotificationDocument;

/// 以谁的身份在频道中发言
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderIdentity {
    pub username: String,
    pub avatar_url: String,
}

impl SenderIdentity {
    /// 默认以 "Plane" 身份发送，头像使用应用地址下的图标
    pub fn plane(icon_url: impl Into<String>) -> Self {
        Self {
            username: "Plane".to_string(),
            avatar_url: icon_url.into(),
        }
    }
}

/// Discord incoming webhook 请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscordMessage {
    pub username: String,
    pub avatar_url: String,
    pub embeds: Vec<NotificationDocument>,
}

impl DiscordMessage {
    /// 把单个文档包装为 webhook 消息
    pub fn wrap(sender: &SenderIdentity, document: NotificationDocument) -> Self {
        Self {
            username: sender.username.clone(),
            avatar_url: sender.avatar_url.clone(),
            embeds: vec![document],
        }
    }
}

/// 发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    /// 发送成功
    Sent,
    /// 跳过（dry-run 等）
    Skipped(String),
    /// 对端返回失败
    Failed(String),
}

/// 投递渠道
///
/// `send_async` 只负责把发送任务交出去，失败仅记录日志，不影响调用方。
pub trait DeliveryChannel: Send + Sync {
    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 异步发送（spawn 后立即返回）
    fn send_async(&self, document: NotificationDocument) -> Result<()>;
}
