//! 通知文档 - 与平台无关的富消息卡片，序列化后即 Discord embed

use serde::{Deserialize, Serialize};

/// 强调色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccentColor {
    /// 新建
    Created,
    /// 删除
    Deleted,
    /// 更新 / 评论
    Activity,
}

impl AccentColor {
    /// Discord 使用的整数色值
    pub fn code(self) -> u32 {
        match self {
            AccentColor::Created => 8_184_715,
            AccentColor::Deleted => 16_415_088,
            AccentColor::Activity => 4_093_438,
        }
    }
}

/// 作者块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedAuthor {
    pub name: String,
    pub icon_url: String,
}

/// 页脚
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    pub icon_url: String,
}

/// 缩略图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedThumbnail {
    pub url: String,
}

/// 字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: false,
        }
    }

    pub fn inline(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            inline: true,
            ..Self::new(name, value)
        }
    }
}

/// 渲染后的通知文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

impl NotificationDocument {
    /// 创建只有颜色的空文档
    pub fn new(color: AccentColor) -> Self {
        Self {
            title: None,
            description: None,
            color: color.code(),
            author: None,
            thumbnail: None,
            footer: None,
            fields: Vec::new(),
        }
    }

    /// 设置标题，空字符串视为无标题
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = non_empty(title.into());
        self
    }

    /// 设置描述，空字符串视为无描述
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description.into());
        self
    }

    pub fn with_author(mut self, name: impl Into<String>, icon_url: impl Into<String>) -> Self {
        self.author = Some(EmbedAuthor {
            name: name.into(),
            icon_url: icon_url.into(),
        });
        self
    }

    pub fn with_thumbnail(mut self, url: Option<String>) -> Self {
        self.thumbnail = url.and_then(non_empty).map(|url| EmbedThumbnail { url });
        self
    }

    pub fn with_footer(mut self, text: impl Into<String>, icon_url: impl Into<String>) -> Self {
        self.footer = Some(EmbedFooter {
            text: text.into(),
            icon_url: icon_url.into(),
        });
        self
    }

    pub fn with_field(mut self, field: EmbedField) -> Self {
        self.fields.push(field);
        self
    }

    /// 标题和描述都为空的文档不应发送
    pub fn is_empty(&self) -> bool {
        let blank = |s: &Option<String>| s.as_deref().map_or(true, |s| s.trim().is_empty());
        blank(&self.title) && blank(&self.description)
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
