//! 通知渲染 - 把分类、规范化后的事件转换为 [`NotificationDocument`]
//!
//! 纯函数，不读取时间、不访问共享状态。

use serde_json::{Map, Value};

use super::document::{AccentColor, EmbedField, NotificationDocument};
use super::normalizer::{absolutize, avatar_of, NormalizedChange};
use super::value::ValueExt;

/// Plane 图标相对于应用地址的路径
pub const PLANE_ICON_PATH: &str = "/plane-icon.png";

/// 触发事件的用户
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub display_name: String,
    /// 头像地址（可能为根路径形式）
    pub avatar: Option<String>,
}

impl Actor {
    /// 从用户对象解析，`display_name` 为空时返回 `None`
    pub fn from_user(user: &Map<String, Value>) -> Option<Self> {
        let display_name = user.str_at("display_name");
        if display_name.is_empty() {
            return None;
        }

        let avatar = match avatar_of(user) {
            "" => None,
            avatar => Some(avatar.to_string()),
        };

        Some(Self {
            display_name: display_name.to_string(),
            avatar,
        })
    }
}

/// 渲染输入
#[derive(Debug, Clone, PartialEq)]
pub enum RenderInput {
    /// issue 新建
    IssueCreated {
        name: String,
        description: String,
        priority: String,
    },
    /// issue 删除
    IssueDeleted { issue_id: String },
    /// issue 字段变更
    IssueUpdated {
        name: String,
        change: NormalizedChange,
    },
    /// issue 评论
    Commented {
        issue_name: String,
        issue_id: String,
        body: String,
    },
}

impl RenderInput {
    /// 作者块中使用的动作短语
    fn verb(&self) -> &'static str {
        match self {
            RenderInput::IssueCreated { .. } => "created an issue",
            RenderInput::IssueDeleted { .. } => "deleted an issue",
            RenderInput::IssueUpdated { .. } => "updated an issue",
            RenderInput::Commented { .. } => "commented",
        }
    }

    fn color(&self) -> AccentColor {
        match self {
            RenderInput::IssueCreated { .. } => AccentColor::Created,
            RenderInput::IssueDeleted { .. } => AccentColor::Deleted,
            RenderInput::IssueUpdated { .. } | RenderInput::Commented { .. } => {
                AccentColor::Activity
            }
        }
    }
}

/// 通知渲染器
#[derive(Debug, Clone)]
pub struct NotificationRenderer {
    workspace_name: String,
    app_url: String,
}

impl NotificationRenderer {
    pub fn new(workspace_name: impl Into<String>, app_url: impl Into<String>) -> Self {
        Self {
            workspace_name: workspace_name.into(),
            app_url: app_url.into(),
        }
    }

    /// Plane 图标的绝对地址
    pub fn plane_icon(&self) -> String {
        absolutize(&self.app_url, PLANE_ICON_PATH)
    }

    fn default_author(&self, input: &RenderInput) -> String {
        match input {
            RenderInput::IssueDeleted { .. } => "Work item deleted".to_string(),
            RenderInput::Commented { .. } => "New Comment".to_string(),
            _ => format!("Update in {}", self.workspace_name),
        }
    }

    /// 渲染通知文档
    pub fn render(&self, input: &RenderInput, actor: Option<&Actor>) -> NotificationDocument {
        let (author_name, author_icon) = match actor {
            Some(actor) => (
                format!("{} {}", actor.display_name, input.verb()),
                actor
                    .avatar
                    .as_deref()
                    .map(|a| absolutize(&self.app_url, a))
                    .unwrap_or_else(|| self.plane_icon()),
            ),
            None => (self.default_author(input), self.plane_icon()),
        };

        let doc = NotificationDocument::new(input.color())
            .with_author(author_name, author_icon)
            .with_footer(self.workspace_name.clone(), self.plane_icon());

        match input {
            RenderInput::IssueCreated {
                name,
                description,
                priority,
            } => doc
                .with_title(name.clone())
                .with_description(description.clone())
                .with_field(EmbedField::inline("Priority", priority.clone())),
            RenderInput::IssueDeleted { issue_id } => {
                doc.with_description(format!("ID: `{}`", issue_id))
            }
            RenderInput::IssueUpdated { name, change } => {
                let field_name = if change.renamed {
                    change.field.as_str()
                } else {
                    "Change"
                };
                doc.with_title(name.clone())
                    .with_description(format!("Field **{}** changed.", change.field))
                    .with_thumbnail(change.thumbnail.clone())
                    .with_field(EmbedField::new(
                        field_name,
                        format!("`{}` → `{}`", change.old, change.new),
                    ))
            }
            RenderInput::Commented {
                issue_name,
                issue_id,
                body,
            } => doc
                .with_title(issue_name.clone())
                .with_description(body.clone())
                .with_field(EmbedField::inline("Issue ID", issue_id.clone())),
        }
    }
}
