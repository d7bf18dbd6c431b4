//! 事件转换引擎
//!
//! 串联整个流程：校验签名 → 解析 → 分类 → 抑制 → 规范化 → 渲染 → 发送/丢弃。
//! 引擎本身不做 I/O，发送由调用方交给 [`crate::delivery::DeliveryChannel`]。

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::document::NotificationDocument;
use super::normalizer::{normalize, priority_label};
use super::renderer::{Actor, NotificationRenderer, RenderInput};
use super::signature;
use super::suppressor::{is_watched_field, DebounceState};
use super::value::ValueExt;

/// 解析后的入站事件
///
/// 非法 JSON 或非对象根节点都退化为空事件，后续分类会得到 `Unhandled`。
#[derive(Debug, Clone, Default)]
pub struct InboundEvent {
    root: Value,
}

impl InboundEvent {
    /// 从原始 body 解析
    pub fn parse(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(root @ Value::Object(_)) => Self { root },
            Ok(_) => {
                debug!("Payload root is not an object, treating as empty event");
                Self::default()
            }
            Err(e) => {
                debug!(error = %e, "Malformed payload, treating as empty event");
                Self::default()
            }
        }
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn event(&self) -> &str {
        self.root.str_at("event")
    }

    pub fn action(&self) -> &str {
        self.root.str_at("action")
    }

    pub fn data(&self) -> &Map<String, Value> {
        self.root.map_at("data")
    }

    pub fn activity(&self) -> &Map<String, Value> {
        self.root.map_at("activity")
    }

    /// 触发者：优先 `activity.actor`，其次 `data.actor_detail`
    pub fn actor(&self) -> Option<Actor> {
        Actor::from_user(self.activity().map_at("actor"))
            .or_else(|| Actor::from_user(self.data().map_at("actor_detail")))
    }
}

/// 事件分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    IssueCreated,
    IssueDeleted,
    IssueUpdated,
    IssueComment,
}

impl EventKind {
    /// 根据 (event, action) 分类，未知组合返回 `None`
    pub fn classify(event: &str, action: &str) -> Option<Self> {
        match (event, action) {
            ("issue", "created") => Some(EventKind::IssueCreated),
            ("issue", "deleted") => Some(EventKind::IssueDeleted),
            ("issue", "updated") => Some(EventKind::IssueUpdated),
            ("issue_comment", _) => Some(EventKind::IssueComment),
            _ => None,
        }
    }
}

/// 抑制原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressReason {
    /// 变更字段不在白名单内
    IgnoredField(String),
    /// 同一 issue 在防抖窗口内已通知
    Debounced(String),
}

/// 处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// 签名校验失败，调用方应返回 403
    Rejected,
    /// 未识别的事件，静默确认
    Unhandled { event: String, action: String },
    /// 被抑制，静默确认
    Suppressed(SuppressReason),
    /// 渲染结果既无标题也无描述
    Discarded,
    /// 需要发送的通知
    Emit(NotificationDocument),
}

impl Outcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected)
    }

    /// 取出要发送的文档
    pub fn into_document(self) -> Option<NotificationDocument> {
        match self {
            Outcome::Emit(doc) => Some(doc),
            _ => None,
        }
    }
}

/// 引擎配置
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 工作区显示名
    pub workspace_name: String,
    /// 共享密钥，为空时关闭签名校验
    pub webhook_secret: String,
    /// 应用地址，用于补全根路径头像
    pub app_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workspace_name: "Workspace".to_string(),
            webhook_secret: String::new(),
            app_url: "https://plane.so".to_string(),
        }
    }
}

/// 事件转换引擎
#[derive(Debug, Clone)]
pub struct WebhookEngine {
    config: EngineConfig,
    renderer: NotificationRenderer,
    debounce: Arc<DebounceState>,
}

impl WebhookEngine {
    /// 使用独立的防抖状态创建引擎
    pub fn new(config: EngineConfig) -> Self {
        Self::with_debounce(config, Arc::new(DebounceState::new()))
    }

    /// 注入防抖状态
    pub fn with_debounce(config: EngineConfig, debounce: Arc<DebounceState>) -> Self {
        let renderer = NotificationRenderer::new(&config.workspace_name, &config.app_url);
        Self {
            config,
            renderer,
            debounce,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn renderer(&self) -> &NotificationRenderer {
        &self.renderer
    }

    /// 处理一次入站请求
    pub fn process(&self, body: &[u8], signature: &str) -> Outcome {
        if !signature::verify(body, signature, &self.config.webhook_secret) {
            warn!(body_len = body.len(), "Invalid webhook signature");
            return Outcome::Rejected;
        }

        self.transform(&InboundEvent::parse(body))
    }

    /// 转换已通过认证的事件
    pub fn transform(&self, event: &InboundEvent) -> Outcome {
        let Some(kind) = EventKind::classify(event.event(), event.action()) else {
            debug!(
                event = event.event(),
                action = event.action(),
                "Unhandled webhook event"
            );
            return Outcome::Unhandled {
                event: event.event().to_string(),
                action: event.action().to_string(),
            };
        };

        let input = match self.build_input(kind, event) {
            Ok(input) => input,
            Err(reason) => {
                debug!(?reason, "Notification suppressed");
                return Outcome::Suppressed(reason);
            }
        };

        let actor = event.actor();
        let doc = self.renderer.render(&input, actor.as_ref());

        if doc.is_empty() {
            debug!(?kind, "Rendered notification has no title or description, discarding");
            return Outcome::Discarded;
        }

        info!(
            ?kind,
            title = doc.title.as_deref().unwrap_or(""),
            actor = actor.as_ref().map(|a| a.display_name.as_str()).unwrap_or(""),
            "Notification ready"
        );
        Outcome::Emit(doc)
    }

    fn build_input(&self, kind: EventKind, event: &InboundEvent) -> Result<RenderInput, SuppressReason> {
        let data = event.data();

        let input = match kind {
            EventKind::IssueCreated => RenderInput::IssueCreated {
                name: data.str_at("name").to_string(),
                description: data.str_at("description_stripped").to_string(),
                priority: priority_label(data.str_at("priority")).to_string(),
            },
            EventKind::IssueDeleted => RenderInput::IssueDeleted {
                issue_id: data.text_at("id"),
            },
            EventKind::IssueUpdated => {
                let activity = event.activity();
                let field = activity.text_at("field");

                if !is_watched_field(&field) {
                    return Err(SuppressReason::IgnoredField(field));
                }

                let issue_id = data.text_at("id");
                if !self.debounce.check_and_record(&issue_id) {
                    return Err(SuppressReason::Debounced(issue_id));
                }

                let change = normalize(
                    &field,
                    &activity.text_at("old_value"),
                    &activity.text_at("new_value"),
                    data,
                    &self.config.app_url,
                );
                RenderInput::IssueUpdated {
                    name: data.str_at("name").to_string(),
                    change,
                }
            }
            EventKind::IssueComment => RenderInput::Commented {
                issue_name: data.map_at("issue_detail").str_at("name").to_string(),
                issue_id: data.text_at("issue"),
                body: data.str_at("comment_stripped").to_string(),
            },
        };

        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::document::EmbedField;
    use serde_json::json;

    fn engine() -> WebhookEngine {
        WebhookEngine::new(EngineConfig {
            workspace_name: "Acme".to_string(),
            webhook_secret: String::new(),
            app_url: "https://plane.example.com".to_string(),
        })
    }

    fn run(engine: &WebhookEngine, payload: Value) -> Outcome {
        engine.transform(&InboundEvent::from_value(payload))
    }

    fn update(id: &str, field: &str) -> Value {
        json!({
            "event": "issue",
            "action": "updated",
            "data": {"id": id, "name": "Fix bug", "priority": "low"},
            "activity": {"field": field, "old_value": "high", "new_value": "low"}
        })
    }

    #[test]
    fn test_parse_malformed_json_is_empty_event() {
        let event = InboundEvent::parse(b"{not json");
        assert_eq!(event.event(), "");
        assert_eq!(event.action(), "");
        assert!(event.data().is_empty());

        let event = InboundEvent::parse(b"[1,2]");
        assert!(event.activity().is_empty());
    }

    #[test]
    fn test_classify() {
        assert_eq!(EventKind::classify("issue", "created"), Some(EventKind::IssueCreated));
        assert_eq!(EventKind::classify("issue", "deleted"), Some(EventKind::IssueDeleted));
        assert_eq!(EventKind::classify("issue", "updated"), Some(EventKind::IssueUpdated));
        assert_eq!(EventKind::classify("issue_comment", "created"), Some(EventKind::IssueComment));
        assert_eq!(EventKind::classify("issue", "archived"), None);
        assert_eq!(EventKind::classify("project", "created"), None);
        assert_eq!(EventKind::classify("", ""), None);
    }

    #[test]
    fn test_created_scenario() {
        let outcome = run(
            &engine(),
            json!({
                "event": "issue",
                "action": "created",
                "data": {"id": "1", "name": "Fix bug", "description_stripped": "desc", "priority": "high"}
            }),
        );

        let doc = outcome.into_document().expect("should emit");
        assert_eq!(doc.title.as_deref(), Some("Fix bug"));
        assert_eq!(doc.description.as_deref(), Some("desc"));
        assert_eq!(doc.fields, vec![EmbedField::inline("Priority", "🟠 High")]);
    }

    #[test]
    fn test_assignee_scenario() {
        let outcome = run(
            &engine(),
            json!({
                "event": "issue",
                "action": "updated",
                "data": {
                    "id": "7",
                    "name": "Fix bug",
                    "assignees": [{"display_name": "Ann", "avatar": "/a.png"}]
                },
                "activity": {"field": "assignee_ids", "old_value": "[]", "new_value": "[2]"}
            }),
        );

        let doc = outcome.into_document().expect("should emit");
        assert_eq!(doc.fields, vec![EmbedField::new("Assignees", "`None` → `Ann`")]);
        assert_eq!(
            doc.thumbnail.map(|t| t.url).as_deref(),
            Some("https://plane.example.com/a.png")
        );
    }

    #[test]
    fn test_assignees_from_assignee_details() {
        let outcome = run(
            &engine(),
            json!({
                "event": "issue",
                "action": "updated",
                "data": {
                    "id": "8",
                    "name": "Fix bug",
                    "assignee_details": [{"display_name": "Cid", "avatar": "/c.png"}]
                },
                "activity": {"field": "assignee_ids", "old_value": "[]", "new_value": "[3]"}
            }),
        );

        let doc = outcome.into_document().expect("should emit");
        assert_eq!(doc.fields, vec![EmbedField::new("Assignees", "`None` → `Cid`")]);
        assert_eq!(
            doc.thumbnail.map(|t| t.url).as_deref(),
            Some("https://plane.example.com/c.png")
        );
    }

    #[test]
    fn test_whitelist_drops_noise() {
        let engine = engine();
        assert_eq!(
            run(&engine, update("1", "sort_order")),
            Outcome::Suppressed(SuppressReason::IgnoredField("sort_order".to_string()))
        );
        // 被丢弃的字段不占用防抖窗口
        assert!(matches!(run(&engine, update("1", "priority")), Outcome::Emit(_)));
    }

    #[test]
    fn test_debounce_same_issue() {
        let engine = engine();
        assert!(matches!(run(&engine, update("1", "priority")), Outcome::Emit(_)));
        assert_eq!(
            run(&engine, update("1", "name")),
            Outcome::Suppressed(SuppressReason::Debounced("1".to_string()))
        );
        // 不同 issue 不受影响
        assert!(matches!(run(&engine, update("2", "name")), Outcome::Emit(_)));
    }

    #[test]
    fn test_debounce_state_is_injected() {
        let shared = Arc::new(DebounceState::new());
        let a = WebhookEngine::with_debounce(EngineConfig::default(), Arc::clone(&shared));
        let b = WebhookEngine::with_debounce(EngineConfig::default(), Arc::clone(&shared));

        assert!(matches!(run(&a, update("9", "name")), Outcome::Emit(_)));
        assert!(matches!(run(&b, update("9", "name")), Outcome::Suppressed(_)));
        assert_eq!(shared.len(), 1);
    }

    #[test]
    fn test_numeric_issue_id_is_debounce_key() {
        let engine = engine();
        let mut payload = update("x", "name");
        payload["data"]["id"] = json!(42);
        assert!(matches!(run(&engine, payload.clone()), Outcome::Emit(_)));
        assert_eq!(
            run(&engine, payload),
            Outcome::Suppressed(SuppressReason::Debounced("42".to_string()))
        );
    }

    #[test]
    fn test_deleted() {
        let doc = run(
            &engine(),
            json!({"event": "issue", "action": "deleted", "data": {"id": "abc"}}),
        )
        .into_document()
        .unwrap();
        assert_eq!(doc.description.as_deref(), Some("ID: `abc`"));
    }

    #[test]
    fn test_unhandled_events() {
        let engine = engine();
        assert_eq!(
            run(&engine, json!({"event": "project", "action": "created"})),
            Outcome::Unhandled {
                event: "project".to_string(),
                action: "created".to_string()
            }
        );
        assert!(matches!(
            run(&engine, json!({"event": "issue", "action": 5})),
            Outcome::Unhandled { .. }
        ));
        assert!(matches!(
            engine.transform(&InboundEvent::parse(b"garbage")),
            Outcome::Unhandled { .. }
        ));
    }

    #[test]
    fn test_empty_comment_discarded() {
        let outcome = run(
            &engine(),
            json!({"event": "issue_comment", "action": "created", "data": {"issue": "5", "comment_stripped": ""}}),
        );
        assert_eq!(outcome, Outcome::Discarded);
    }

    #[test]
    fn test_comment_with_issue_title() {
        let doc = run(
            &engine(),
            json!({
                "event": "issue_comment",
                "action": "created",
                "data": {"issue": "5", "comment_stripped": "", "issue_detail": {"name": "Fix bug"}},
                "activity": {"actor": {"display_name": "Ann", "avatar_url": "https://cdn/ann.png"}}
            }),
        )
        .into_document()
        .unwrap();
        assert_eq!(doc.title.as_deref(), Some("Fix bug"));
        assert_eq!(doc.fields, vec![EmbedField::inline("Issue ID", "5")]);
        let author = doc.author.unwrap();
        assert_eq!(author.name, "Ann commented");
        assert_eq!(author.icon_url, "https://cdn/ann.png");
    }

    #[test]
    fn test_comment_actor_from_actor_detail() {
        let doc = run(
            &engine(),
            json!({
                "event": "issue_comment",
                "action": "created",
                "data": {
                    "issue": "5",
                    "comment_stripped": "Looks good",
                    "actor_detail": {"display_name": "Bob", "avatar": "/bob.png"}
                }
            }),
        )
        .into_document()
        .unwrap();
        let author = doc.author.unwrap();
        assert_eq!(author.name, "Bob commented");
        assert_eq!(author.icon_url, "https://plane.example.com/bob.png");
    }

    #[test]
    fn test_created_without_name_or_description_discarded() {
        let outcome = run(
            &engine(),
            json!({"event": "issue", "action": "created", "data": {"priority": "high"}}),
        );
        assert_eq!(outcome, Outcome::Discarded);
    }

    #[test]
    fn test_process_checks_signature() {
        let engine = WebhookEngine::new(EngineConfig {
            webhook_secret: "s3cret".to_string(),
            ..EngineConfig::default()
        });
        let body = br#"{"event":"issue","action":"deleted","data":{"id":"1"}}"#;

        assert!(engine.process(body, "deadbeef").is_rejected());

        let sig = signature::sign(body, "s3cret");
        assert!(matches!(engine.process(body, &sig), Outcome::Emit(_)));
    }

    #[test]
    fn test_rejected_request_has_no_side_effects() {
        let debounce = Arc::new(DebounceState::new());
        let engine = WebhookEngine::with_debounce(
            EngineConfig {
                webhook_secret: "s3cret".to_string(),
                ..EngineConfig::default()
            },
            Arc::clone(&debounce),
        );
        let body = serde_json::to_vec(&update("1", "name")).unwrap();

        assert!(engine.process(&body, "wrong").is_rejected());
        assert!(debounce.is_empty());
    }
}
