//! 字段规范化 - 把 activity 中的原始值转换为人类可读的展示文本
//!
//! 每个需要特殊处理的字段对应 [`FIELD_RULES`] 中的一条规则，
//! 新增字段只需添加一条记录，不需要改动控制流。

use serde_json::{Map, Value};

use super::value::{ValueExt, NONE_TEXT};

/// 优先级词表
const PRIORITIES: &[(&str, &str)] = &[
    ("urgent", "🔴 Urgent!"),
    ("high", "🟠 High"),
    ("medium", "🟡 Medium"),
    ("low", "🔵 Low"),
    ("none", "⚫ None"),
];

/// 把优先级代码映射为展示文本，未知代码返回空字符串
pub fn priority_label(code: &str) -> &'static str {
    PRIORITIES
        .iter()
        .find(|(k, _)| *k == code)
        .map(|(_, v)| *v)
        .unwrap_or("")
}

/// 把根路径形式的 URL（`/a.png`）补全为绝对地址
pub fn absolutize(app_url: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{}{}", app_url.trim_end_matches('/'), path)
    } else {
        path.to_string()
    }
}

/// 从用户对象中取头像，`avatar` 优先，其次 `avatar_url`
pub fn avatar_of(user: &Map<String, Value>) -> &str {
    match user.str_at("avatar") {
        "" => user.str_at("avatar_url"),
        avatar => avatar,
    }
}

/// 规范化输入
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    pub raw_old: &'a str,
    pub raw_new: &'a str,
    pub data: &'a Map<String, Value>,
    pub app_url: &'a str,
}

/// 规范化结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedChange {
    /// 展示用字段名
    pub field: String,
    /// 字段名是否被规则改写（如 `assignee_ids` → `Assignees`）
    pub renamed: bool,
    pub old: String,
    pub new: String,
    /// 副作用：通知缩略图
    pub thumbnail: Option<String>,
}

type ValueMapper = fn(&FieldContext<'_>) -> String;
type ThumbnailHook = fn(&FieldContext<'_>) -> Option<String>;

struct FieldRule {
    field: &'static str,
    label: Option<&'static str>,
    old: ValueMapper,
    new: ValueMapper,
    thumbnail: Option<ThumbnailHook>,
}

const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: "priority",
        label: None,
        old: priority_old,
        new: priority_new,
        thumbnail: None,
    },
    FieldRule {
        field: "state",
        label: Some("State"),
        old: state_old,
        new: state_new,
        thumbnail: None,
    },
    FieldRule {
        field: "state_id",
        label: Some("State"),
        old: state_old,
        new: state_new,
        thumbnail: None,
    },
    FieldRule {
        field: "assignee_ids",
        label: Some("Assignees"),
        old: assignees_old,
        new: assignees_new,
        thumbnail: Some(assignee_thumbnail),
    },
];

fn was_unset(raw: &str) -> bool {
    matches!(raw.trim(), "" | NONE_TEXT | "null" | "[]")
}

fn priority_old(ctx: &FieldContext<'_>) -> String {
    priority_label(ctx.raw_old).to_string()
}

fn priority_new(ctx: &FieldContext<'_>) -> String {
    priority_label(ctx.raw_new).to_string()
}

fn state_old(ctx: &FieldContext<'_>) -> String {
    if was_unset(ctx.raw_old) {
        NONE_TEXT.to_string()
    } else {
        "Changed".to_string()
    }
}

fn state_new(ctx: &FieldContext<'_>) -> String {
    ["state", "state_detail"]
        .iter()
        .map(|key| ctx.data.map_at(key).str_at("name"))
        .find(|name| !name.is_empty())
        .unwrap_or(NONE_TEXT)
        .to_string()
}

fn assignees(data: &Map<String, Value>) -> &[Value] {
    match data.seq_at("assignees") {
        [] => data.seq_at("assignee_details"),
        list => list,
    }
}

fn assignees_old(ctx: &FieldContext<'_>) -> String {
    if was_unset(ctx.raw_old) {
        NONE_TEXT.to_string()
    } else {
        "Previously set".to_string()
    }
}

fn assignees_new(ctx: &FieldContext<'_>) -> String {
    let names: Vec<&str> = assignees(ctx.data)
        .iter()
        .map(|a| a.str_at("display_name"))
        .filter(|name| !name.is_empty())
        .collect();

    if names.is_empty() {
        NONE_TEXT.to_string()
    } else {
        names.join(", ")
    }
}

fn assignee_thumbnail(ctx: &FieldContext<'_>) -> Option<String> {
    let first = assignees(ctx.data).first()?.as_object()?;
    match avatar_of(first) {
        "" => None,
        avatar => Some(absolutize(ctx.app_url, avatar)),
    }
}

/// 规范化一条字段变更
pub fn normalize(
    field: &str,
    raw_old: &str,
    raw_new: &str,
    data: &Map<String, Value>,
    app_url: &str,
) -> NormalizedChange {
    let ctx = FieldContext {
        raw_old,
        raw_new,
        data,
        app_url,
    };

    match FIELD_RULES.iter().find(|rule| rule.field == field) {
        Some(rule) => NormalizedChange {
            field: rule.label.unwrap_or(rule.field).to_string(),
            renamed: rule.label.is_some(),
            old: (rule.old)(&ctx),
            new: (rule.new)(&ctx),
            thumbnail: rule.thumbnail.and_then(|hook| hook(&ctx)),
        },
        None => NormalizedChange {
            field: field.to_string(),
            renamed: false,
            old: raw_old.to_string(),
            new: raw_new.to_string(),
            thumbnail: None,
        },
    }
}
