//! 宽松 JSON 取值
//!
//! Plane 推送的 payload 结构不稳定：字段可能缺失、可能为 null、也可能类型不符。
//! 这里的访问器全部是全函数，类型不符时返回零值，从不报错。

use serde_json::{Map, Value};
use std::sync::OnceLock;

/// 缺失或 null 值的统一文本表示
pub const NONE_TEXT: &str = "None";

fn empty_map() -> &'static Map<String, Value> {
    static EMPTY: OnceLock<Map<String, Value>> = OnceLock::new();
    EMPTY.get_or_init(Map::new)
}

/// 把任意 JSON 值转为展示文本
///
/// - 字符串原样返回
/// - 数字、布尔值使用规范文本
/// - 数组、对象序列化为紧凑 JSON
/// - 缺失或 null 返回 [`NONE_TEXT`]
pub fn display_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NONE_TEXT.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// 宽松取值 trait，`Value` 和 `Map` 均实现
pub trait ValueExt {
    /// 按 key 取原始值
    fn value_at(&self, key: &str) -> Option<&Value>;

    /// 字符串字段，缺失或非字符串时返回 `""`
    fn str_at(&self, key: &str) -> &str {
        self.value_at(key).and_then(Value::as_str).unwrap_or("")
    }

    /// 展示文本，见 [`display_text`]
    fn text_at(&self, key: &str) -> String {
        display_text(self.value_at(key))
    }

    /// 子对象，缺失或非对象时返回空 map
    fn map_at(&self, key: &str) -> &Map<String, Value> {
        self.value_at(key)
            .and_then(Value::as_object)
            .unwrap_or(empty_map())
    }

    /// 数组字段，缺失或非数组时返回空切片
    fn seq_at(&self, key: &str) -> &[Value] {
        self.value_at(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl ValueExt for Value {
    fn value_at(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|m| m.get(key))
    }
}

impl ValueExt for Map<String, Value> {
    fn value_at(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}
