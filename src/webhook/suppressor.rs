//! 通知抑制 - 字段白名单 + 按 issue 防抖
//!
//! Plane 在一次编辑中可能连续推送多条 `updated` 事件（排序、状态 id 等），
//! 这里负责丢弃无意义字段，并保证同一 issue 在防抖窗口内最多通知一次。
//!
//! ## 防抖策略
//! 1. 以 issue id 为 key，记录最近一次被接受的秒级时间戳
//! 2. `now < last + window` 时丢弃
//! 3. 检查与写入在同一把锁内完成，并发请求不会同时通过
//! 4. map 超过容量阈值时顺带清理已过期记录

use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// 允许发送更新通知的字段
pub const WATCHED_FIELDS: &[&str] = &[
    "name",
    "priority",
    "state",
    "state_id",
    "assignee_ids",
    "target_date",
    "parent",
    "estimate_point",
];

/// 字段是否在白名单内
pub fn is_watched_field(field: &str) -> bool {
    WATCHED_FIELDS.contains(&field)
}

/// 默认防抖窗口（秒）
pub const DEFAULT_WINDOW_SECS: i64 = 2;

/// 触发过期清理的记录数阈值
const DEFAULT_EVICT_THRESHOLD: usize = 1024;

/// 按 issue 防抖的状态表
#[derive(Debug)]
pub struct DebounceState {
    /// issue_id -> 最近一次被接受的时间戳（秒）
    last_accepted: Mutex<HashMap<String, i64>>,
    /// 防抖窗口（秒）
    window_secs: i64,
    /// 记录数超过该值时清理过期项
    evict_threshold: usize,
}

impl DebounceState {
    /// 使用默认 2 秒窗口
    pub fn new() -> Self {
        Self {
            last_accepted: Mutex::new(HashMap::new()),
            window_secs: DEFAULT_WINDOW_SECS,
            evict_threshold: DEFAULT_EVICT_THRESHOLD,
        }
    }

    /// 设置防抖窗口
    pub fn with_window_secs(mut self, window_secs: i64) -> Self {
        self.window_secs = window_secs.max(0);
        self
    }

    /// 设置过期清理阈值
    pub fn with_evict_threshold(mut self, threshold: usize) -> Self {
        self.evict_threshold = threshold;
        self
    }

    pub fn window_secs(&self) -> i64 {
        self.window_secs
    }

    /// 检查并记录（使用当前时间）
    ///
    /// 返回 `true` 表示应该发送，`false` 表示在窗口内被抑制
    pub fn check_and_record(&self, issue_id: &str) -> bool {
        self.check_and_record_at(issue_id, chrono::Utc::now().timestamp())
    }

    /// 检查并记录（带时间戳，用于测试）
    pub fn check_and_record_at(&self, issue_id: &str, now: i64) -> bool {
        let mut map = self
            .last_accepted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(&last) = map.get(issue_id) {
            if now < last + self.window_secs {
                debug!(
                    issue_id = %issue_id,
                    elapsed_secs = now - last,
                    "Update debounced (same issue within window)"
                );
                return false;
            }
        }

        if map.len() >= self.evict_threshold {
            let window = self.window_secs;
            map.retain(|_, last| now < *last + window);
        }

        map.insert(issue_id.to_string(), now);
        true
    }

    /// 当前记录数
    pub fn len(&self) -> usize {
        self.last_accepted
            .lock()
            .map(|m| m.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DebounceState {
    fn default() -> Self {
        Self::new()
    }
}
