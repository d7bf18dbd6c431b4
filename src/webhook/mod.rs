//! Plane webhook → 通知文档的转换核心
//!
//! 流程：签名校验 → 解析 → 分类 → 抑制（白名单 + 防抖）→ 规范化 → 渲染。
//!
//! # 使用示例
//! ```ignore
//! use plane_discord_bridge::webhook::{EngineConfig, Outcome, WebhookEngine};
//!
//! let engine = WebhookEngine::new(EngineConfig::default());
//! match engine.process(&body, &signature) {
//!     Outcome::Rejected => { /* 403 */ }
//!     Outcome::Emit(doc) => channel.send_async(doc)?,
//!     _ => {}
//! }
//! ```

pub mod document;
pub mod engine;
pub mod normalizer;
pub mod renderer;
pub mod signature;
pub mod suppressor;
pub mod value;

pub use document::{AccentColor, EmbedAuthor, EmbedField, EmbedFooter, EmbedThumbnail, NotificationDocument};
pub use engine::{EngineConfig, EventKind, InboundEvent, Outcome, SuppressReason, WebhookEngine};
pub use normalizer::{normalize, priority_label, NormalizedChange};
pub use renderer::{Actor, NotificationRenderer, RenderInput};
pub use signature::{sign, verify, SIGNATURE_HEADER};
pub use suppressor::{is_watched_field, DebounceState, WATCHED_FIELDS};
pub use value::{display_text, ValueExt, NONE_TEXT};
