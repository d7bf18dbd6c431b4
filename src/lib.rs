//! Plane Discord Bridge - 把 Plane issue webhook 转发为 Discord embed

pub mod cli;
pub mod config;
pub mod delivery;
pub mod server;
pub mod webhook;

pub use config::BridgeConfig;
pub use delivery::{build_channel, DeliveryChannel, DiscordChannel, DryRunChannel, SendResult};
pub use server::{build_router, AppState, BridgeServer};
pub use webhook::{
    DebounceState, EngineConfig, InboundEvent, NotificationDocument, Outcome, WebhookEngine,
};
