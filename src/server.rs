//! HTTP 入口 - 接收 Plane webhook，交给引擎处理后投递
//!
//! 路由：
//! - `POST /`、`POST /webhook`：webhook 入口
//! - `GET /health`：健康检查

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::delivery::DeliveryChannel;
use crate::webhook::{Outcome, WebhookEngine, SIGNATURE_HEADER};

/// 请求处理共享状态
pub struct AppState {
    pub engine: WebhookEngine,
    pub channel: Arc<dyn DeliveryChannel>,
}

impl AppState {
    pub fn new(engine: WebhookEngine, channel: Arc<dyn DeliveryChannel>) -> Self {
        Self { engine, channel }
    }
}

/// 构建路由
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handle_webhook))
        .route("/webhook", post(handle_webhook))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    match state.engine.process(&body, signature) {
        Outcome::Rejected => (StatusCode::FORBIDDEN, "Invalid signature"),
        Outcome::Emit(document) => {
            // 投递结果不影响对 Plane 的确认
            if let Err(e) = state.channel.send_async(document) {
                warn!(channel = state.channel.name(), error = %e, "Failed to hand off notification");
            }
            (StatusCode::OK, "OK")
        }
        other => {
            debug!(outcome = ?other, "Webhook acknowledged without notification");
            (StatusCode::OK, "OK")
        }
    }
}

/// Webhook bridge 服务
pub struct BridgeServer {
    state: Arc<AppState>,
    addr: String,
}

impl BridgeServer {
    pub fn new(config: &BridgeConfig, state: AppState) -> Self {
        Self {
            state: Arc::new(state),
            addr: format!("{}:{}", config.host, config.port),
        }
    }

    /// 启动服务，Ctrl-C 时优雅退出
    pub async fn run(self) -> Result<()> {
        let addr: SocketAddr = self
            .addr
            .parse()
            .with_context(|| format!("Invalid listen address: {}", self.addr))?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!(%addr, channel = self.state.channel.name(), "Webhook bridge listening");

        axum::serve(listener, build_router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server error")?;

        info!("Webhook bridge stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
