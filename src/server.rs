use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Every ten minutes, on the minute
pub const SELF_PING_CRON: &str = "0 */10 * * * *";
const SELF_PING_TIMEOUT: Duration = Duration::from_secs(30);

/// Uptime and last-request bookkeeping for the keep-alive endpoints
pub struct ServerState {
    started: Instant,
    last_activity: RwLock<DateTime<Utc>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            last_activity: RwLock::new(Utc::now()),
        }
    }

    pub async fn touch(&self) {
        *self.last_activity.write().await = Utc::now();
    }

    pub async fn last_activity(&self) -> DateTime<Utc> {
        *self.last_activity.read().await
    }

    /// Uptime as "Xh Ym"
    pub fn uptime(&self) -> String {
        let minutes = self.started.elapsed().as_secs() / 60;
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

type SharedState = Arc<ServerState>;

async fn track_activity(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    state.touch().await;
    next.run(request).await
}

async fn root() -> &'static str {
    "Bot is running!"
}

async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    let last_activity = state.last_activity().await;
    Json(json!({
        "status": "healthy",
        "bot": "running",
        "uptime": state.uptime(),
        "lastActivity": last_activity.to_rfc3339_opts(SecondsFormat::Millis, true),
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

async fn ping() -> &'static str {
    info!("🏓 Ping received - staying awake!");
    "pong"
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ping", get(ping))
        .layer(middleware::from_fn_with_state(state.clone(), track_activity))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the keep-alive endpoints on all interfaces
pub async fn serve(port: u16, state: SharedState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("✅ Keep-alive server started on port {}", port);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// GET the deployment's own health URL so the host does not idle it out
pub async fn self_ping(client: &reqwest::Client, url: &str) -> anyhow::Result<()> {
    let resp = client
        .get(url)
        .timeout(SELF_PING_TIMEOUT)
        .send()
        .await
        .with_context(|| format!("Self-ping to {} failed", url))?;

    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("Self-ping to {} returned {}", url, status);
    }

    let body: Value = resp.json().await.unwrap_or_default();
    info!(
        "🏓 Self-ping successful: {}",
        body["status"].as_str().unwrap_or("ok")
    );
    Ok(())
}

/// Schedule `self_ping` against `url` on `SELF_PING_CRON`
pub async fn start_self_ping(url: String) -> anyhow::Result<JobScheduler> {
    let client = reqwest::Client::new();
    let url: Arc<str> = url.into();

    let scheduler = JobScheduler::new().await?;
    let job = Job::new_async(SELF_PING_CRON, move |_uuid, _lock| {
        let client = client.clone();
        let url = url.clone();
        Box::pin(async move {
            if let Err(e) = self_ping(&client, &url).await {
                error!("❌ Self-ping failed: {:#}", e);
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    info!("🏓 Self-ping scheduled every 10 minutes");
    Ok(scheduler)
}
