//! HTTP 服务：把草稿存储与时间线工具暴露为 JSON 接口。
//!
//! 所有接口统一返回 `{code, message, data}`，传输层状态码恒为 200。

mod extract;
mod router;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tracing::{info, warn};

use crate::draft::DraftStore;
use crate::response::Lang;
use state::{AppState, ConfigView};

const ADDR_ENV: &str = "DRAFTLINE_ADDR";

pub struct ServeOptions {
    pub bind_raw: String,
    pub default_lang: Lang,
    pub drafts_dir: String,
    pub max_fps: u32,
}

pub fn run(opts: ServeOptions, store: Arc<DraftStore>) -> Result<()> {
    let bind_raw = std::env::var(ADDR_ENV).unwrap_or(opts.bind_raw);
    let bind_addrs: Vec<SocketAddr> = parse_bind_addrs(&bind_raw)?;

    let view = ConfigView {
        drafts_dir: opts.drafts_dir,
        max_fps: opts.max_fps,
    };

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(run_async(bind_addrs, view, opts.default_lang, store))
}

fn parse_bind_addr(raw: &str) -> Result<SocketAddr> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(anyhow!("empty bind addr"));
    }

    if let Ok(a) = s.parse::<SocketAddr>() {
        return Ok(a);
    }

    // 兼容未加方括号的 IPv6，如 "::1:18423"
    if !s.starts_with('[')
        && let Some((host, port)) = s.rsplit_once(':')
        && host.contains(':')
        && !port.is_empty()
        && port.chars().all(|c| c.is_ascii_digit())
        && let Ok(a) = format!("[{host}]:{port}").parse::<SocketAddr>()
    {
        return Ok(a);
    }

    Err(anyhow!(
        "invalid bind address '{s}'. Use '127.0.0.1:18423' or '[::1]:18423'; separate multiple binds by comma."
    ))
}

fn parse_bind_addrs(raw: &str) -> Result<Vec<SocketAddr>> {
    let mut out = Vec::new();
    for part in raw.split([',', ';']).map(str::trim).filter(|s| !s.is_empty()) {
        let a = parse_bind_addr(part)?;
        if !out.contains(&a) {
            out.push(a);
        }
    }

    if out.is_empty() {
        return Err(anyhow!("no bind address configured (set {ADDR_ENV} or bind_addr)"));
    }
    Ok(out)
}

async fn run_async(
    bind_addrs: Vec<SocketAddr>,
    view: ConfigView,
    default_lang: Lang,
    store: Arc<DraftStore>,
) -> Result<()> {
    let state = AppState {
        bind_addrs: Arc::new(bind_addrs.clone()),
        config_view: Arc::new(view),
        default_lang,
        store,
    };

    let notify = Arc::new(tokio::sync::Notify::new());
    {
        let notify = notify.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            notify.notify_waiters();
        });
    }

    let mut servers = Vec::new();
    for bind in bind_addrs {
        let listener = match tokio::net::TcpListener::bind(bind).await {
            Ok(l) => l,
            Err(e) => {
                // 双栈系统上 [::] 可能已覆盖 0.0.0.0
                if !servers.is_empty() && e.kind() == std::io::ErrorKind::AddrInUse {
                    warn!(target: "web", bind = %bind, error = %e, "bind failed (AddrInUse), likely covered by another listener; skipping");
                    continue;
                }
                return Err(anyhow!(e).context(format!("bind failed: {bind}")));
            }
        };

        info!(target: "web", "listening on http://{bind}/ (set {ADDR_ENV} to override)");

        let app = router::build_router(state.clone());
        let notify = notify.clone();
        servers.push(tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                notify.notified().await;
            })
            .await
        }));
    }

    if servers.is_empty() {
        return Err(anyhow!("no listeners started (check {ADDR_ENV})"));
    }

    for h in servers {
        h.await
            .map_err(|e| anyhow!("server task join failed: {e}"))?
            .map_err(|e| anyhow!(e))?;
    }

    info!(target: "web", "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!(target: "web", "shutdown requested");
}
