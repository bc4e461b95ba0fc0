//! draftline：视频草稿编排服务。
//!
//! 本 crate 负责：草稿/轨道/片段的生命周期管理、素材下载状态跟踪、时间线切分工具，
//! 并通过 HTTP JSON 接口对外提供。
//!
//! 代码结构（读代码入口）：
//! - `base_system`：配置/日志等基础设施
//! - `timeline`：时间线切分引擎（纯计算）
//! - `draft`：草稿聚合、状态聚合、落盘与下载交接
//! - `response`：统一响应信封与错误码
//! - `web`：HTTP 服务

use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::Parser;
use crossbeam_channel as channel;
use tracing::info;

mod base_system;
mod draft;
mod response;
mod timeline;
mod web;

use base_system::config::load_or_create_with_base;
use base_system::context::Config;
use base_system::logging::{LogOptions, LogSystem};
use draft::{DownloadRequest, DraftStore, JsonDraftWriter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "draftline")]
#[command(about = "Draft orchestration service for timeline-based video drafts")]
struct Cli {
    /// 启用调试日志输出
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// 显示版本信息后退出
    #[arg(long, default_value_t = false)]
    version: bool,

    /// 数据目录路径（存放 config.yml、logs 与默认的 drafts 目录，方便 Docker 挂载）
    #[arg(long)]
    data_dir: Option<String>,

    /// 覆盖配置中的监听地址
    #[arg(long)]
    bind: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("draftline v{VERSION}");
        return Ok(());
    }

    let data_dir = cli.data_dir.as_deref().map(Path::new);
    let _log = init_logging(cli.debug, data_dir)?;

    let config = load_or_create_with_base::<Config>(None, data_dir)
        .map_err(|e| anyhow!(e.to_string()))?;
    config.validate().map_err(|e| anyhow!(e.to_string()))?;
    let default_lang = config.lang().map_err(|e| anyhow!(e.to_string()))?;

    let drafts_root = config.drafts_root(data_dir);
    std::fs::create_dir_all(&drafts_root)
        .map_err(|e| anyhow!("create drafts dir {}: {e}", drafts_root.display()))?;

    let (tx, rx) = channel::unbounded::<DownloadRequest>();
    let worker = draft::dispatch::spawn_handoff_worker(rx)?;

    let store = Arc::new(DraftStore::new(
        config.max_fps,
        Arc::new(tx),
        Arc::new(JsonDraftWriter::new(&drafts_root)),
    ));

    info!(
        target: "startup",
        "draftline v{VERSION}, drafts at {}, logs at {}",
        drafts_root.display(),
        _log.logs_dir().display()
    );

    let opts = web::ServeOptions {
        bind_raw: cli.bind.unwrap_or_else(|| config.bind_addr.clone()),
        default_lang,
        drafts_dir: drafts_root.to_string_lossy().into_owned(),
        max_fps: config.max_fps,
    };
    let served = web::run(opts, store);

    // 存储（及其持有的发送端）已随服务退出释放，等交接线程把剩余请求记完
    if worker.join().is_err() {
        tracing::warn!(target: "startup", "download handoff worker panicked");
    }
    served
}

fn init_logging(debug: bool, base_dir: Option<&Path>) -> Result<LogSystem> {
    let opts = LogOptions {
        debug,
        use_color: true,
        archive_on_exit: true,
        console: true,
    };
    LogSystem::init_with_base(opts, base_dir).map_err(|e| anyhow!(e))
}
