//! 素材下载交接。
//!
//! 核心层只负责把带素材 URL 的片段交给外部下载方；下载方通过
//! `update_segment_status` 回报进度。

use std::thread::JoinHandle;

use crossbeam_channel as channel;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::models::SegmentType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadRequest {
    pub segment_id: String,
    pub segment_type: SegmentType,
    pub material_url: String,
}

pub trait DownloadDispatcher: Send + Sync {
    fn dispatch(&self, req: DownloadRequest);
}

impl DownloadDispatcher for channel::Sender<DownloadRequest> {
    fn dispatch(&self, req: DownloadRequest) {
        let segment_id = req.segment_id.clone();
        if self.send(req).is_err() {
            warn!(target: "download", %segment_id, "download worker is gone, request dropped");
        }
    }
}

#[cfg(test)]
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDispatcher;

#[cfg(test)]
impl DownloadDispatcher for NoopDispatcher {
    fn dispatch(&self, req: DownloadRequest) {
        debug!(target: "download", segment_id = %req.segment_id, "noop dispatch");
    }
}

/// 启动交接线程：逐条消费请求并记录日志，发送端全部关闭后退出。
pub fn spawn_handoff_worker(rx: channel::Receiver<DownloadRequest>) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("download-handoff".to_string())
        .spawn(move || {
            for req in rx.iter() {
                info!(
                    target: "download",
                    segment_id = %req.segment_id,
                    segment_type = %req.segment_type,
                    url = %req.material_url,
                    "material handed off"
                );
            }
            debug!(target: "download", "handoff channel closed");
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_forwards_requests() {
        let (tx, rx) = channel::unbounded::<DownloadRequest>();
        tx.dispatch(DownloadRequest {
            segment_id: "s1".into(),
            segment_type: SegmentType::Audio,
            material_url: "https://example.com/a.mp3".into(),
        });
        assert_eq!(rx.try_recv().unwrap().segment_id, "s1");
    }

    #[test]
    fn worker_exits_when_senders_drop() {
        let (tx, rx) = channel::unbounded::<DownloadRequest>();
        let handle = spawn_handoff_worker(rx).unwrap();
        tx.dispatch(DownloadRequest {
            segment_id: "s2".into(),
            segment_type: SegmentType::Video,
            material_url: "https://example.com/v.mp4".into(),
        });
        drop(tx);
        handle.join().unwrap();
    }
}
