//! 状态聚合：把草稿快照投影成对外的只读视图。
//!
//! 计数从不缓存，每次查询都重新遍历。

use serde::Serialize;

use super::models::{
    Canvas, DownloadStatus, Draft, GlobalEffect, GlobalFilter, Segment, SegmentType, TrackType,
};
use crate::timeline::TimeRange;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackInfo {
    pub track_type: TrackType,
    pub track_index: u32,
    pub track_name: String,
    pub segment_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentInfo {
    pub segment_id: String,
    pub segment_type: SegmentType,
    pub track_type: TrackType,
    pub track_index: u32,
    pub target_timerange: TimeRange,
    pub material_url: Option<String>,
    pub download_status: DownloadStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DownloadStatusInfo {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub downloading: usize,
    pub failed: usize,
}

impl DownloadStatusInfo {
    fn count(&mut self, status: DownloadStatus) {
        self.total += 1;
        match status {
            DownloadStatus::Completed => self.completed += 1,
            DownloadStatus::Pending => self.pending += 1,
            DownloadStatus::Downloading => self.downloading += 1,
            DownloadStatus::Failed => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftStatusResponse {
    pub draft_id: String,
    pub draft_name: String,
    pub canvas: Canvas,
    /// 片段与全局特效/滤镜中最晚的结束时间（微秒）。
    pub duration: u64,
    pub tracks: Vec<TrackInfo>,
    pub segments: Vec<SegmentInfo>,
    pub global_effects: Vec<GlobalEffect>,
    pub global_filters: Vec<GlobalFilter>,
    pub download_status: DownloadStatusInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentDetailResponse {
    pub segment_id: String,
    pub segment_type: SegmentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_id: Option<String>,
    pub material_url: Option<String>,
    pub target_timerange: TimeRange,
    pub status: DownloadStatus,
    pub operations: Vec<&'static str>,
}

/// 单次遍历生成草稿状态；调用方需持有草稿锁以保证快照一致。
pub fn draft_status(draft: &Draft) -> DraftStatusResponse {
    let mut tracks = Vec::with_capacity(draft.tracks.len());
    let mut segments = Vec::new();
    let mut download_status = DownloadStatusInfo::default();
    let mut duration = 0u64;

    for track in &draft.tracks {
        tracks.push(TrackInfo {
            track_type: track.track_type,
            track_index: track.track_index,
            track_name: track.track_name.clone(),
            segment_count: track.segment_count(),
        });
        for seg in &track.segments {
            download_status.count(seg.download_status);
            duration = duration.max(seg.target_timerange.end());
            segments.push(SegmentInfo {
                segment_id: seg.segment_id.clone(),
                segment_type: seg.segment_type,
                track_type: track.track_type,
                track_index: track.track_index,
                target_timerange: seg.target_timerange,
                material_url: seg.material_url.clone(),
                download_status: seg.download_status,
            });
        }
    }

    let global_ends = draft
        .global_effects
        .iter()
        .map(|e| e.target_timerange.end())
        .chain(draft.global_filters.iter().map(|f| f.target_timerange.end()));
    for end in global_ends {
        duration = duration.max(end);
    }

    DraftStatusResponse {
        draft_id: draft.draft_id.clone(),
        draft_name: draft.draft_name.clone(),
        canvas: draft.canvas,
        duration,
        tracks,
        segments,
        global_effects: draft.global_effects.clone(),
        global_filters: draft.global_filters.clone(),
        download_status,
    }
}

pub fn segment_detail(segment: &Segment, draft_id: Option<String>) -> SegmentDetailResponse {
    SegmentDetailResponse {
        segment_id: segment.segment_id.clone(),
        segment_type: segment.segment_type,
        draft_id,
        material_url: segment.material_url.clone(),
        target_timerange: segment.target_timerange,
        status: segment.download_status,
        operations: segment.download_status.operations().to_vec(),
    }
}
