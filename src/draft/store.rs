//! 草稿存储：草稿聚合与片段登记表。
//!
//! 每个草稿各自一把锁，同一草稿上的变更串行执行；片段登记表（未挂载片段 +
//! 已挂载片段的归属）共用一把锁。加锁顺序固定为 草稿 → 登记表，持有草稿锁时
//! 可以再取登记表锁，反之不行。

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::dispatch::{DownloadDispatcher, DownloadRequest};
use super::models::{
    Canvas, DownloadStatus, Draft, EffectSpec, FilterSpec, GlobalEffect, GlobalFilter, NewSegment,
    Segment, TrackType,
};
use super::status::{self, DraftStatusResponse, SegmentDetailResponse, TrackInfo};
use super::writer::DraftWriter;
use crate::response::DraftError;

#[derive(Debug)]
enum SegmentSlot {
    Detached(Segment),
    Attached { draft_id: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftSummary {
    pub draft_id: String,
    pub draft_name: String,
    pub canvas: Canvas,
    pub created_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentPlacement {
    pub draft_id: String,
    pub segment_id: String,
    pub track_type: TrackType,
    pub track_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub segment_id: String,
    pub from: DownloadStatus,
    pub to: DownloadStatus,
    pub operations: Vec<&'static str>,
}

pub struct DraftStore {
    drafts: RwLock<HashMap<String, Arc<Mutex<Draft>>>>,
    segments: Mutex<HashMap<String, SegmentSlot>>,
    dispatcher: Arc<dyn DownloadDispatcher>,
    writer: Arc<dyn DraftWriter>,
    max_fps: u32,
}

impl DraftStore {
    pub fn new(
        max_fps: u32,
        dispatcher: Arc<dyn DownloadDispatcher>,
        writer: Arc<dyn DraftWriter>,
    ) -> Self {
        Self {
            drafts: RwLock::new(HashMap::new()),
            segments: Mutex::new(HashMap::new()),
            dispatcher,
            writer,
            max_fps,
        }
    }

    pub fn draft_count(&self) -> usize {
        self.drafts.read().len()
    }

    fn draft(&self, draft_id: &str) -> Result<Arc<Mutex<Draft>>, DraftError> {
        self.drafts
            .read()
            .get(draft_id)
            .cloned()
            .ok_or_else(|| DraftError::DraftNotFound(draft_id.to_string()))
    }

    /// 取草稿并加锁；已被删除的草稿视为不存在。
    fn with_draft<T>(
        &self,
        draft_id: &str,
        f: impl FnOnce(&mut Draft) -> Result<T, DraftError>,
    ) -> Result<T, DraftError> {
        let handle = self.draft(draft_id)?;
        let mut draft = handle.lock();
        if draft.is_deleted() {
            return Err(DraftError::DraftNotFound(draft_id.to_string()));
        }
        f(&mut *draft)
    }

    // ── 草稿 ────────────────────────────────────────────────────

    pub fn create_draft(
        &self,
        name: Option<String>,
        width: u32,
        height: u32,
        fps: u32,
    ) -> Result<DraftSummary, DraftError> {
        if width == 0 {
            return Err(DraftError::validation("width", "must be greater than 0"));
        }
        if height == 0 {
            return Err(DraftError::validation("height", "must be greater than 0"));
        }
        if fps == 0 || fps > self.max_fps {
            return Err(DraftError::validation(
                "fps",
                format!("must be within [1, {}], got {fps}", self.max_fps),
            ));
        }

        let draft_id = Uuid::new_v4().to_string();
        let draft_name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| draft_id.clone());
        let draft = Draft::new(
            draft_id.clone(),
            draft_name,
            Canvas { width, height, fps },
        );
        let summary = DraftSummary {
            draft_id: draft.draft_id.clone(),
            draft_name: draft.draft_name.clone(),
            canvas: draft.canvas,
            created_ms: draft.created_ms,
        };

        self.drafts
            .write()
            .insert(draft_id.clone(), Arc::new(Mutex::new(draft)));
        info!(target: "draft", %draft_id, width, height, fps, "draft created");
        Ok(summary)
    }

    pub fn delete_draft(&self, draft_id: &str) -> Result<(), DraftError> {
        let handle = self
            .drafts
            .write()
            .remove(draft_id)
            .ok_or_else(|| DraftError::DraftNotFound(draft_id.to_string()))?;

        let mut draft = handle.lock();
        draft.mark_deleted();
        let mut registry = self.segments.lock();
        let mut destroyed = 0usize;
        for seg in draft.segments() {
            registry.remove(&seg.segment_id);
            destroyed += 1;
        }
        draft.tracks.clear();

        info!(target: "draft", %draft_id, destroyed, "draft deleted");
        Ok(())
    }

    pub fn save_draft(&self, draft_id: &str) -> Result<PathBuf, DraftError> {
        let snapshot = self.with_draft(draft_id, |d| Ok(d.clone()))?;
        self.writer.write(&snapshot)
    }

    // ── 轨道 ────────────────────────────────────────────────────

    pub fn add_track(
        &self,
        draft_id: &str,
        track_type: TrackType,
        track_name: Option<String>,
    ) -> Result<TrackInfo, DraftError> {
        self.with_draft(draft_id, |draft| {
            let track = draft.add_track(track_type, track_name);
            debug!(target: "draft", %draft_id, %track_type, index = track.track_index, "track added");
            Ok(TrackInfo {
                track_type: track.track_type,
                track_index: track.track_index,
                track_name: track.track_name.clone(),
                segment_count: 0,
            })
        })
    }

    /// 移除轨道并销毁其上全部片段。
    pub fn remove_track(
        &self,
        draft_id: &str,
        track_type: TrackType,
        track_index: u32,
    ) -> Result<TrackInfo, DraftError> {
        self.with_draft(draft_id, |draft| {
            let track = draft.remove_track(track_type, track_index).ok_or_else(|| {
                DraftError::TrackNotFound(format!("no {track_type} track with index {track_index}"))
            })?;
            let mut registry = self.segments.lock();
            for seg in &track.segments {
                registry.remove(&seg.segment_id);
            }
            debug!(target: "draft", %draft_id, %track_type, track_index, "track removed");
            Ok(TrackInfo {
                track_type: track.track_type,
                track_index: track.track_index,
                segment_count: track.segment_count(),
                track_name: track.track_name,
            })
        })
    }

    // ── 全局特效 / 滤镜 ─────────────────────────────────────────

    pub fn add_global_effect(
        &self,
        draft_id: &str,
        spec: EffectSpec,
    ) -> Result<GlobalEffect, DraftError> {
        self.with_draft(draft_id, |draft| {
            let effect = GlobalEffect::from_spec(Uuid::new_v4().to_string(), spec)?;
            draft.global_effects.push(effect.clone());
            info!(target: "draft", %draft_id, effect_id = %effect.effect_id, effect_type = %effect.effect_type, "global effect added");
            Ok(effect)
        })
    }

    pub fn add_global_filter(
        &self,
        draft_id: &str,
        spec: FilterSpec,
    ) -> Result<GlobalFilter, DraftError> {
        self.with_draft(draft_id, |draft| {
            let filter = GlobalFilter::from_spec(Uuid::new_v4().to_string(), spec)?;
            draft.global_filters.push(filter.clone());
            info!(target: "draft", %draft_id, filter_id = %filter.filter_id, filter_type = %filter.filter_type, "global filter added");
            Ok(filter)
        })
    }

    // ── 片段 ────────────────────────────────────────────────────

    /// 新建未挂载的片段；带素材 URL 的会交给下载方。
    pub fn create_segment(&self, req: NewSegment) -> Result<SegmentDetailResponse, DraftError> {
        let segment = Segment::from_request(Uuid::new_v4().to_string(), req)?;
        let detail = status::segment_detail(&segment, None);
        let handoff = segment.material_url.clone().map(|material_url| DownloadRequest {
            segment_id: segment.segment_id.clone(),
            segment_type: segment.segment_type,
            material_url,
        });

        self.segments
            .lock()
            .insert(segment.segment_id.clone(), SegmentSlot::Detached(segment));
        debug!(target: "draft", segment_id = %detail.segment_id, segment_type = %detail.segment_type, "segment created");

        if let Some(req) = handoff {
            self.dispatcher.dispatch(req);
        }
        Ok(detail)
    }

    /// 挂载到同类轨道；未指定索引时取最近添加的同类轨道。
    pub fn add_segment(
        &self,
        draft_id: &str,
        segment_id: &str,
        track_index: Option<u32>,
    ) -> Result<SegmentPlacement, DraftError> {
        self.with_draft(draft_id, |draft| {
            let mut registry = self.segments.lock();
            let kind = match registry.get(segment_id) {
                None => return Err(DraftError::SegmentNotFound(segment_id.to_string())),
                Some(SegmentSlot::Attached { draft_id: owner }) => {
                    return Err(DraftError::conflict(format!(
                        "segment {segment_id} is already attached to draft {owner}"
                    )));
                }
                Some(SegmentSlot::Detached(seg)) => seg.segment_type,
            };

            let track = draft.resolve_track_mut(kind, track_index)?;
            let slot = registry
                .get_mut(segment_id)
                .ok_or_else(|| DraftError::SegmentNotFound(segment_id.to_string()))?;
            let previous = std::mem::replace(
                slot,
                SegmentSlot::Attached {
                    draft_id: draft_id.to_string(),
                },
            );
            let SegmentSlot::Detached(segment) = previous else {
                return Err(DraftError::internal("segment slot changed under registry lock"));
            };
            track.segments.push(segment);

            debug!(target: "draft", %draft_id, %segment_id, track_index = track.track_index, "segment attached");
            Ok(SegmentPlacement {
                draft_id: draft_id.to_string(),
                segment_id: segment_id.to_string(),
                track_type: track.track_type,
                track_index: track.track_index,
            })
        })
    }

    /// 销毁未挂载的片段；已挂载的需先从草稿上移除。
    pub fn delete_segment(&self, segment_id: &str) -> Result<(), DraftError> {
        let mut registry = self.segments.lock();
        match registry.get(segment_id) {
            None => return Err(DraftError::SegmentNotFound(segment_id.to_string())),
            Some(SegmentSlot::Attached { draft_id }) => {
                return Err(DraftError::conflict(format!(
                    "segment {segment_id} is attached to draft {draft_id}, detach it instead"
                )));
            }
            Some(SegmentSlot::Detached(_)) => {}
        }
        registry.remove(segment_id);
        debug!(target: "draft", %segment_id, "detached segment deleted");
        Ok(())
    }

    /// 从草稿上移除并销毁片段。
    pub fn detach_segment(&self, draft_id: &str, segment_id: &str) -> Result<(), DraftError> {
        self.with_draft(draft_id, |draft| {
            draft
                .take_segment(segment_id)
                .ok_or_else(|| DraftError::SegmentNotFound(segment_id.to_string()))?;
            self.segments.lock().remove(segment_id);
            debug!(target: "draft", %draft_id, %segment_id, "segment detached");
            Ok(())
        })
    }

    pub fn update_segment_status(
        &self,
        segment_id: &str,
        next: DownloadStatus,
    ) -> Result<StatusChange, DraftError> {
        let change = self.with_segment(segment_id, |seg, _| {
            let from = seg.transition(next)?;
            Ok(StatusChange {
                segment_id: segment_id.to_string(),
                from,
                to: next,
                operations: next.operations().to_vec(),
            })
        })?;
        info!(target: "draft", %segment_id, from = %change.from, to = %change.to, "segment status changed");
        Ok(change)
    }

    // ── 查询 ────────────────────────────────────────────────────

    pub fn get_draft_status(&self, draft_id: &str) -> Result<DraftStatusResponse, DraftError> {
        self.with_draft(draft_id, |draft| Ok(status::draft_status(draft)))
    }

    pub fn get_segment_detail(&self, segment_id: &str) -> Result<SegmentDetailResponse, DraftError> {
        self.with_segment(segment_id, |seg, owner| {
            Ok(status::segment_detail(seg, owner.map(str::to_string)))
        })
    }

    /// 定位片段（未挂载或已挂载）并在对应的锁内执行 `f`，同时给出归属草稿。
    fn with_segment<T>(
        &self,
        segment_id: &str,
        f: impl FnOnce(&mut Segment, Option<&str>) -> Result<T, DraftError>,
    ) -> Result<T, DraftError> {
        let owner = {
            let mut registry = self.segments.lock();
            match registry.get_mut(segment_id) {
                None => return Err(DraftError::SegmentNotFound(segment_id.to_string())),
                Some(SegmentSlot::Detached(seg)) => return f(seg, None),
                Some(SegmentSlot::Attached { draft_id }) => draft_id.clone(),
            }
        };

        // 登记表锁已释放，改为持草稿锁定位；期间被删除的草稿已清空轨道
        let not_found = || DraftError::SegmentNotFound(segment_id.to_string());
        let handle = self.draft(&owner).map_err(|_| not_found())?;
        let mut draft = handle.lock();
        let seg = draft.segment_mut(segment_id).ok_or_else(not_found)?;
        f(seg, Some(owner.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::dispatch::NoopDispatcher;
    use crate::draft::models::SegmentType;
    use crate::draft::writer::JsonDraftWriter;
    use crossbeam_channel as channel;
    use serde_json::json;

    fn store() -> DraftStore {
        DraftStore::new(
            120,
            Arc::new(NoopDispatcher),
            Arc::new(JsonDraftWriter::new(std::env::temp_dir())),
        )
    }

    fn video(url: &str) -> NewSegment {
        serde_json::from_value(json!({
            "segment_type": "video",
            "material_url": url,
            "target_timerange": {"start": 0, "duration": 1_000_000}
        }))
        .unwrap()
    }

    fn text(content: &str) -> NewSegment {
        serde_json::from_value(json!({
            "segment_type": "text",
            "text_content": content,
            "target_timerange": {"start": 0, "duration": 1_000_000}
        }))
        .unwrap()
    }

    #[test]
    fn create_draft_validates_canvas() {
        let s = store();
        for (w, h, fps, field) in [(0, 1080, 30, "width"), (1920, 0, 30, "height"), (1920, 1080, 0, "fps"), (1920, 1080, 121, "fps")] {
            match s.create_draft(None, w, h, fps) {
                Err(DraftError::Validation { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected validation error on {field}, got {other:?}"),
            }
        }
        let d = s.create_draft(Some("  ".into()), 1920, 1080, 30).unwrap();
        assert_eq!(d.draft_name, d.draft_id);
        assert_eq!(s.draft_count(), 1);
    }

    #[test]
    fn fresh_draft_has_empty_status() {
        let s = store();
        let d = s.create_draft(Some("demo".into()), 1920, 1080, 30).unwrap();
        let st = s.get_draft_status(&d.draft_id).unwrap();
        assert_eq!(st.draft_name, "demo");
        assert_eq!(st.download_status.total, 0);
        assert!(matches!(
            s.get_draft_status("nope"),
            Err(DraftError::DraftNotFound(_))
        ));
    }

    #[test]
    fn aggregates_two_tracks_of_three_segments() {
        let s = store();
        let d = s.create_draft(None, 1920, 1080, 30).unwrap();
        let id = d.draft_id.as_str();
        s.add_track(id, SegmentType::Video, None).unwrap();
        s.add_track(id, SegmentType::Video, None).unwrap();

        let mut segs = Vec::new();
        for i in 0..6u32 {
            let seg = s.create_segment(video(&format!("https://example.com/{i}.mp4"))).unwrap();
            s.add_segment(id, &seg.segment_id, Some(i % 2)).unwrap();
            segs.push(seg.segment_id);
        }
        for seg in &segs[..4] {
            s.update_segment_status(seg, DownloadStatus::Downloading).unwrap();
            s.update_segment_status(seg, DownloadStatus::Completed).unwrap();
        }
        s.update_segment_status(&segs[4], DownloadStatus::Downloading).unwrap();
        s.update_segment_status(&segs[4], DownloadStatus::Failed).unwrap();

        let st = s.get_draft_status(id).unwrap();
        assert_eq!(st.tracks.len(), 2);
        assert!(st.tracks.iter().all(|t| t.segment_count == 3));
        assert_eq!(st.segments.len(), 6);
        let b = st.download_status;
        assert_eq!((b.total, b.completed, b.pending, b.downloading, b.failed), (6, 4, 1, 0, 1));
    }

    #[test]
    fn double_attach_is_a_conflict() {
        let s = store();
        let d = s.create_draft(None, 1920, 1080, 30).unwrap();
        let other = s.create_draft(None, 1920, 1080, 30).unwrap();
        s.add_track(&d.draft_id, SegmentType::Text, None).unwrap();
        s.add_track(&other.draft_id, SegmentType::Text, None).unwrap();
        let seg = s.create_segment(text("你好")).unwrap();

        s.add_segment(&d.draft_id, &seg.segment_id, None).unwrap();
        assert!(matches!(
            s.add_segment(&d.draft_id, &seg.segment_id, None),
            Err(DraftError::Conflict(_))
        ));
        assert!(matches!(
            s.add_segment(&other.draft_id, &seg.segment_id, None),
            Err(DraftError::Conflict(_))
        ));
        assert!(matches!(
            s.add_segment(&d.draft_id, "missing", None),
            Err(DraftError::SegmentNotFound(_))
        ));
    }

    #[test]
    fn concurrent_attach_has_one_winner() {
        let s = store();
        let d = s.create_draft(None, 1920, 1080, 30).unwrap();
        s.add_track(&d.draft_id, SegmentType::Text, None).unwrap();
        let seg = s.create_segment(text("抢")).unwrap();

        let wins = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| s.add_segment(&d.draft_id, &seg.segment_id, None).is_ok()))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count()
        });
        assert_eq!(wins, 1);
        let st = s.get_draft_status(&d.draft_id).unwrap();
        assert_eq!(st.segments.len(), 1);
    }

    #[test]
    fn attach_requires_matching_track() {
        let s = store();
        let d = s.create_draft(None, 1920, 1080, 30).unwrap();
        s.add_track(&d.draft_id, SegmentType::Audio, None).unwrap();
        let seg = s.create_segment(text("字幕")).unwrap();

        assert!(matches!(
            s.add_segment(&d.draft_id, &seg.segment_id, None),
            Err(DraftError::TrackNotFound(_))
        ));
        // audio track 0 exists but is the wrong kind
        assert!(matches!(
            s.add_segment(&d.draft_id, &seg.segment_id, Some(0)),
            Err(DraftError::TrackNotFound(_))
        ));

        // the failed attempts leave the segment detached
        s.add_track(&d.draft_id, SegmentType::Text, None).unwrap();
        let placed = s.add_segment(&d.draft_id, &seg.segment_id, None).unwrap();
        assert_eq!((placed.track_type, placed.track_index), (SegmentType::Text, 0));
        let detail = s.get_segment_detail(&seg.segment_id).unwrap();
        assert_eq!(detail.draft_id.as_deref(), Some(d.draft_id.as_str()));
    }

    #[test]
    fn status_updates_follow_the_state_machine() {
        let s = store();
        let seg = s.create_segment(video("https://example.com/v.mp4")).unwrap();
        assert_eq!(seg.operations, vec!["start_download"]);

        s.update_segment_status(&seg.segment_id, DownloadStatus::Downloading).unwrap();
        let change = s
            .update_segment_status(&seg.segment_id, DownloadStatus::Completed)
            .unwrap();
        assert_eq!(change.from, DownloadStatus::Downloading);
        assert!(change.operations.is_empty());
        assert!(matches!(
            s.update_segment_status(&seg.segment_id, DownloadStatus::Downloading),
            Err(DraftError::InvalidStateTransition { .. })
        ));

        let text_seg = s.create_segment(text("hi")).unwrap();
        assert_eq!(text_seg.status, DownloadStatus::Completed);
    }

    #[test]
    fn removing_containers_destroys_segments() {
        let s = store();
        let d = s.create_draft(None, 1920, 1080, 30).unwrap();
        s.add_track(&d.draft_id, SegmentType::Text, None).unwrap();
        let a = s.create_segment(text("a")).unwrap();
        let b = s.create_segment(text("b")).unwrap();
        s.add_segment(&d.draft_id, &a.segment_id, None).unwrap();
        s.add_segment(&d.draft_id, &b.segment_id, None).unwrap();

        s.detach_segment(&d.draft_id, &a.segment_id).unwrap();
        assert!(matches!(
            s.get_segment_detail(&a.segment_id),
            Err(DraftError::SegmentNotFound(_))
        ));
        assert!(matches!(
            s.detach_segment(&d.draft_id, &a.segment_id),
            Err(DraftError::SegmentNotFound(_))
        ));

        let removed = s.remove_track(&d.draft_id, SegmentType::Text, 0).unwrap();
        assert_eq!(removed.segment_count, 1);
        assert!(s.get_segment_detail(&b.segment_id).is_err());
        assert!(matches!(
            s.remove_track(&d.draft_id, SegmentType::Text, 0),
            Err(DraftError::TrackNotFound(_))
        ));
        assert_eq!(s.add_track(&d.draft_id, SegmentType::Text, None).unwrap().track_index, 1);

        let c = s.create_segment(text("c")).unwrap();
        s.add_segment(&d.draft_id, &c.segment_id, None).unwrap();
        s.delete_draft(&d.draft_id).unwrap();
        assert!(s.get_segment_detail(&c.segment_id).is_err());
        assert!(matches!(
            s.delete_draft(&d.draft_id),
            Err(DraftError::DraftNotFound(_))
        ));
        assert_eq!(s.draft_count(), 0);
    }

    #[test]
    fn only_detached_segments_can_be_deleted() {
        let s = store();
        let d = s.create_draft(None, 1920, 1080, 30).unwrap();
        s.add_track(&d.draft_id, SegmentType::Text, None).unwrap();
        let loose = s.create_segment(text("loose")).unwrap();
        let placed = s.create_segment(text("placed")).unwrap();
        s.add_segment(&d.draft_id, &placed.segment_id, None).unwrap();

        s.delete_segment(&loose.segment_id).unwrap();
        assert!(matches!(
            s.get_segment_detail(&loose.segment_id),
            Err(DraftError::SegmentNotFound(_))
        ));
        assert!(matches!(
            s.delete_segment(&loose.segment_id),
            Err(DraftError::SegmentNotFound(_))
        ));
        assert!(matches!(
            s.delete_segment(&placed.segment_id),
            Err(DraftError::Conflict(_))
        ));
        assert_eq!(s.get_draft_status(&d.draft_id).unwrap().segments.len(), 1);
    }

    #[test]
    fn global_effects_and_filters_live_on_the_draft() {
        let dir = tempfile::tempdir().unwrap();
        let s = DraftStore::new(
            120,
            Arc::new(NoopDispatcher),
            Arc::new(JsonDraftWriter::new(dir.path())),
        );
        let d = s.create_draft(None, 1920, 1080, 30).unwrap();
        let effect: EffectSpec = serde_json::from_value(json!({
            "effect_type": "锐化",
            "target_timerange": {"start": 0, "duration": 2_000_000}
        }))
        .unwrap();
        let filter: FilterSpec = serde_json::from_value(json!({
            "filter_type": "FilterType.暖冬",
            "intensity": 60.0,
            "target_timerange": {"start": 0, "duration": 6_000_000}
        }))
        .unwrap();

        let fx = s.add_global_effect(&d.draft_id, effect.clone()).unwrap();
        let flt = s.add_global_filter(&d.draft_id, filter).unwrap();
        assert_ne!(fx.effect_id, flt.filter_id);
        assert!(matches!(
            s.add_global_effect("nope", effect),
            Err(DraftError::DraftNotFound(_))
        ));
        let unknown: EffectSpec = serde_json::from_value(json!({
            "effect_type": "VideoSceneEffectType.XXX",
            "target_timerange": {"start": 0, "duration": 1}
        }))
        .unwrap();
        assert!(matches!(
            s.add_global_effect(&d.draft_id, unknown),
            Err(DraftError::Validation { ref field, .. }) if field == "effect_type"
        ));

        let st = s.get_draft_status(&d.draft_id).unwrap();
        assert_eq!(st.global_effects, vec![fx]);
        assert_eq!(st.global_filters, vec![flt.clone()]);
        assert_eq!(st.duration, 6_000_000);
        assert_eq!(st.download_status.total, 0);

        let path = s.save_draft(&d.draft_id).unwrap();
        let saved: serde_json::Value =
            serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(saved["global_filters"][0]["filter_id"], flt.filter_id.as_str());
        assert_eq!(saved["global_filters"][0]["intensity"], 60.0);
        assert_eq!(saved["global_effects"][0]["effect_type"], "锐化");
    }

    #[test]
    fn url_segments_are_dispatched() {
        let (tx, rx) = channel::unbounded::<DownloadRequest>();
        let s = DraftStore::new(
            120,
            Arc::new(tx),
            Arc::new(JsonDraftWriter::new(std::env::temp_dir())),
        );
        let seg = s.create_segment(video("https://example.com/v.mp4")).unwrap();
        s.create_segment(text("no url")).unwrap();

        let req = rx.try_recv().unwrap();
        assert_eq!(req.segment_id, seg.segment_id);
        assert_eq!(req.material_url, "https://example.com/v.mp4");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn save_writes_through_the_writer() {
        let dir = tempfile::tempdir().unwrap();
        let s = DraftStore::new(
            120,
            Arc::new(NoopDispatcher),
            Arc::new(JsonDraftWriter::new(dir.path())),
        );
        let d = s.create_draft(Some("片头".into()), 1920, 1080, 60).unwrap();
        let path = s.save_draft(&d.draft_id).unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(path.exists());
        assert!(matches!(s.save_draft("nope"), Err(DraftError::DraftNotFound(_))));
    }
}
