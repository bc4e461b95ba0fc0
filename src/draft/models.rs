//! 草稿聚合的数据模型：Draft / Track / Segment 与下载状态机。

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::catalog;
use crate::response::DraftError;
use crate::timeline::TimeRange;

// ── 类型与状态 ──────────────────────────────────────────────────

/// 片段类型；轨道类型与之一一对应。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentType {
    Audio,
    Video,
    Sticker,
    Text,
    Effect,
    Filter,
}

pub type TrackType = SegmentType;

impl SegmentType {
    pub const ALL: [SegmentType; 6] = [
        SegmentType::Audio,
        SegmentType::Video,
        SegmentType::Sticker,
        SegmentType::Text,
        SegmentType::Effect,
        SegmentType::Filter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SegmentType::Audio => "audio",
            SegmentType::Video => "video",
            SegmentType::Sticker => "sticker",
            SegmentType::Text => "text",
            SegmentType::Effect => "effect",
            SegmentType::Filter => "filter",
        }
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmentType {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        SegmentType::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| {
                DraftError::validation(
                    "track_type",
                    format!("unsupported type '{s}', expected one of audio/video/sticker/text/effect/filter"),
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    Pending,
    Downloading,
    Completed,
    Failed,
}

impl DownloadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DownloadStatus::Pending => "pending",
            DownloadStatus::Downloading => "downloading",
            DownloadStatus::Completed => "completed",
            DownloadStatus::Failed => "failed",
        }
    }

    /// pending → downloading → {completed, failed}；failed 可重试回 downloading；completed 为终态。
    pub fn can_transition_to(self, next: DownloadStatus) -> bool {
        use DownloadStatus::*;
        matches!(
            (self, next),
            (Pending, Downloading)
                | (Downloading, Completed)
                | (Downloading, Failed)
                | (Failed, Downloading)
        )
    }

    /// 当前状态下外部下载方可以执行的动作。
    pub fn operations(self) -> &'static [&'static str] {
        match self {
            DownloadStatus::Pending => &["start_download"],
            DownloadStatus::Downloading => &["complete", "fail"],
            DownloadStatus::Failed => &["retry"],
            DownloadStatus::Completed => &[],
        }
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── 片段创建请求 ────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct MediaSpec {
    pub material_url: Option<String>,
    pub target_timerange: TimeRange,
    #[serde(default)]
    pub source_timerange: Option<TimeRange>,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default)]
    pub change_pitch: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StickerSpec {
    pub material_url: Option<String>,
    pub target_timerange: TimeRange,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextSpec {
    #[serde(default)]
    pub text_content: String,
    pub target_timerange: TimeRange,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_color")]
    pub color: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EffectSpec {
    #[serde(default)]
    pub effect_type: String,
    pub target_timerange: TimeRange,
    #[serde(default)]
    pub params: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub filter_type: String,
    pub target_timerange: TimeRange,
    #[serde(default = "default_intensity")]
    pub intensity: f64,
}

/// 按 `segment_type` 区分的片段创建请求。
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "segment_type", rename_all = "snake_case")]
pub enum NewSegment {
    Audio(MediaSpec),
    Video(MediaSpec),
    Sticker(StickerSpec),
    Text(TextSpec),
    Effect(EffectSpec),
    Filter(FilterSpec),
}

/// 校验后的类型专属参数。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SegmentParams {
    Media {
        speed: f64,
        volume: f64,
        change_pitch: bool,
        source_timerange: Option<TimeRange>,
    },
    Sticker {
        scale: f64,
    },
    Text {
        text_content: String,
        font_family: String,
        font_size: f64,
        color: String,
    },
    Effect {
        effect_type: String,
        params: Vec<f64>,
    },
    Filter {
        filter_type: String,
        intensity: f64,
    },
}

// ── Segment ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub segment_id: String,
    pub segment_type: SegmentType,
    pub material_url: Option<String>,
    pub target_timerange: TimeRange,
    pub download_status: DownloadStatus,
    pub params: SegmentParams,
}

impl Segment {
    /// 校验请求并生成片段：带素材 URL 的从 pending 开始，否则直接 completed。
    pub fn from_request(segment_id: String, req: NewSegment) -> Result<Self, DraftError> {
        let (segment_type, target_timerange, material_url, params) = match req {
            NewSegment::Audio(spec) => {
                let (tr, url, params) = validate_media(spec)?;
                (SegmentType::Audio, tr, Some(url), params)
            }
            NewSegment::Video(spec) => {
                let (tr, url, params) = validate_media(spec)?;
                (SegmentType::Video, tr, Some(url), params)
            }
            NewSegment::Sticker(spec) => {
                let url = require_url(spec.material_url)?;
                check_positive("scale", spec.scale)?;
                (
                    SegmentType::Sticker,
                    spec.target_timerange,
                    Some(url),
                    SegmentParams::Sticker { scale: spec.scale },
                )
            }
            NewSegment::Text(spec) => {
                if spec.text_content.trim().is_empty() {
                    return Err(DraftError::validation("text_content", "must not be empty"));
                }
                check_positive("font_size", spec.font_size)?;
                (
                    SegmentType::Text,
                    spec.target_timerange,
                    None,
                    SegmentParams::Text {
                        text_content: spec.text_content,
                        font_family: spec.font_family,
                        font_size: spec.font_size,
                        color: spec.color,
                    },
                )
            }
            NewSegment::Effect(spec) => {
                let (tr, effect_type, params) = validate_effect(spec)?;
                (
                    SegmentType::Effect,
                    tr,
                    None,
                    SegmentParams::Effect { effect_type, params },
                )
            }
            NewSegment::Filter(spec) => {
                let (tr, filter_type, intensity) = validate_filter(spec)?;
                (
                    SegmentType::Filter,
                    tr,
                    None,
                    SegmentParams::Filter {
                        filter_type,
                        intensity,
                    },
                )
            }
        };

        let download_status = if material_url.is_some() {
            DownloadStatus::Pending
        } else {
            DownloadStatus::Completed
        };

        Ok(Self {
            segment_id,
            segment_type,
            material_url,
            target_timerange,
            download_status,
            params,
        })
    }

    pub fn transition(&mut self, next: DownloadStatus) -> Result<DownloadStatus, DraftError> {
        let from = self.download_status;
        if !from.can_transition_to(next) {
            return Err(DraftError::InvalidStateTransition {
                from: from.to_string(),
                to: next.to_string(),
            });
        }
        self.download_status = next;
        Ok(from)
    }
}

fn validate_media(spec: MediaSpec) -> Result<(TimeRange, String, SegmentParams), DraftError> {
    let url = require_url(spec.material_url)?;
    check_positive("speed", spec.speed)?;
    check_range("volume", spec.volume, 0.0, 2.0)?;
    Ok((
        spec.target_timerange,
        url,
        SegmentParams::Media {
            speed: spec.speed,
            volume: spec.volume,
            change_pitch: spec.change_pitch,
            source_timerange: spec.source_timerange,
        },
    ))
}

fn validate_effect(spec: EffectSpec) -> Result<(TimeRange, String, Vec<f64>), DraftError> {
    let effect_type = catalog::resolve_effect(&spec.effect_type).ok_or_else(|| {
        DraftError::validation("effect_type", format!("unknown effect '{}'", spec.effect_type))
    })?;
    for (i, p) in spec.params.iter().enumerate() {
        check_range(&format!("params[{i}]"), *p, 0.0, 100.0)?;
    }
    Ok((spec.target_timerange, effect_type.to_string(), spec.params))
}

fn validate_filter(spec: FilterSpec) -> Result<(TimeRange, String, f64), DraftError> {
    let filter_type = catalog::resolve_filter(&spec.filter_type).ok_or_else(|| {
        DraftError::validation("filter_type", format!("unknown filter '{}'", spec.filter_type))
    })?;
    check_range("intensity", spec.intensity, 0.0, 100.0)?;
    Ok((spec.target_timerange, filter_type.to_string(), spec.intensity))
}

fn require_url(url: Option<String>) -> Result<String, DraftError> {
    match url.map(|u| u.trim().to_string()) {
        Some(u) if !u.is_empty() => Ok(u),
        _ => Err(DraftError::validation("material_url", "is required")),
    }
}

fn check_positive(field: &str, v: f64) -> Result<(), DraftError> {
    if v > 0.0 && v.is_finite() {
        Ok(())
    } else {
        Err(DraftError::validation(field, format!("must be greater than 0, got {v}")))
    }
}

fn check_range(field: &str, v: f64, lo: f64, hi: f64) -> Result<(), DraftError> {
    if (lo..=hi).contains(&v) {
        Ok(())
    } else {
        Err(DraftError::validation(
            field,
            format!("must be within [{lo}, {hi}], got {v}"),
        ))
    }
}

fn default_speed() -> f64 {
    1.0
}

fn default_volume() -> f64 {
    1.0
}

fn default_scale() -> f64 {
    1.0
}

fn default_font_family() -> String {
    "文轩体".to_string()
}

fn default_font_size() -> f64 {
    8.0
}

fn default_color() -> String {
    "#FFFFFF".to_string()
}

fn default_intensity() -> f64 {
    100.0
}

// ── 全局特效 / 滤镜 ─────────────────────────────────────────────

/// 直接挂在草稿上的特效，不占用片段登记表，也没有下载状态。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalEffect {
    pub effect_id: String,
    pub effect_type: String,
    pub target_timerange: TimeRange,
    pub params: Vec<f64>,
}

impl GlobalEffect {
    pub fn from_spec(effect_id: String, spec: EffectSpec) -> Result<Self, DraftError> {
        let (target_timerange, effect_type, params) = validate_effect(spec)?;
        Ok(Self {
            effect_id,
            effect_type,
            target_timerange,
            params,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalFilter {
    pub filter_id: String,
    pub filter_type: String,
    pub target_timerange: TimeRange,
    pub intensity: f64,
}

impl GlobalFilter {
    pub fn from_spec(filter_id: String, spec: FilterSpec) -> Result<Self, DraftError> {
        let (target_timerange, filter_type, intensity) = validate_filter(spec)?;
        Ok(Self {
            filter_id,
            filter_type,
            target_timerange,
            intensity,
        })
    }
}

// ── Track / Draft ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Track {
    pub track_type: TrackType,
    pub track_index: u32,
    pub track_name: String,
    pub segments: Vec<Segment>,
}

impl Track {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Draft {
    pub draft_id: String,
    pub draft_name: String,
    pub canvas: Canvas,
    pub tracks: Vec<Track>,
    pub global_effects: Vec<GlobalEffect>,
    pub global_filters: Vec<GlobalFilter>,
    pub created_ms: u64,
    #[serde(skip)]
    next_index: HashMap<TrackType, u32>,
    #[serde(skip)]
    deleted: bool,
}

impl Draft {
    pub fn new(draft_id: String, draft_name: String, canvas: Canvas) -> Self {
        Self {
            draft_id,
            draft_name,
            canvas,
            tracks: Vec::new(),
            global_effects: Vec::new(),
            global_filters: Vec::new(),
            created_ms: now_ms(),
            next_index: HashMap::new(),
            deleted: false,
        }
    }

    /// 追加空轨道；同类轨道索引从 0 递增，删除后也不复用。
    pub fn add_track(&mut self, track_type: TrackType, track_name: Option<String>) -> &Track {
        let slot = self.next_index.entry(track_type).or_insert(0);
        let track_index = *slot;
        *slot += 1;

        let track_name = track_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("{track_type}_{track_index}"));

        self.tracks.push(Track {
            track_type,
            track_index,
            track_name,
            segments: Vec::new(),
        });
        &self.tracks[self.tracks.len() - 1]
    }

    pub fn remove_track(&mut self, track_type: TrackType, track_index: u32) -> Option<Track> {
        let pos = self
            .tracks
            .iter()
            .position(|t| t.track_type == track_type && t.track_index == track_index)?;
        Some(self.tracks.remove(pos))
    }

    /// 指定索引时精确匹配；未指定时取最近添加的同类轨道。
    pub fn resolve_track_mut(
        &mut self,
        track_type: TrackType,
        track_index: Option<u32>,
    ) -> Result<&mut Track, DraftError> {
        let found = match track_index {
            Some(idx) => self
                .tracks
                .iter_mut()
                .find(|t| t.track_type == track_type && t.track_index == idx),
            None => self
                .tracks
                .iter_mut()
                .rev()
                .find(|t| t.track_type == track_type),
        };
        found.ok_or_else(|| {
            DraftError::TrackNotFound(match track_index {
                Some(idx) => format!("no {track_type} track with index {idx}"),
                None => format!("draft has no {track_type} track"),
            })
        })
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.tracks.iter().flat_map(|t| t.segments.iter())
    }

    pub fn segment_mut(&mut self, segment_id: &str) -> Option<&mut Segment> {
        self.tracks
            .iter_mut()
            .flat_map(|t| t.segments.iter_mut())
            .find(|s| s.segment_id == segment_id)
    }

    pub fn take_segment(&mut self, segment_id: &str) -> Option<Segment> {
        for track in &mut self.tracks {
            if let Some(pos) = track.segments.iter().position(|s| s.segment_id == segment_id) {
                return Some(track.segments.remove(pos));
            }
        }
        None
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.deleted = true;
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(req: serde_json::Value) -> Result<Segment, DraftError> {
        let req: NewSegment = serde_json::from_value(req).unwrap();
        Segment::from_request("seg-1".to_string(), req)
    }

    #[test]
    fn url_segments_start_pending_others_completed() {
        let audio = build(json!({
            "segment_type": "audio",
            "material_url": "https://example.com/a.mp3",
            "target_timerange": {"start": 0, "duration": 5000000}
        }))
        .unwrap();
        assert_eq!(audio.download_status, DownloadStatus::Pending);

        let text = build(json!({
            "segment_type": "text",
            "text_content": "大家好",
            "target_timerange": {"start": 0, "duration": 3000000}
        }))
        .unwrap();
        assert_eq!(text.download_status, DownloadStatus::Completed);
        assert_eq!(text.material_url, None);
    }

    #[test]
    fn validation_names_the_field() {
        let cases = [
            (
                json!({"segment_type": "filter", "filter_type": "暖冬", "intensity": 101.0,
                       "target_timerange": {"start": 0, "duration": 1}}),
                "intensity",
            ),
            (
                json!({"segment_type": "effect", "effect_type": "VideoSceneEffectType.XXX",
                       "target_timerange": {"start": 0, "duration": 1}}),
                "effect_type",
            ),
            (
                json!({"segment_type": "effect", "effect_type": "幻影", "params": [50.0, -1.0],
                       "target_timerange": {"start": 0, "duration": 1}}),
                "params[1]",
            ),
            (
                json!({"segment_type": "video", "volume": 3.0, "material_url": "u",
                       "target_timerange": {"start": 0, "duration": 1}}),
                "volume",
            ),
            (
                json!({"segment_type": "sticker",
                       "target_timerange": {"start": 0, "duration": 1}}),
                "material_url",
            ),
        ];
        for (req, field) in cases {
            match build(req) {
                Err(DraftError::Validation { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected validation error on {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn text_defaults_follow_the_editor() {
        let text = build(json!({
            "segment_type": "text",
            "text_content": "片头",
            "target_timerange": {"start": 0, "duration": 3000000}
        }))
        .unwrap();
        match text.params {
            SegmentParams::Text {
                font_family,
                font_size,
                ..
            } => {
                assert_eq!(font_family, "文轩体");
                assert_eq!(font_size, 8.0);
            }
            other => panic!("expected text params, got {other:?}"),
        }
    }

    #[test]
    fn global_records_share_segment_validation() {
        let effect: EffectSpec = serde_json::from_value(json!({
            "effect_type": "VideoSceneEffectType.GLITCH",
            "target_timerange": {"start": 0, "duration": 5000000},
            "params": [0.5, 1.0]
        }))
        .unwrap();
        let effect = GlobalEffect::from_spec("fx-1".into(), effect).unwrap();
        assert_eq!(effect.effect_type, "GLITCH");
        assert_eq!(effect.params, vec![0.5, 1.0]);

        let filter: FilterSpec = serde_json::from_value(json!({
            "filter_type": "FilterType.暖冬",
            "target_timerange": {"start": 0, "duration": 5000000}
        }))
        .unwrap();
        let filter = GlobalFilter::from_spec("flt-1".into(), filter).unwrap();
        assert_eq!((filter.filter_type.as_str(), filter.intensity), ("暖冬", 100.0));

        let bad: FilterSpec = serde_json::from_value(json!({
            "filter_type": "暖冬",
            "intensity": -1.0,
            "target_timerange": {"start": 0, "duration": 1}
        }))
        .unwrap();
        assert!(matches!(
            GlobalFilter::from_spec("flt-2".into(), bad),
            Err(DraftError::Validation { ref field, .. }) if field == "intensity"
        ));
    }

    #[test]
    fn status_machine() {
        use DownloadStatus::*;
        let mut seg = build(json!({
            "segment_type": "video",
            "material_url": "https://example.com/v.mp4",
            "target_timerange": {"start": 0, "duration": 1}
        }))
        .unwrap();
        assert!(seg.transition(Completed).is_err());
        seg.transition(Downloading).unwrap();
        seg.transition(Failed).unwrap();
        assert_eq!(Failed.operations(), &["retry"]);
        seg.transition(Downloading).unwrap();
        seg.transition(Completed).unwrap();
        let err = seg.transition(Downloading).unwrap_err();
        assert_eq!(err.to_string(), "completed -> downloading");
    }

    #[test]
    fn track_indices_are_never_reused() {
        let canvas = Canvas {
            width: 1920,
            height: 1080,
            fps: 30,
        };
        let mut draft = Draft::new("d".into(), "demo".into(), canvas);
        assert_eq!(draft.add_track(SegmentType::Video, None).track_index, 0);
        assert_eq!(draft.add_track(SegmentType::Audio, None).track_index, 0);
        assert_eq!(draft.add_track(SegmentType::Video, None).track_name, "video_1");
        assert!(draft.remove_track(SegmentType::Video, 1).is_some());
        assert_eq!(draft.add_track(SegmentType::Video, None).track_index, 2);
        assert_eq!(
            draft
                .resolve_track_mut(SegmentType::Video, None)
                .unwrap()
                .track_index,
            2
        );
        assert!(draft.resolve_track_mut(SegmentType::Text, None).is_err());
        assert!(draft.resolve_track_mut(SegmentType::Video, Some(1)).is_err());
    }

    #[test]
    fn parse_track_type() {
        assert_eq!("Video".parse::<SegmentType>().unwrap(), SegmentType::Video);
        assert!("subtitle".parse::<SegmentType>().is_err());
    }
}
