use std::path::PathBuf;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::draft::models::{EffectSpec, FilterSpec, GlobalEffect, GlobalFilter};
use crate::draft::status::{DraftStatusResponse, TrackInfo};
use crate::draft::store::{DraftSummary, SegmentPlacement};
use crate::draft::{DraftStore, TrackType};
use crate::response::{DraftError, Envelope};
use crate::web::extract::{ReqLang, body, path};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct CreateDraftReq {
    #[serde(default)]
    pub(crate) draft_name: Option<String>,
    #[serde(default = "default_width")]
    pub(crate) width: u32,
    #[serde(default = "default_height")]
    pub(crate) height: u32,
    #[serde(default = "default_fps")]
    pub(crate) fps: u32,
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

fn default_fps() -> u32 {
    30
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddTrackReq {
    pub(crate) track_type: TrackType,
    #[serde(default)]
    pub(crate) track_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddSegmentReq {
    pub(crate) segment_id: String,
    #[serde(default)]
    pub(crate) track_index: Option<u32>,
}

pub(crate) async fn create_draft(
    State(state): State<AppState>,
    ReqLang(lang): ReqLang,
    payload: Result<Json<CreateDraftReq>, JsonRejection>,
) -> Envelope<DraftSummary> {
    let result = body(payload).and_then(|req| {
        state
            .store
            .create_draft(req.draft_name, req.width, req.height, req.fps)
    });
    Envelope::from_result(result, lang, lang.pick("草稿创建成功", "Draft created"))
}

pub(crate) async fn delete_draft(
    State(state): State<AppState>,
    ReqLang(lang): ReqLang,
    draft_id: Result<Path<String>, PathRejection>,
) -> Envelope<Value> {
    let result = path(draft_id).and_then(|id| {
        state.store.delete_draft(&id)?;
        Ok(json!({ "draft_id": id }))
    });
    Envelope::from_result(result, lang, lang.pick("草稿已删除", "Draft deleted"))
}

pub(crate) async fn draft_status(
    State(state): State<AppState>,
    ReqLang(lang): ReqLang,
    draft_id: Result<Path<String>, PathRejection>,
) -> Envelope<DraftStatusResponse> {
    let result = path(draft_id).and_then(|id| state.store.get_draft_status(&id));
    Envelope::from_result(result, lang, lang.pick("获取草稿状态成功", "Draft status"))
}

pub(crate) async fn add_track(
    State(state): State<AppState>,
    ReqLang(lang): ReqLang,
    draft_id: Result<Path<String>, PathRejection>,
    payload: Result<Json<AddTrackReq>, JsonRejection>,
) -> Envelope<TrackInfo> {
    let result = path(draft_id).and_then(|id| {
        let req = body(payload)?;
        state.store.add_track(&id, req.track_type, req.track_name)
    });
    Envelope::from_result(result, lang, lang.pick("轨道添加成功", "Track added"))
}

pub(crate) async fn remove_track(
    State(state): State<AppState>,
    ReqLang(lang): ReqLang,
    params: Result<Path<(String, String, u32)>, PathRejection>,
) -> Envelope<TrackInfo> {
    let result = path(params).and_then(|(id, track_type, track_index)| {
        let track_type: TrackType = track_type.parse()?;
        state.store.remove_track(&id, track_type, track_index)
    });
    Envelope::from_result(result, lang, lang.pick("轨道已移除", "Track removed"))
}

pub(crate) async fn add_segment(
    State(state): State<AppState>,
    ReqLang(lang): ReqLang,
    draft_id: Result<Path<String>, PathRejection>,
    payload: Result<Json<AddSegmentReq>, JsonRejection>,
) -> Envelope<SegmentPlacement> {
    let result = path(draft_id).and_then(|id| {
        let req = body(payload)?;
        state
            .store
            .add_segment(&id, req.segment_id.trim(), req.track_index)
    });
    Envelope::from_result(result, lang, lang.pick("片段添加成功", "Segment attached"))
}

pub(crate) async fn detach_segment(
    State(state): State<AppState>,
    ReqLang(lang): ReqLang,
    params: Result<Path<(String, String)>, PathRejection>,
) -> Envelope<Value> {
    let result = path(params).and_then(|(id, segment_id)| {
        state.store.detach_segment(&id, &segment_id)?;
        Ok(json!({ "draft_id": id, "segment_id": segment_id }))
    });
    Envelope::from_result(result, lang, lang.pick("片段已移除", "Segment detached"))
}

pub(crate) async fn add_global_effect(
    State(state): State<AppState>,
    ReqLang(lang): ReqLang,
    draft_id: Result<Path<String>, PathRejection>,
    payload: Result<Json<EffectSpec>, JsonRejection>,
) -> Envelope<GlobalEffect> {
    let result = path(draft_id).and_then(|id| {
        let spec = body(payload)?;
        state.store.add_global_effect(&id, spec)
    });
    Envelope::from_result(result, lang, lang.pick("全局特效添加成功", "Global effect added"))
}

pub(crate) async fn add_global_filter(
    State(state): State<AppState>,
    ReqLang(lang): ReqLang,
    draft_id: Result<Path<String>, PathRejection>,
    payload: Result<Json<FilterSpec>, JsonRejection>,
) -> Envelope<GlobalFilter> {
    let result = path(draft_id).and_then(|id| {
        let spec = body(payload)?;
        state.store.add_global_filter(&id, spec)
    });
    Envelope::from_result(result, lang, lang.pick("全局滤镜添加成功", "Global filter added"))
}

pub(crate) async fn save_draft(
    State(state): State<AppState>,
    ReqLang(lang): ReqLang,
    draft_id: Result<Path<String>, PathRejection>,
) -> Envelope<Value> {
    let result = match path(draft_id) {
        Ok(id) => save_blocking(state.store.clone(), id).await,
        Err(e) => Err(e),
    };
    Envelope::from_result(result, lang, lang.pick("草稿保存成功", "Draft saved"))
}

async fn save_blocking(store: std::sync::Arc<DraftStore>, id: String) -> Result<Value, DraftError> {
    let draft_id = id.clone();
    let saved: PathBuf = tokio::task::spawn_blocking(move || store.save_draft(&id))
        .await
        .map_err(|e| DraftError::internal(format!("save task join failed: {e}")))??;
    Ok(json!({
        "draft_id": draft_id,
        "path": saved.to_string_lossy(),
    }))
}
