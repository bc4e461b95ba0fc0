use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::draft::status::SegmentDetailResponse;
use crate::draft::store::StatusChange;
use crate::draft::{DownloadStatus, NewSegment};
use crate::response::Envelope;
use crate::web::extract::{ReqLang, body, path};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateStatusReq {
    #[serde(alias = "download_status")]
    pub(crate) status: DownloadStatus,
}

pub(crate) async fn create_segment(
    State(state): State<AppState>,
    ReqLang(lang): ReqLang,
    payload: Result<Json<NewSegment>, JsonRejection>,
) -> Envelope<SegmentDetailResponse> {
    let result = body(payload).and_then(|req| state.store.create_segment(req));
    Envelope::from_result(result, lang, lang.pick("片段创建成功", "Segment created"))
}

pub(crate) async fn segment_detail(
    State(state): State<AppState>,
    ReqLang(lang): ReqLang,
    segment_id: Result<Path<String>, PathRejection>,
) -> Envelope<SegmentDetailResponse> {
    let result = path(segment_id).and_then(|id| state.store.get_segment_detail(&id));
    Envelope::from_result(result, lang, lang.pick("获取片段详情成功", "Segment detail"))
}

pub(crate) async fn delete_segment(
    State(state): State<AppState>,
    ReqLang(lang): ReqLang,
    segment_id: Result<Path<String>, PathRejection>,
) -> Envelope<Value> {
    let result = path(segment_id).and_then(|id| {
        state.store.delete_segment(&id)?;
        Ok(json!({ "segment_id": id }))
    });
    Envelope::from_result(result, lang, lang.pick("片段已删除", "Segment deleted"))
}

pub(crate) async fn update_status(
    State(state): State<AppState>,
    ReqLang(lang): ReqLang,
    segment_id: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateStatusReq>, JsonRejection>,
) -> Envelope<StatusChange> {
    let result = path(segment_id).and_then(|id| {
        let req = body(payload)?;
        state.store.update_segment_status(&id, req.status)
    });
    Envelope::from_result(result, lang, lang.pick("状态更新成功", "Status updated"))
}
