//! 无状态的计算接口：切分、累加、配对、关键帧。

use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::response::Envelope;
use crate::timeline::Timeline;
use crate::timeline::infos::{self, InfoKind};
use crate::timeline::keyframes::{self, KeyframeSegment};
use crate::timeline::split::{self, SplitType};
use crate::web::extract::{ReqLang, body};

#[derive(Debug, Deserialize)]
pub(crate) struct SplitReq {
    pub(crate) duration: u64,
    pub(crate) num: u32,
    #[serde(default)]
    pub(crate) start: u64,
    #[serde(default)]
    pub(crate) split_type: SplitType,
}

/// 时长列表既可以是数组，也可以是逗号分隔的字符串。
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Durations {
    List(Vec<i64>),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccumulateReq {
    #[serde(alias = "durations")]
    pub(crate) durations_us: Durations,
    #[serde(default)]
    pub(crate) start: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InfosReq {
    pub(crate) kind: InfoKind,
    pub(crate) items: Vec<String>,
    pub(crate) timelines: Vec<Timeline>,
    #[serde(default)]
    pub(crate) extras: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct KeyframesReq {
    pub(crate) ctype: String,
    pub(crate) offsets: String,
    pub(crate) values: String,
    pub(crate) segment_infos: Vec<KeyframeSegment>,
    #[serde(default)]
    pub(crate) width: Option<u32>,
    #[serde(default)]
    pub(crate) height: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TimelinesResp {
    pub(crate) timelines: Vec<Timeline>,
    pub(crate) all_timelines: Vec<Timeline>,
}

impl From<Vec<Timeline>> for TimelinesResp {
    fn from(timelines: Vec<Timeline>) -> Self {
        Self {
            all_timelines: timelines.clone(),
            timelines,
        }
    }
}

pub(crate) async fn split_timelines(
    ReqLang(lang): ReqLang,
    payload: Result<Json<SplitReq>, JsonRejection>,
) -> Envelope<TimelinesResp> {
    let result = body(payload)
        .and_then(|req| split::split(req.duration, req.num, req.start, req.split_type))
        .map(TimelinesResp::from);
    Envelope::from_result(result, lang, lang.pick("时间线生成成功", "Timelines generated"))
}

pub(crate) async fn accumulate_timelines(
    ReqLang(lang): ReqLang,
    payload: Result<Json<AccumulateReq>, JsonRejection>,
) -> Envelope<TimelinesResp> {
    let result = body(payload)
        .and_then(|req| {
            let durations = match req.durations_us {
                Durations::List(v) => v,
                Durations::Text(raw) => split::parse_durations(&raw)?,
            };
            split::accumulate(&durations, req.start)
        })
        .map(TimelinesResp::from);
    Envelope::from_result(result, lang, lang.pick("时间线生成成功", "Timelines generated"))
}

pub(crate) async fn pair_infos(
    ReqLang(lang): ReqLang,
    payload: Result<Json<InfosReq>, JsonRejection>,
) -> Envelope<Value> {
    let result = body(payload).and_then(|req| {
        let records = infos::pair_with_metadata(req.kind, &req.items, &req.timelines, &req.extras)?;
        Ok(json!({ "infos": records }))
    });
    Envelope::from_result(result, lang, lang.pick("信息生成成功", "Infos generated"))
}

pub(crate) async fn keyframe_infos(
    ReqLang(lang): ReqLang,
    payload: Result<Json<KeyframesReq>, JsonRejection>,
) -> Envelope<Value> {
    let result = body(payload).and_then(|req| {
        let frames = keyframes::keyframes_infos(
            &req.ctype,
            &req.offsets,
            &req.values,
            &req.segment_infos,
            req.width,
            req.height,
        )?;
        Ok(json!({ "keyframes": frames }))
    });
    Envelope::from_result(result, lang, lang.pick("关键帧生成成功", "Keyframes generated"))
}
