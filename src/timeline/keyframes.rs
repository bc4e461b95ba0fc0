//! 关键帧展开：把百分比偏移映射为片段内的绝对微秒偏移。

use serde::{Deserialize, Serialize};

use crate::response::DraftError;

const DEFAULT_WIDTH: u32 = 1920;
const DEFAULT_HEIGHT: u32 = 1080;

#[derive(Debug, Clone, Deserialize)]
pub struct KeyframeSegment {
    pub id: String,
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub end: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyframeInfo {
    pub segment_id: String,
    pub property: String,
    pub offset: u64,
    pub value: f64,
}

/// `offsets` 与 `values` 均为 `|` 分隔，如 `"0|50|100"`、`"0|1|0"`。
///
/// 位移类属性按画布宽高归一化，未给出时按 1920x1080。
pub fn keyframes_infos(
    ctype: &str,
    offsets: &str,
    values: &str,
    segments: &[KeyframeSegment],
    width: Option<u32>,
    height: Option<u32>,
) -> Result<Vec<KeyframeInfo>, DraftError> {
    let ctype = ctype.trim();
    if ctype.is_empty() {
        return Err(DraftError::validation("ctype", "must not be empty"));
    }

    let pcts = parse_pipe_floats("offsets", offsets)?;
    let vals = parse_pipe_floats("values", values)?;
    if pcts.len() != vals.len() {
        return Err(DraftError::validation(
            "values",
            format!(
                "offsets count ({}) does not match values count ({})",
                pcts.len(),
                vals.len()
            ),
        ));
    }
    if pcts.is_empty() {
        return Err(DraftError::validation("offsets", "must not be empty"));
    }
    if segments.is_empty() {
        return Err(DraftError::validation("segment_infos", "must not be empty"));
    }

    let divisor = match ctype {
        "KFTypePositionX" => f64::from(width.filter(|w| *w > 0).unwrap_or(DEFAULT_WIDTH)),
        "KFTypePositionY" => f64::from(height.filter(|h| *h > 0).unwrap_or(DEFAULT_HEIGHT)),
        _ => 1.0,
    };

    let mut out = Vec::with_capacity(segments.len() * pcts.len());
    for seg in segments {
        let seg_dur = seg.end.saturating_sub(seg.start).max(1);
        for (pct, raw) in pcts.iter().zip(&vals) {
            out.push(KeyframeInfo {
                segment_id: seg.id.clone(),
                property: ctype.to_string(),
                offset: (seg_dur as f64 * pct / 100.0) as u64,
                value: raw / divisor,
            });
        }
    }
    Ok(out)
}

fn parse_pipe_floats(field: &str, raw: &str) -> Result<Vec<f64>, DraftError> {
    raw.split('|')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<f64>()
                .map_err(|_| DraftError::validation(field, format!("'{p}' is not a number")))
        })
        .collect()
}
