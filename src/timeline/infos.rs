//! 素材引用列表与时间线按位置配对。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Timeline;
use crate::response::DraftError;

/// 引用的种类，决定记录里引用字段的键名。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoKind {
    Audio,
    Video,
    Image,
    Effect,
    Caption,
}

impl InfoKind {
    pub fn reference_key(self) -> &'static str {
        match self {
            InfoKind::Audio => "audio_url",
            InfoKind::Video => "video_url",
            InfoKind::Image => "image_url",
            InfoKind::Effect => "effect_title",
            InfoKind::Caption => "text",
        }
    }
}

/// 逐一配对 `items[i]` 与 `timelines[i]`，`extras` 原样附加到每一条记录。
///
/// 只按下标对齐，不做排序。
pub fn pair_with_metadata(
    kind: InfoKind,
    items: &[String],
    timelines: &[Timeline],
    extras: &Map<String, Value>,
) -> Result<Vec<Value>, DraftError> {
    if items.len() != timelines.len() {
        return Err(DraftError::validation(
            "timelines",
            format!(
                "items count ({}) does not match timelines count ({})",
                items.len(),
                timelines.len()
            ),
        ));
    }

    let key = kind.reference_key();
    if let Some(reserved) = extras
        .keys()
        .find(|k| k.as_str() == key || k.as_str() == "start" || k.as_str() == "end")
    {
        return Err(DraftError::validation(
            reserved.clone(),
            "reserved field cannot be supplied as an extra",
        ));
    }

    Ok(items
        .iter()
        .zip(timelines)
        .map(|(item, tl)| {
            let mut record = Map::with_capacity(extras.len() + 3);
            record.insert(key.to_string(), Value::String(item.clone()));
            record.insert("start".to_string(), Value::from(tl.start));
            record.insert("end".to_string(), Value::from(tl.end));
            for (k, v) in extras {
                record.insert(k.clone(), v.clone());
            }
            Value::Object(record)
        })
        .collect())
}
