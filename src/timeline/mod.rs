//! 时间线切分引擎。
//!
//! 纯计算模块：无状态、无 I/O。所有时间单位为微秒。
//!
//! 子模块：
//! - `split`      ：平均/随机切分、按时长累加
//! - `infos`      ：素材引用与时间线按位配对
//! - `keyframes`  ：按百分比偏移展开关键帧

pub mod infos;
pub mod keyframes;
pub mod split;

use serde::{Deserialize, Serialize};

use crate::response::DraftError;

/// 片段在轨道上的时间范围 `(start, duration)`，`duration` 恒大于 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeRange")]
pub struct TimeRange {
    start: u64,
    duration: u64,
}

#[derive(Deserialize)]
struct RawTimeRange {
    #[serde(default)]
    start: u64,
    duration: u64,
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = DraftError;

    fn try_from(raw: RawTimeRange) -> Result<Self, Self::Error> {
        TimeRange::new(raw.start, raw.duration)
    }
}

impl TimeRange {
    pub fn new(start: u64, duration: u64) -> Result<Self, DraftError> {
        if duration == 0 {
            return Err(DraftError::validation(
                "duration",
                "must be greater than 0",
            ));
        }
        if start.checked_add(duration).is_none() {
            return Err(DraftError::validation("duration", "start + duration overflows"));
        }
        Ok(Self { start, duration })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn end(&self) -> u64 {
        self.start + self.duration
    }
}

/// 切分结果 `{start, end}`。随机切分时允许零长度。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub start: u64,
    pub end: u64,
}

impl Timeline {
    pub fn duration(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn to_timerange(&self) -> Result<TimeRange, DraftError> {
        if self.end < self.start {
            return Err(DraftError::validation(
                "timeline",
                format!("end {} is before start {}", self.end, self.start),
            ));
        }
        TimeRange::new(self.start, self.duration())
    }
}
