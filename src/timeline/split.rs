//! 平均/随机切分与按时长累加。

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Timeline;
use crate::response::DraftError;

/// 单次切分允许的最大段数。
pub const MAX_SPLIT_NUM: u32 = 10_000;

/// 切分方式：0 = 平均，1 = 随机。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SplitType {
    #[default]
    Even,
    Random,
}

impl TryFrom<u8> for SplitType {
    type Error = DraftError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(SplitType::Even),
            1 => Ok(SplitType::Random),
            other => Err(DraftError::validation(
                "split_type",
                format!("expected 0 (even) or 1 (random), got {other}"),
            )),
        }
    }
}

impl From<SplitType> for u8 {
    fn from(v: SplitType) -> u8 {
        match v {
            SplitType::Even => 0,
            SplitType::Random => 1,
        }
    }
}

pub fn split(
    duration: u64,
    num: u32,
    start: u64,
    split_type: SplitType,
) -> Result<Vec<Timeline>, DraftError> {
    match split_type {
        SplitType::Even => split_even(duration, num, start),
        SplitType::Random => split_random(duration, num, start),
    }
}

/// 平均切分；最后一段吸收整除余数，总长恒等于 `duration`。
pub fn split_even(duration: u64, num: u32, start: u64) -> Result<Vec<Timeline>, DraftError> {
    check_split_args(duration, num, start)?;

    let n = u64::from(num);
    let seg = duration / n;
    let out = (0..n)
        .map(|i| {
            let seg_start = start + i * seg;
            let seg_end = if i == n - 1 {
                start + duration
            } else {
                seg_start + seg
            };
            Timeline {
                start: seg_start,
                end: seg_end,
            }
        })
        .collect();

    debug!(target: "timeline", duration, num, start, "split_even");
    Ok(out)
}

pub fn split_random(duration: u64, num: u32, start: u64) -> Result<Vec<Timeline>, DraftError> {
    split_random_with(&mut rand::rng(), duration, num, start)
}

/// 随机切分：在 `[1, duration-1]` 上独立均匀抽取 `num-1` 个分界点。
///
/// 分界点可能重合，此时会产生零长度的段。`num <= duration` 保证 `num > 1` 时
/// 候选区间非空。
pub fn split_random_with<R: Rng + ?Sized>(
    rng: &mut R,
    duration: u64,
    num: u32,
    start: u64,
) -> Result<Vec<Timeline>, DraftError> {
    check_split_args(duration, num, start)?;

    let mut points: Vec<u64> = Vec::with_capacity(num as usize + 1);
    points.push(0);
    points.extend((1..num).map(|_| rng.random_range(1..duration)));
    points[1..].sort_unstable();
    points.push(duration);

    debug!(target: "timeline", duration, num, start, "split_random");
    Ok(points
        .windows(2)
        .map(|w| Timeline {
            start: start + w[0],
            end: start + w[1],
        })
        .collect())
}

/// 将一组时长首尾相接排在时间线上。
pub fn accumulate(durations: &[i64], start: u64) -> Result<Vec<Timeline>, DraftError> {
    if durations.is_empty() {
        return Err(DraftError::validation("durations", "must not be empty"));
    }

    let mut cursor = start;
    let mut out = Vec::with_capacity(durations.len());
    for &dur in durations {
        if dur <= 0 {
            return Err(DraftError::validation(
                "durations",
                format!("every duration must be greater than 0, got {dur}"),
            ));
        }
        let end = cursor
            .checked_add(dur as u64)
            .ok_or_else(|| DraftError::validation("durations", "total duration overflows"))?;
        out.push(Timeline { start: cursor, end });
        cursor = end;
    }

    debug!(target: "timeline", count = out.len(), total = cursor - start, "accumulate");
    Ok(out)
}

/// 解析逗号分隔的时长列表，如 `"5000000,4000000,6000000"`。
pub fn parse_durations(raw: &str) -> Result<Vec<i64>, DraftError> {
    let parts: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        return Err(DraftError::validation("durations_us", "must not be empty"));
    }
    parts
        .into_iter()
        .map(|p| {
            p.parse::<i64>().map_err(|_| {
                DraftError::validation("durations_us", format!("'{p}' is not an integer"))
            })
        })
        .collect()
}

fn check_split_args(duration: u64, num: u32, start: u64) -> Result<(), DraftError> {
    if duration == 0 {
        return Err(DraftError::validation("duration", "must be greater than 0"));
    }
    if num == 0 {
        return Err(DraftError::validation("num", "must be greater than 0"));
    }
    if num > MAX_SPLIT_NUM {
        return Err(DraftError::validation(
            "num",
            format!("must not exceed {MAX_SPLIT_NUM}, got {num}"),
        ));
    }
    // 每段至少 1µs
    if u64::from(num) > duration {
        return Err(DraftError::validation(
            "num",
            format!("must not exceed duration ({duration}), got {num}"),
        ));
    }
    if start.checked_add(duration).is_none() {
        return Err(DraftError::validation("start", "start + duration overflows"));
    }
    Ok(())
}
