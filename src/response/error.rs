//! 错误分类与稳定错误码表。
//!
//! 核心层只抛出 `DraftError`，由响应层统一翻译为 `{code, message, data}`。
//! 错误码与语言无关，发布后不得改变含义。

use thiserror::Error;

use super::lang::Lang;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("{field}: {reason}")]
    Validation { field: String, reason: String },
    #[error("draft_id={0}")]
    DraftNotFound(String),
    #[error("segment_id={0}")]
    SegmentNotFound(String),
    #[error("{0}")]
    TrackNotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{from} -> {to}")]
    InvalidStateTransition { from: String, to: String },
    #[error("{0}")]
    Internal(String),
}

impl DraftError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict(reason.into())
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal(reason.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::ValidationFailed,
            Self::DraftNotFound(_) => ErrorCode::DraftNotFound,
            Self::SegmentNotFound(_) => ErrorCode::SegmentNotFound,
            Self::TrackNotFound(_) => ErrorCode::TrackNotFound,
            Self::Conflict(_) => ErrorCode::Conflict,
            Self::InvalidStateTransition { .. } => ErrorCode::InvalidStateTransition,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// 对外可见的错误细节；内部错误只记日志，不透出。
    pub fn public_detail(&self) -> Option<String> {
        match self {
            Self::Internal(_) => None,
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success,
    ValidationFailed,
    DraftNotFound,
    SegmentNotFound,
    TrackNotFound,
    Conflict,
    InvalidStateTransition,
    Internal,
}

impl ErrorCode {
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::DraftNotFound => 1001,
            Self::SegmentNotFound => 1002,
            Self::TrackNotFound => 1003,
            Self::ValidationFailed => 1400,
            Self::Conflict => 1409,
            Self::InvalidStateTransition => 1422,
            Self::Internal => 1500,
        }
    }

    pub const fn message(self, lang: Lang) -> &'static str {
        match (self, lang) {
            (Self::Success, Lang::Zh) => "成功",
            (Self::Success, Lang::En) => "Success",
            (Self::DraftNotFound, Lang::Zh) => "草稿不存在",
            (Self::DraftNotFound, Lang::En) => "Draft not found",
            (Self::SegmentNotFound, Lang::Zh) => "片段不存在",
            (Self::SegmentNotFound, Lang::En) => "Segment not found",
            (Self::TrackNotFound, Lang::Zh) => "轨道不存在",
            (Self::TrackNotFound, Lang::En) => "Track not found",
            (Self::ValidationFailed, Lang::Zh) => "参数验证失败",
            (Self::ValidationFailed, Lang::En) => "Validation failed",
            (Self::Conflict, Lang::Zh) => "状态冲突",
            (Self::Conflict, Lang::En) => "Conflict",
            (Self::InvalidStateTransition, Lang::Zh) => "状态转换无效",
            (Self::InvalidStateTransition, Lang::En) => "Invalid state transition",
            (Self::Internal, Lang::Zh) => "内部错误",
            (Self::Internal, Lang::En) => "Internal error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_maps_to_one_code() {
        let cases = [
            (DraftError::validation("fps", "must be > 0"), 1400),
            (DraftError::DraftNotFound("d".into()), 1001),
            (DraftError::SegmentNotFound("s".into()), 1002),
            (DraftError::TrackNotFound("video#0".into()), 1003),
            (DraftError::conflict("attached"), 1409),
            (
                DraftError::InvalidStateTransition {
                    from: "completed".into(),
                    to: "downloading".into(),
                },
                1422,
            ),
            (DraftError::internal("disk full"), 1500),
        ];
        for (err, code) in cases {
            assert_eq!(err.code().code(), code, "{err:?}");
        }
    }

    #[test]
    fn internal_detail_is_hidden() {
        assert_eq!(DraftError::internal("/secret/path").public_detail(), None);
        assert_eq!(
            DraftError::validation("fps", "must be greater than 0").public_detail(),
            Some("fps: must be greater than 0".to_string())
        );
    }

    #[test]
    fn messages_are_localized() {
        assert_eq!(ErrorCode::DraftNotFound.message(Lang::Zh), "草稿不存在");
        assert_eq!(ErrorCode::DraftNotFound.message(Lang::En), "Draft not found");
    }
}
