//! 统一响应信封：`{code, message, data}`。
//!
//! 传输层永远返回 200，成功与否只看 `code`（0 为成功）。失败时 `data` 为 null。

pub mod error;
pub mod lang;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

pub use error::{DraftError, ErrorCode};
pub use lang::Lang;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success.code(),
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(err: &DraftError, lang: Lang) -> Self {
        let code = err.code();
        if code == ErrorCode::Internal {
            error!(target: "web", error = %err, "internal error");
        }
        let mut message = code.message(lang).to_string();
        if let Some(detail) = err.public_detail() {
            message.push_str(&format!(" ({detail})"));
        }
        Self {
            code: code.code(),
            message,
            data: None,
        }
    }

    /// 成功时使用操作自身的提示文案，失败时走错误码表。
    pub fn from_result(result: Result<T, DraftError>, lang: Lang, ok_message: &str) -> Self {
        match result {
            Ok(data) => Self::success(data, ok_message),
            Err(err) => Self::failure(&err, lang),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == ErrorCode::Success.code()
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
