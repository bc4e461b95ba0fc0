//! 请求提取：响应语言与请求体/路径参数的校验错误归一。

use std::convert::Infallible;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequestParts, Path};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;

use super::state::AppState;
use crate::response::{DraftError, Lang};

/// 由 `Accept-Language` 决定的响应语言，缺省时取配置里的 `default_lang`。
pub(crate) struct ReqLang(pub(crate) Lang);

#[axum::async_trait]
impl FromRequestParts<AppState> for ReqLang {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());
        Ok(ReqLang(Lang::from_accept_language(header, state.default_lang)))
    }
}

/// 请求体解析失败按参数校验错误处理，而不是返回 4xx。
pub(crate) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, DraftError> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| DraftError::validation("body", e.body_text()))
}

pub(crate) fn path<T>(params: Result<Path<T>, PathRejection>) -> Result<T, DraftError> {
    params
        .map(|Path(v)| v)
        .map_err(|e| DraftError::validation("path", e.body_text()))
}
