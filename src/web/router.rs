use axum::Router;
use axum::extract::connect_info::ConnectInfo;
use axum::http::Request;
use axum::middleware::{Next, from_fn};
use axum::response::Response;
use axum::routing::{delete, get, post};

use tracing::info;

use super::routes;
use super::state::AppState;

pub(crate) fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(routes::status::api_status))
        .route("/api/drafts", post(routes::drafts::create_draft))
        .route("/api/drafts/:draft_id", delete(routes::drafts::delete_draft))
        .route(
            "/api/drafts/:draft_id/status",
            get(routes::drafts::draft_status),
        )
        .route("/api/drafts/:draft_id/tracks", post(routes::drafts::add_track))
        .route(
            "/api/drafts/:draft_id/tracks/:track_type/:track_index",
            delete(routes::drafts::remove_track),
        )
        .route(
            "/api/drafts/:draft_id/segments",
            post(routes::drafts::add_segment),
        )
        .route(
            "/api/drafts/:draft_id/segments/:segment_id",
            delete(routes::drafts::detach_segment),
        )
        .route(
            "/api/drafts/:draft_id/effects",
            post(routes::drafts::add_global_effect),
        )
        .route(
            "/api/drafts/:draft_id/filters",
            post(routes::drafts::add_global_filter),
        )
        .route("/api/drafts/:draft_id/save", post(routes::drafts::save_draft))
        .route("/api/segments", post(routes::segments::create_segment))
        .route(
            "/api/segments/:segment_id",
            get(routes::segments::segment_detail).delete(routes::segments::delete_segment),
        )
        .route(
            "/api/segments/:segment_id/status",
            post(routes::segments::update_status),
        )
        .route("/api/timelines", post(routes::timelines::split_timelines))
        .route(
            "/api/timelines/accumulate",
            post(routes::timelines::accumulate_timelines),
        )
        .route("/api/infos", post(routes::timelines::pair_infos))
        .route("/api/keyframes", post(routes::timelines::keyframe_infos))
        .layer(from_fn(access_log_mw))
        .with_state(state)
}

async fn access_log_mw(req: Request<axum::body::Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let method = req.method().to_string();
    let ip = req
        .extensions()
        .get::<ConnectInfo<std::net::SocketAddr>>()
        .map(|c| c.0)
        .map(|a| a.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let resp = next.run(req).await;
    info!(target: "web_access", ip = %ip, method = %method, path = %path, status = %resp.status().as_u16(), "ok");
    resp
}
