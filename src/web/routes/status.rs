use axum::extract::State;
use serde_json::{Value, json};

use crate::response::Envelope;
use crate::web::extract::ReqLang;
use crate::web::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) async fn api_status(
    State(state): State<AppState>,
    ReqLang(lang): ReqLang,
) -> Envelope<Value> {
    let binds: Vec<String> = state.bind_addrs.iter().map(|a| a.to_string()).collect();
    Envelope::success(
        json!({
            "version": VERSION,
            "draft_count": state.store.draft_count(),
            "bind_addrs": binds,
            "config": {
                "drafts_dir": state.config_view.drafts_dir,
                "max_fps": state.config_view.max_fps,
            }
        }),
        lang.pick("服务运行中", "Service is running"),
    )
}
