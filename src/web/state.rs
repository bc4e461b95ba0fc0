use std::net::SocketAddr;
use std::sync::Arc;

use crate::draft::DraftStore;
use crate::response::Lang;

#[derive(Clone, Debug)]
pub(crate) struct ConfigView {
    pub(crate) drafts_dir: String,
    pub(crate) max_fps: u32,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) bind_addrs: Arc<Vec<SocketAddr>>,
    pub(crate) config_view: Arc<ConfigView>,
    pub(crate) default_lang: Lang,
    pub(crate) store: Arc<DraftStore>,
}
