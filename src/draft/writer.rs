//! 草稿落盘。

use std::path::{Path, PathBuf};

use tracing::info;

use super::models::Draft;
use crate::response::DraftError;

pub const DRAFT_FILE_NAME: &str = "draft_info.json";

pub trait DraftWriter: Send + Sync {
    /// 写出草稿快照，返回最终文件路径。
    fn write(&self, draft: &Draft) -> Result<PathBuf, DraftError>;
}

/// 写到 `<root>/<draft_id>/draft_info.json`。
#[derive(Debug, Clone)]
pub struct JsonDraftWriter {
    root: PathBuf,
}

impl JsonDraftWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DraftWriter for JsonDraftWriter {
    fn write(&self, draft: &Draft) -> Result<PathBuf, DraftError> {
        let dir = self.root.join(&draft.draft_id);
        std::fs::create_dir_all(&dir)
            .map_err(|e| DraftError::internal(format!("create {}: {e}", dir.display())))?;

        let bytes = serde_json::to_vec_pretty(draft)
            .map_err(|e| DraftError::internal(format!("serialize draft: {e}")))?;
        let path = dir.join(DRAFT_FILE_NAME);
        write_atomic(&path, &bytes)
            .map_err(|e| DraftError::internal(format!("write {}: {e}", path.display())))?;

        info!(target: "draft", draft_id = %draft.draft_id, path = %path.display(), "draft saved");
        Ok(path)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.part");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(tmp, path)
}
