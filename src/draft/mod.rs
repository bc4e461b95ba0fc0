//! 草稿聚合：草稿、轨道、片段的生命周期与状态查询。
//!
//! 子模块：
//! - `models`   ：数据模型与下载状态机
//! - `catalog`  ：特效/滤镜取值集合
//! - `store`    ：并发安全的草稿存储
//! - `status`   ：只读状态投影
//! - `writer`   ：草稿落盘
//! - `dispatch` ：素材下载交接

pub mod catalog;
pub mod dispatch;
pub mod models;
pub mod status;
pub mod store;
pub mod writer;

pub use dispatch::DownloadRequest;
pub use models::{DownloadStatus, NewSegment, TrackType};
pub use store::DraftStore;
pub use writer::JsonDraftWriter;
