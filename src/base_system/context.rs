//! 全局配置结构（Config）与默认值。
//!
//! 该模块同时提供生成 `config.yml` 的字段元信息。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::config::{ConfigError, ConfigSpec, FieldMeta};
use crate::response::Lang;

/// 帧率上限，与草稿格式的取值范围一致。
pub const FPS_CEILING: u32 = 120;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // 服务配置
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_lang")]
    pub default_lang: String,

    // 草稿配置
    #[serde(default)]
    pub drafts_dir: String,
    #[serde(default = "default_max_fps")]
    pub max_fps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            default_lang: default_lang(),
            drafts_dir: String::new(),
            max_fps: default_max_fps(),
        }
    }
}

impl ConfigSpec for Config {
    const FILE_NAME: &'static str = "config.yml";

    fn fields() -> &'static [FieldMeta] {
        static FIELDS: [FieldMeta; 4] = [
            FieldMeta {
                name: "bind_addr",
                description: "HTTP 监听地址，多个地址用逗号分隔（环境变量 DRAFTLINE_ADDR 优先）",
            },
            FieldMeta {
                name: "default_lang",
                description: "请求未携带 Accept-Language 时的响应语言（zh / en）",
            },
            FieldMeta {
                name: "drafts_dir",
                description: "草稿保存目录，留空则使用数据目录下的 drafts",
            },
            FieldMeta {
                name: "max_fps",
                description: "允许的最大帧率（1-120）",
            },
        ];
        &FIELDS
    }
}

impl Config {
    /// 草稿根目录；`drafts_dir` 为空时落在 `<base_dir>/drafts`。
    pub fn drafts_root(&self, base_dir: Option<&Path>) -> PathBuf {
        if self.drafts_dir.trim().is_empty() {
            base_dir
                .map(Path::to_path_buf)
                .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
                .join("drafts")
        } else {
            PathBuf::from(self.drafts_dir.trim())
        }
    }

    pub fn lang(&self) -> Result<Lang, ConfigError> {
        self.default_lang
            .parse::<Lang>()
            .map_err(|e| ConfigError::Validation(format!("default_lang: {e}")))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_fps == 0 || self.max_fps > FPS_CEILING {
            return Err(ConfigError::Validation(format!(
                "max_fps must be within [1, {FPS_CEILING}], got {}",
                self.max_fps
            )));
        }
        self.lang()?;
        Ok(())
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:18423".to_string()
}

fn default_lang() -> String {
    "zh".to_string()
}

fn default_max_fps() -> u32 {
    FPS_CEILING
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base_system::config::{generate_yaml_with_comments, load_or_create_with_base};

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.lang().unwrap(), Lang::Zh);
        let base = Path::new("/data");
        assert_eq!(cfg.drafts_root(Some(base)), base.join("drafts"));
    }

    #[test]
    fn rejects_bad_values() {
        let cfg = Config {
            max_fps: 240,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = Config {
            default_lang: "fr".into(),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn generated_yaml_is_commented() {
        let yaml = generate_yaml_with_comments(&Config::default()).unwrap();
        assert!(yaml.contains("# 允许的最大帧率"));
        assert!(yaml.contains("max_fps: 120"));
    }

    #[test]
    fn partial_file_is_merged_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.yml"), "max_fps: 60\n").unwrap();
        let cfg: Config = load_or_create_with_base(None, Some(dir.path())).unwrap();
        assert_eq!(cfg.max_fps, 60);
        assert_eq!(cfg.bind_addr, "127.0.0.1:18423");

        // 缺失字段会被补写回文件
        let raw = std::fs::read_to_string(dir.path().join("config.yml")).unwrap();
        assert!(raw.contains("bind_addr"));
        assert!(raw.contains("max_fps: 60"));
    }

    #[test]
    fn missing_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let cfg: Config = load_or_create_with_base(None, Some(dir.path())).unwrap();
        assert_eq!(cfg.default_lang, "zh");
        assert!(dir.path().join("config.yml").exists());
    }
}
