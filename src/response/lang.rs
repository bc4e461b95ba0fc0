use std::str::FromStr;

/// 响应文案语言。只影响 `message`，不影响 `code`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    Zh,
    En,
}

impl Lang {
    /// 解析 `Accept-Language`：包含 `zh` 即中文，否则英文；缺省时使用 `fallback`。
    pub fn from_accept_language(header: Option<&str>, fallback: Lang) -> Lang {
        match header.map(str::trim) {
            None | Some("") => fallback,
            Some(h) if h.to_ascii_lowercase().contains("zh") => Lang::Zh,
            Some(_) => Lang::En,
        }
    }

    pub fn pick(self, zh: &'static str, en: &'static str) -> &'static str {
        match self {
            Lang::Zh => zh,
            Lang::En => en,
        }
    }
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "cn" => Ok(Lang::Zh),
            "en" | "en-us" => Ok(Lang::En),
            other => Err(format!("unsupported language '{other}', expected zh or en")),
        }
    }
}
