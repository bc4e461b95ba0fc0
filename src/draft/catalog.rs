//! 特效/滤镜名称集合。
//!
//! 剪映的完整特效库不随本服务分发，这里只收录已在插件工作流与草稿示例中使用过的
//! 名称；未收录的名称按参数错误处理。兼容带枚举前缀的写法，如
//! `VideoSceneEffectType.GLITCH`、`VideoCharacterEffectType.幻影`、`FilterType.暖冬`。

/// 场景特效与人物特效共用一个集合，两种前缀都在这里查找。
pub const EFFECT_TYPES: &[&str] = &[
    "GLITCH", "幻影", "闪白", "模糊", "高级模糊", "锐化", "马赛克", "黑白", "怀旧", "色彩校正",
    "光芒四射", "光效闪烁", "粒子爆炸",
];

pub const FILTER_TYPES: &[&str] = &["暖冬"];

const EFFECT_PREFIXES: &[&str] = &["VideoSceneEffectType", "VideoCharacterEffectType"];
const FILTER_PREFIXES: &[&str] = &["FilterType"];

pub fn resolve_effect(raw: &str) -> Option<&'static str> {
    resolve(EFFECT_TYPES, EFFECT_PREFIXES, raw)
}

pub fn resolve_filter(raw: &str) -> Option<&'static str> {
    resolve(FILTER_TYPES, FILTER_PREFIXES, raw)
}

/// 去掉已知前缀后精确匹配集合成员，返回规范名称。
fn resolve(
    set: &'static [&'static str],
    prefixes: &[&str],
    raw: &str,
) -> Option<&'static str> {
    let name = raw.trim();
    let name = match name.split_once('.') {
        Some((prefix, rest)) if prefixes.contains(&prefix) => rest,
        Some(_) => return None,
        None => name,
    };
    set.iter().copied().find(|m| *m == name)
}
