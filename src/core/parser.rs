use crate::models::{ConfigKey, ConfigValue, ProcessedConfig, RawConfig, ValueKind};

/// 按值类型解析单个原始值。不会失败：畸形输入回落到该类型的缺省值。
pub fn parse_value(kind: ValueKind, raw: Option<&str>) -> ConfigValue {
    match kind {
        ValueKind::StringList => ConfigValue::List(parse_string_list(raw)),
        ValueKind::String => ConfigValue::Text(raw.unwrap_or_default().to_string()),
        ValueKind::Boolean => {
            ConfigValue::Bool(raw.is_some_and(|s| s.eq_ignore_ascii_case("true")))
        }
    }
}

/// JSON 数组 → 去空白、去空项，保持顺序
fn parse_string_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(items) => items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Err(e) => {
            tracing::debug!("列表值不是合法的 JSON 字符串数组，按空列表处理: {}", e);
            Vec::new()
        }
    }
}

pub fn parse_key(key: ConfigKey, raw: &RawConfig) -> ConfigValue {
    parse_value(key.kind(), raw.get(key))
}

/// RawConfig → ProcessedConfig，覆盖注册表中的全部键
pub fn parse_raw_ui_config(raw: &RawConfig) -> ProcessedConfig {
    let mut config = ProcessedConfig::defaults();
    for key in ConfigKey::ALL {
        config.set(key, parse_key(key, raw));
    }
    config
}
