use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::UiConfigError;

/// 配置值的类型分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    StringList,
    String,
    Boolean,
}

/// SW360 UI 配置键（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfigKey {
    #[serde(rename = "ui.domains")]
    Domains,
    #[serde(rename = "ui.project.type")]
    ProjectType,
    #[serde(rename = "ui.state")]
    State,
    #[serde(rename = "ui.project.tag")]
    ProjectTag,
    #[serde(rename = "ui.project.externalurls")]
    ProjectExternalUrls,
    #[serde(rename = "ui.project.externalkeys")]
    ProjectExternalKeys,
    #[serde(rename = "ui.custommap.project.roles")]
    CustomMapProjectRoles,
    #[serde(rename = "ui.clearing.teams")]
    ClearingTeams,
    #[serde(rename = "ui.clearing.team.unknown.enabled")]
    ClearingTeamUnknownEnabled,
    #[serde(rename = "ui.org.eclipse.sw360.disable.clearing.request.for.project.group")]
    DisableClearingRequestForProjectGroup,
    #[serde(rename = "ui.component.categories")]
    ComponentCategories,
    #[serde(rename = "ui.custommap.component.roles")]
    CustomMapComponentRoles,
    #[serde(rename = "ui.component.externalkeys")]
    ComponentExternalKeys,
    #[serde(rename = "ui.release.externalkeys")]
    ReleaseExternalKeys,
    #[serde(rename = "ui.operating.systems")]
    OperatingSystems,
    #[serde(rename = "ui.programming.languages")]
    ProgrammingLanguages,
    #[serde(rename = "ui.software.platforms")]
    SoftwarePlatforms,
    #[serde(rename = "ui.enable.add.license.info.to.release.button")]
    EnableAddLicenseInfoToReleaseButton,
    #[serde(rename = "ui.custommap.release.roles")]
    CustomMapReleaseRoles,
    #[serde(rename = "ui.custom.welcome.page.guideline")]
    CustomWelcomePageGuideline,
    #[serde(rename = "ui.enable.security.vulnerability.monitoring")]
    EnableSecurityVulnerabilityMonitoring,
    #[serde(rename = "ui.rest.apitoken.generator.enable")]
    RestApiTokenGeneratorEnable,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 22] = [
        ConfigKey::Domains,
        ConfigKey::ProjectType,
        ConfigKey::State,
        ConfigKey::ProjectTag,
        ConfigKey::ProjectExternalUrls,
        ConfigKey::ProjectExternalKeys,
        ConfigKey::CustomMapProjectRoles,
        ConfigKey::ClearingTeams,
        ConfigKey::ClearingTeamUnknownEnabled,
        ConfigKey::DisableClearingRequestForProjectGroup,
        ConfigKey::ComponentCategories,
        ConfigKey::CustomMapComponentRoles,
        ConfigKey::ComponentExternalKeys,
        ConfigKey::ReleaseExternalKeys,
        ConfigKey::OperatingSystems,
        ConfigKey::ProgrammingLanguages,
        ConfigKey::SoftwarePlatforms,
        ConfigKey::EnableAddLicenseInfoToReleaseButton,
        ConfigKey::CustomMapReleaseRoles,
        ConfigKey::CustomWelcomePageGuideline,
        ConfigKey::EnableSecurityVulnerabilityMonitoring,
        ConfigKey::RestApiTokenGeneratorEnable,
    ];

    /// 服务端使用的键名
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Domains => "ui.domains",
            ConfigKey::ProjectType => "ui.project.type",
            ConfigKey::State => "ui.state",
            ConfigKey::ProjectTag => "ui.project.tag",
            ConfigKey::ProjectExternalUrls => "ui.project.externalurls",
            ConfigKey::ProjectExternalKeys => "ui.project.externalkeys",
            ConfigKey::CustomMapProjectRoles => "ui.custommap.project.roles",
            ConfigKey::ClearingTeams => "ui.clearing.teams",
            ConfigKey::ClearingTeamUnknownEnabled => "ui.clearing.team.unknown.enabled",
            ConfigKey::DisableClearingRequestForProjectGroup => {
                "ui.org.eclipse.sw360.disable.clearing.request.for.project.group"
            }
            ConfigKey::ComponentCategories => "ui.component.categories",
            ConfigKey::CustomMapComponentRoles => "ui.custommap.component.roles",
            ConfigKey::ComponentExternalKeys => "ui.component.externalkeys",
            ConfigKey::ReleaseExternalKeys => "ui.release.externalkeys",
            ConfigKey::OperatingSystems => "ui.operating.systems",
            ConfigKey::ProgrammingLanguages => "ui.programming.languages",
            ConfigKey::SoftwarePlatforms => "ui.software.platforms",
            ConfigKey::EnableAddLicenseInfoToReleaseButton => {
                "ui.enable.add.license.info.to.release.button"
            }
            ConfigKey::CustomMapReleaseRoles => "ui.custommap.release.roles",
            ConfigKey::CustomWelcomePageGuideline => "ui.custom.welcome.page.guideline",
            ConfigKey::EnableSecurityVulnerabilityMonitoring => {
                "ui.enable.security.vulnerability.monitoring"
            }
            ConfigKey::RestApiTokenGeneratorEnable => "ui.rest.apitoken.generator.enable",
        }
    }

    /// 键 → 值类型。新增键必须在这里归类，否则编译不通过。
    pub fn kind(self) -> ValueKind {
        match self {
            ConfigKey::Domains
            | ConfigKey::ProjectType
            | ConfigKey::State
            | ConfigKey::ProjectTag
            | ConfigKey::ProjectExternalUrls
            | ConfigKey::ProjectExternalKeys
            | ConfigKey::CustomMapProjectRoles
            | ConfigKey::ClearingTeams
            | ConfigKey::DisableClearingRequestForProjectGroup
            | ConfigKey::ComponentCategories
            | ConfigKey::CustomMapComponentRoles
            | ConfigKey::ComponentExternalKeys
            | ConfigKey::ReleaseExternalKeys
            | ConfigKey::OperatingSystems
            | ConfigKey::ProgrammingLanguages
            | ConfigKey::SoftwarePlatforms
            | ConfigKey::CustomMapReleaseRoles => ValueKind::StringList,
            ConfigKey::ClearingTeamUnknownEnabled
            | ConfigKey::EnableAddLicenseInfoToReleaseButton
            | ConfigKey::CustomWelcomePageGuideline
            | ConfigKey::EnableSecurityVulnerabilityMonitoring
            | ConfigKey::RestApiTokenGeneratorEnable => ValueKind::Boolean,
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = UiConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UiConfigError::UnknownKey(s.to_string()))
    }
}

/// 解析后的配置值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl ConfigValue {
    /// 该类型的缺省值：空列表 / 空字符串 / false
    pub fn default_for(kind: ValueKind) -> Self {
        match kind {
            ValueKind::StringList => ConfigValue::List(Vec::new()),
            ValueKind::String => ConfigValue::Text(String::new()),
            ValueKind::Boolean => ConfigValue::Bool(false),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            ConfigValue::Bool(_) => ValueKind::Boolean,
            ConfigValue::Text(_) => ValueKind::String,
            ConfigValue::List(_) => ValueKind::StringList,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// 服务端下发的原始配置：键 → 未解析的字符串
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawConfig(BTreeMap<String, String>);

impl RawConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 对象构造。非字符串的标量按其 JSON 文本保存。
    pub fn from_json_map(map: serde_json::Map<String, serde_json::Value>) -> Self {
        let entries = map
            .into_iter()
            .map(|(k, v)| {
                let raw = match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, raw)
            })
            .collect();
        Self(entries)
    }

    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        self.0.get(key.as_str()).map(|s| s.as_str())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// 列表值以 JSON 数组文本存储
    pub fn set_list(&mut self, key: ConfigKey, values: &[String]) -> crate::error::Result<()> {
        let encoded = serde_json::to_string(values)?;
        self.0.insert(key.as_str().to_string(), encoded);
        Ok(())
    }

    pub fn set_bool(&mut self, key: ConfigKey, value: bool) {
        self.0.insert(key.as_str().to_string(), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

/// 解析后的配置：每个键都有一个与其类型一致的值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedConfig {
    values: BTreeMap<ConfigKey, ConfigValue>,
}

impl ProcessedConfig {
    /// 所有键取类型缺省值
    pub fn defaults() -> Self {
        let values = ConfigKey::ALL
            .into_iter()
            .map(|k| (k, ConfigValue::default_for(k.kind())))
            .collect();
        Self { values }
    }

    pub fn get(&self, key: ConfigKey) -> Option<&ConfigValue> {
        self.values.get(&key)
    }

    /// 写入值；类型与键不符时拒绝
    pub fn set(&mut self, key: ConfigKey, value: ConfigValue) -> bool {
        if value.kind() != key.kind() {
            return false;
        }
        self.values.insert(key, value);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConfigKey, &ConfigValue)> {
        self.values.iter()
    }
}

impl Serialize for ProcessedConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let map: BTreeMap<&'static str, &ConfigValue> =
            self.values.iter().map(|(k, v)| (k.as_str(), v)).collect();
        map.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ProcessedConfig {
    /// 未知键忽略，缺失或类型不符的键回落到缺省值
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<String, ConfigValue>::deserialize(deserializer)?;
        let mut config = ProcessedConfig::defaults();
        for (name, value) in map {
            if let Ok(key) = name.parse::<ConfigKey>() {
                config.set(key, value);
            }
        }
        Ok(config)
    }
}

/// 持久化记录：配置 + 拉取时间（毫秒时间戳）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedConfig {
    pub data: ProcessedConfig,
    pub timestamp: i64,
}

impl CachedConfig {
    pub fn new(data: ProcessedConfig, timestamp: i64) -> Self {
        Self { data, timestamp }
    }

    /// now - timestamp 超过 ttl 即过期。时间戳来自持久化文件，晚于当前时间的同样视为过期。
    pub fn is_expired_at(&self, now_ms: i64, ttl_ms: i64) -> bool {
        if self.timestamp > now_ms {
            return true;
        }
        now_ms.saturating_sub(self.timestamp) > ttl_ms
    }
}

/// 配置容器（REST 路径段）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationContainer {
    UiConfiguration,
}

impl ConfigurationContainer {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigurationContainer::UiConfiguration => "UI_CONFIGURATION",
        }
    }
}

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Loading,
    Authenticated,
    Unauthenticated,
}

/// 已认证会话
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
}
