use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;

use crate::error::{Result, UiConfigError};
use crate::models::{ConfigurationContainer, RawConfig};

/// 一次 REST 调用的结果分类
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome<T> {
    Ok(T),
    Unauthorized,
    Failed { status: u16, body: String },
}

/// SW360 REST 配置容器客户端
#[derive(Clone)]
pub struct Sw360Client {
    base_url: String,
    http_client: reqwest::Client,
}

impl Sw360Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `<api-base>/configurations/container/<container>`
    pub fn container_url(&self, container: ConfigurationContainer) -> String {
        format!(
            "{}/configurations/container/{}",
            self.base_url,
            container.as_str()
        )
    }

    /// GET 配置容器。传输错误或响应体不是 JSON 对象时返回 Err。
    pub async fn get_configuration(
        &self,
        container: ConfigurationContainer,
        token: &str,
    ) -> Result<ApiOutcome<RawConfig>> {
        let url = self.container_url(container);
        tracing::debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .header(AUTHORIZATION, authorization_value(token))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                let map = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&body)?;
                Ok(ApiOutcome::Ok(RawConfig::from_json_map(map)))
            }
            StatusCode::UNAUTHORIZED => Ok(ApiOutcome::Unauthorized),
            status => {
                let body = response.text().await.unwrap_or_default();
                Ok(ApiOutcome::Failed {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    /// PATCH 配置容器
    pub async fn patch_configuration(
        &self,
        container: ConfigurationContainer,
        raw: &RawConfig,
        token: &str,
    ) -> Result<ApiOutcome<()>> {
        let url = self.container_url(container);
        tracing::debug!("PATCH {} ({} keys)", url, raw.len());

        let response = self
            .http_client
            .patch(&url)
            .header(AUTHORIZATION, authorization_value(token))
            .header(ACCEPT, "application/json")
            .json(raw)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(ApiOutcome::Ok(())),
            StatusCode::UNAUTHORIZED => Ok(ApiOutcome::Unauthorized),
            status => {
                let body = response.text().await.unwrap_or_default();
                Ok(ApiOutcome::Failed {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

/// 令牌已带认证方案前缀时原样发送
fn authorization_value(token: &str) -> String {
    if token.starts_with("Bearer ") || token.starts_with("Token ") {
        token.to_string()
    } else {
        format!("Bearer {}", token)
    }
}

impl<T> ApiOutcome<T> {
    /// 非 200 响应转换为错误
    pub fn into_result(self) -> Result<T> {
        match self {
            ApiOutcome::Ok(value) => Ok(value),
            ApiOutcome::Unauthorized => Err(UiConfigError::Unauthorized(
                "session rejected by server".to_string(),
            )),
            ApiOutcome::Failed { status, body } => Err(UiConfigError::Rejected {
                status,
                message: body,
            }),
        }
    }
}
