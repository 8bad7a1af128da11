//! Gemini API 客户端
//!
//! 封装与内容服务的 HTTP 交互，不关心提示词和业务结构

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error};

use crate::clients::gemini_types::{GenerateContentRequest, GenerateContentResponse};
use crate::config::Config;
use crate::error::ProviderError;

/// Gemini 客户端
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    api_base_url: String,
    client: Client,
}

impl GeminiClient {
    /// 根据配置创建客户端
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|source| ProviderError::RequestFailed {
                endpoint: config.api_base_url.clone(),
                source,
            })?;

        Ok(Self {
            api_key: config.api_key.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// 使用自定义地址创建客户端（测试时指向本地模拟服务）
    pub fn with_base_url(api_key: impl Into<String>, api_base_url: impl Into<String>) -> Self {
        let api_base_url: String = api_base_url.into();
        Self {
            api_key: api_key.into(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// 调用 `models/{model}:generateContent`
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let endpoint = format!("models/{}:generateContent", model);
        let url = format!("{}/{}", self.api_base_url, endpoint);
        debug!("调用内容服务: {}", endpoint);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|source| {
                error!("内容服务请求失败 ({}): {}", endpoint, source);
                ProviderError::RequestFailed {
                    endpoint: endpoint.clone(),
                    source,
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("内容服务返回错误状态 ({}): {}", endpoint, status);
            return Err(ProviderError::BadResponse {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedPayload(format!("无法解析响应结构: {}", e)))?;

        if parsed.candidates.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        debug!("内容服务调用成功: {}", endpoint);
        Ok(parsed)
    }
}
