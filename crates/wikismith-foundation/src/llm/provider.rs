//! LLM Provider Trait
//!
//! 定义模型提供商接口，支持多种后端
//! Defines the model provider interface, supporting multiple backends.
//!
//! Pipelines receive a provider handle through their run context and call
//! it via the retry executor; they never construct vendor clients.

use super::types::*;
use async_trait::async_trait;

/// LLM 提供商 trait
/// LLM Provider trait
///
/// 所有模型后端（OpenAI 兼容服务、本地模型、测试桩）都实现此 trait
/// Every model backend (OpenAI-compatible services, local models, test
/// stubs) implements this trait.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// 获取提供商名称
    /// Get provider name
    fn name(&self) -> &str;

    /// 获取默认模型
    /// Get default model
    fn default_model(&self) -> &str {
        ""
    }

    /// 检查是否支持工具调用
    /// Check if tool calling is supported
    fn supports_tools(&self) -> bool {
        true
    }

    /// 检查是否支持 embedding
    /// Check if embedding is supported
    fn supports_embedding(&self) -> bool {
        false
    }

    /// 发送 Chat Completion 请求
    /// Send Chat Completion request
    async fn chat(&self, request: ChatCompletionRequest) -> LLMResult<ChatCompletionResponse>;

    /// 发送 Embedding 请求
    /// Send Embedding request
    async fn embedding(&self, _request: EmbeddingRequest) -> LLMResult<EmbeddingResponse> {
        Err(LLMError::ProviderNotSupported(format!(
            "Provider {} does not support embedding",
            self.name()
        )))
    }
}

/// LLM 配置
/// LLM Configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMConfig {
    /// 提供商名称
    /// Provider name
    pub provider: String,
    /// API Key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API 基础 URL
    /// API Base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// 默认模型
    /// Default model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    /// Embedding 模型
    /// Embedding model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    /// 默认温度
    /// Default temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_temperature: Option<f32>,
    /// 默认最大 token 数
    /// Default max tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u32>,
    /// 请求超时（秒）
    /// Request timeout (seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            api_key: None,
            base_url: None,
            default_model: None,
            embedding_model: None,
            default_temperature: Some(0.0),
            default_max_tokens: Some(4096),
            timeout_secs: Some(60),
        }
    }
}

impl LLMConfig {
    /// 创建兼容 OpenAI API 的配置
    /// Create an OpenAI-compatible API configuration
    pub fn openai_compatible(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider: "openai-compatible".to_string(),
            api_key: Some(api_key.into()),
            base_url: Some(base_url.into()),
            default_model: Some(model.into()),
            ..Default::default()
        }
    }

    /// 设置模型
    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    /// 设置 embedding 模型
    /// Set the embedding model
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    /// 设置温度
    /// Set the temperature
    pub fn temperature(mut self, temp: f32) -> Self {
        self.default_temperature = Some(temp);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_compatible_config() {
        let config = LLMConfig::openai_compatible(
            "http://localhost:11434/v1",
            "not-a-real-key",
            "llama3.1-70b",
        )
        .temperature(0.2);

        assert_eq!(config.provider, "openai-compatible");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:11434/v1"));
        assert_eq!(config.default_model.as_deref(), Some("llama3.1-70b"));
        assert_eq!(config.default_temperature, Some(0.2));
    }
}
