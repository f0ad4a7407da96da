//! OpenAI Provider Implementation
//!
//! 使用 `async-openai` crate 实现与 OpenAI 及兼容服务的交互
//! Uses the `async-openai` crate for OpenAI and compatible services.
//!
//! # 支持的服务
//! # Supported Services
//!
//! - OpenAI API (api.openai.com)
//! - 兼容 OpenAI API 的托管或本地服务 (vLLM, Ollama, LocalAI 等)
//! - OpenAI-compatible hosted or local services (vLLM, Ollama, LocalAI, etc.)

use super::provider::LLMProvider;
use super::types::*;
use async_openai::{
    Client,
    config::OpenAIConfig as AsyncOpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionToolArgs, ChatCompletionToolType, CreateChatCompletionRequestArgs,
        CreateEmbeddingRequestArgs, FunctionObjectArgs,
    },
};
use async_trait::async_trait;

/// OpenAI Provider 配置
/// OpenAI Provider Configuration
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API Key
    pub api_key: String,
    /// API 基础 URL
    /// API Base URL
    pub base_url: Option<String>,
    /// 默认模型
    /// Default Model
    pub default_model: String,
    /// Embedding 模型
    /// Embedding model
    pub embedding_model: String,
    /// 默认温度
    /// Default Temperature
    pub default_temperature: f32,
    /// 默认最大 token 数
    /// Default Max Tokens
    pub default_max_tokens: u32,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            default_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            default_temperature: 0.0,
            default_max_tokens: 4096,
        }
    }
}

impl OpenAIConfig {
    /// 创建新配置
    /// Create new configuration
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// 从环境变量创建配置
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("OPENAI_BASE_URL").ok(),
            ..Default::default()
        };
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            config.default_model = model;
        }
        config
    }

    /// 设置 base URL
    /// Set base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// 设置默认模型
    /// Set default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// 设置 embedding 模型
    /// Set embedding model
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// 设置默认温度
    /// Set default temperature
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.default_temperature = temp;
        self
    }
}

/// OpenAI 兼容 Provider
/// OpenAI-compatible Provider
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client<AsyncOpenAIConfig>,
}

impl OpenAIProvider {
    /// 创建 Provider
    /// Create Provider
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new(api_key))
    }

    /// 使用配置创建 Provider
    /// Create Provider with configuration
    pub fn with_config(config: OpenAIConfig) -> Self {
        let mut openai_config = AsyncOpenAIConfig::new().with_api_key(&config.api_key);
        if let Some(ref base_url) = config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }
        let client = Client::with_config(openai_config);
        Self { config, client }
    }

    /// 从通用 LLM 配置创建 Provider
    /// Create Provider from a generic LLM configuration
    pub fn from_llm_config(llm: &super::provider::LLMConfig) -> Self {
        let mut config = OpenAIConfig::new(llm.api_key.clone().unwrap_or_default());
        config.base_url = llm.base_url.clone();
        if let Some(ref model) = llm.default_model {
            config.default_model = model.clone();
        }
        if let Some(ref model) = llm.embedding_model {
            config.embedding_model = model.clone();
        }
        if let Some(temp) = llm.default_temperature {
            config.default_temperature = temp;
        }
        if let Some(max_tokens) = llm.default_max_tokens {
            config.default_max_tokens = max_tokens;
        }
        Self::with_config(config)
    }

    /// 获取配置
    /// Get configuration
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// 转换消息格式
    /// Convert message format
    fn convert_messages(
        messages: &[ChatMessage],
    ) -> Result<Vec<ChatCompletionRequestMessage>, LLMError> {
        messages.iter().map(Self::convert_message).collect()
    }

    /// 转换单个消息
    /// Convert a single message
    fn convert_message(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage, LLMError> {
        let content = msg.text_content().unwrap_or_default().to_string();

        match msg.role {
            Role::System => {
                let mut builder = ChatCompletionRequestSystemMessageArgs::default();
                builder.content(content);
                if let Some(ref name) = msg.name {
                    builder.name(name);
                }
                Ok(builder
                    .build()
                    .map_err(|e| LLMError::Other(e.to_string()))?
                    .into())
            }
            Role::User => {
                let mut builder = ChatCompletionRequestUserMessageArgs::default();
                builder.content(ChatCompletionRequestUserMessageContent::Text(content));
                if let Some(ref name) = msg.name {
                    builder.name(name);
                }
                Ok(builder
                    .build()
                    .map_err(|e| LLMError::Other(e.to_string()))?
                    .into())
            }
            Role::Assistant => {
                let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
                if !content.is_empty() {
                    builder.content(content);
                }
                if let Some(ref name) = msg.name {
                    builder.name(name);
                }
                if let Some(ref tool_calls) = msg.tool_calls {
                    let converted: Vec<_> = tool_calls
                        .iter()
                        .map(|tc| async_openai::types::ChatCompletionMessageToolCall {
                            id: tc.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: async_openai::types::FunctionCall {
                                name: tc.function.name.clone(),
                                arguments: tc.function.arguments.clone(),
                            },
                        })
                        .collect();
                    builder.tool_calls(converted);
                }
                Ok(builder
                    .build()
                    .map_err(|e| LLMError::Other(e.to_string()))?
                    .into())
            }
            Role::Tool => {
                let tool_call_id = msg
                    .tool_call_id
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string());
                Ok(ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(tool_call_id)
                    .content(content)
                    .build()
                    .map_err(|e| LLMError::Other(e.to_string()))?
                    .into())
            }
        }
    }

    /// 转换工具定义
    /// Convert tool definitions
    fn convert_tools(
        tools: &[Tool],
    ) -> Result<Vec<async_openai::types::ChatCompletionTool>, LLMError> {
        tools
            .iter()
            .map(|tool| {
                let function = FunctionObjectArgs::default()
                    .name(&tool.function.name)
                    .description(tool.function.description.clone().unwrap_or_default())
                    .parameters(
                        tool.function
                            .parameters
                            .clone()
                            .unwrap_or(serde_json::json!({})),
                    )
                    .build()
                    .map_err(|e| LLMError::Other(e.to_string()))?;

                ChatCompletionToolArgs::default()
                    .r#type(ChatCompletionToolType::Function)
                    .function(function)
                    .build()
                    .map_err(|e| LLMError::Other(e.to_string()))
            })
            .collect()
    }

    /// 转换响应
    /// Convert response
    fn convert_response(
        response: async_openai::types::CreateChatCompletionResponse,
    ) -> LLMResult<ChatCompletionResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::Other("response contained no choices".to_string()))?;

        let tool_calls = choice.message.tool_calls.map(|calls| {
            calls
                .into_iter()
                .map(|tc| ToolCall {
                    id: tc.id,
                    call_type: "function".to_string(),
                    function: FunctionCall {
                        name: tc.function.name,
                        arguments: tc.function.arguments,
                    },
                })
                .collect()
        });

        let message = ChatMessage {
            role: Role::Assistant,
            content: choice.message.content,
            name: None,
            tool_calls,
            tool_call_id: None,
        };

        let usage = response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ChatCompletionResponse {
            model: response.model,
            message,
            usage,
        })
    }

    /// 错误分类
    /// Error classification
    fn convert_error(err: async_openai::error::OpenAIError) -> LLMError {
        match err {
            async_openai::error::OpenAIError::ApiError(api_err) => {
                let code = api_err.code.clone().map(|c| c.to_string());
                let message = api_err.message.clone();

                if message.contains("rate limit") {
                    LLMError::RateLimited(message)
                } else if message.contains("quota") || message.contains("billing") {
                    LLMError::QuotaExceeded(message)
                } else if message.contains("model") && message.contains("not found") {
                    LLMError::ModelNotFound(message)
                } else if message.contains("context") || message.contains("tokens") {
                    LLMError::ContextLengthExceeded(message)
                } else if message.contains("content") && message.contains("filter") {
                    LLMError::ContentFiltered(message)
                } else {
                    LLMError::ApiError { code, message }
                }
            }
            async_openai::error::OpenAIError::Reqwest(e) => {
                if e.is_timeout() {
                    LLMError::Timeout(e.to_string())
                } else {
                    LLMError::NetworkError(e.to_string())
                }
            }
            async_openai::error::OpenAIError::InvalidArgument(msg) => LLMError::ConfigError(msg),
            _ => LLMError::Other(err.to_string()),
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    fn supports_tools(&self) -> bool {
        true
    }

    fn supports_embedding(&self) -> bool {
        true
    }

    async fn chat(&self, request: ChatCompletionRequest) -> LLMResult<ChatCompletionResponse> {
        let messages = Self::convert_messages(&request.messages)?;

        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model.clone());

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&model).messages(messages);

        builder.temperature(
            request
                .temperature
                .unwrap_or(self.config.default_temperature),
        );
        builder.max_tokens(request.max_tokens.unwrap_or(self.config.default_max_tokens));

        if let Some(ref tools) = request.tools {
            if !tools.is_empty() {
                builder.tools(Self::convert_tools(tools)?);
            }
        }

        if request.is_json_mode() {
            builder.response_format(async_openai::types::ResponseFormat::JsonObject);
        }

        let openai_request = builder
            .build()
            .map_err(|e| LLMError::ConfigError(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(openai_request)
            .await
            .map_err(Self::convert_error)?;

        Self::convert_response(response)
    }

    async fn embedding(&self, request: EmbeddingRequest) -> LLMResult<EmbeddingResponse> {
        let model = if request.model.is_empty() {
            self.config.embedding_model.clone()
        } else {
            request.model
        };

        let openai_request = CreateEmbeddingRequestArgs::default()
            .model(&model)
            .input(request.input)
            .build()
            .map_err(|e| LLMError::ConfigError(e.to_string()))?;

        let response = self
            .client
            .embeddings()
            .create(openai_request)
            .await
            .map_err(Self::convert_error)?;

        let embeddings = response.data.into_iter().map(|d| d.embedding).collect();

        Ok(EmbeddingResponse {
            model: response.model,
            embeddings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = OpenAIConfig::new("sk-test")
            .with_base_url("http://localhost:8000/v1")
            .with_model("llama3.1-70b")
            .with_temperature(0.3);

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8000/v1"));
        assert_eq!(config.default_model, "llama3.1-70b");
        assert_eq!(config.default_temperature, 0.3);
    }

    #[test]
    fn test_convert_named_assistant_message() {
        let msg = ChatMessage::assistant_named("yuki_tanaka", "So you said?");
        let converted = OpenAIProvider::convert_message(&msg).unwrap();
        assert!(matches!(
            converted,
            ChatCompletionRequestMessage::Assistant(_)
        ));
    }

    #[test]
    fn test_convert_tool_result_message() {
        let msg = ChatMessage::tool_result("call-9", r#"{"https://a": "text"}"#);
        let converted = OpenAIProvider::convert_message(&msg).unwrap();
        assert!(matches!(converted, ChatCompletionRequestMessage::Tool(_)));
    }

    #[test]
    fn test_from_llm_config() {
        let llm = super::super::provider::LLMConfig::openai_compatible(
            "http://localhost:11434/v1",
            "key",
            "qwen2.5",
        );
        let provider = OpenAIProvider::from_llm_config(&llm);
        assert_eq!(provider.default_model(), "qwen2.5");
        assert_eq!(
            provider.config().base_url.as_deref(),
            Some("http://localhost:11434/v1")
        );
    }
}
