//! LLM 核心类型定义
//! Core LLM type definitions
//!
//! 定义与模型交互所需的消息、请求/响应与重试类型
//! Messages, request/response and retry types for model interaction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wikismith_kernel::PipelineError;

// ============================================================================
// 消息类型
// Message Types
// ============================================================================

/// 消息角色
/// Message Role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 系统消息（设置模型行为）
    /// System message (configures model behavior)
    System,
    /// 用户消息
    /// User message
    #[default]
    User,
    /// 助手（模型）响应
    /// Assistant (model) response
    Assistant,
    /// 工具调用结果
    /// Tool call result
    Tool,
}

/// 聊天消息
/// Chat message
///
/// `name` 标记说话者（编辑角色名或专家名），同一个 Assistant 角色可由
/// 多位说话者产生；采访转写依赖这个标签做视角交换。
/// `name` tags the speaker (an editor persona or the expert). Several
/// speakers share the Assistant role; the interview transcript relies on
/// this tag for the role-swap view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// 消息角色
    /// Message role
    pub role: Role,
    /// 消息内容
    /// Message content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// 说话者名称
    /// Speaker name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 工具调用列表（仅 assistant 角色）
    /// List of tool calls (assistant role only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// 工具调用 ID（仅 tool 角色）
    /// Tool call ID (tool role only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    /// 创建系统消息
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(content.into()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// 创建用户消息
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// 创建助手消息
    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(content.into()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// 创建带说话者名称的助手消息
    /// Create an assistant message tagged with a speaker name
    pub fn assistant_named(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::assistant(content)
        }
    }

    /// 创建带工具调用的助手消息
    /// Create an assistant message with tool calls
    pub fn assistant_with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            name: None,
            tool_calls: Some(tool_calls),
            tool_call_id: None,
        }
    }

    /// 创建工具结果消息
    /// Create a tool result message
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            name: None,
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    /// 设置说话者名称
    /// Set the speaker name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 文本内容
    /// Text content
    pub fn text_content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// 是否由指定说话者产生
    /// Whether this message was produced by the given speaker
    pub fn is_from(&self, speaker: &str) -> bool {
        self.name.as_deref() == Some(speaker)
    }
}

// ============================================================================
// 工具类型
// Tool Types
// ============================================================================

/// 函数调用内容
/// Function call payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// 函数名
    /// Function name
    pub name: String,
    /// JSON 编码的参数
    /// JSON-encoded arguments
    pub arguments: String,
}

/// 模型发出的工具调用
/// A tool call emitted by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// 调用 ID
    /// Call ID
    pub id: String,
    /// 调用类型（目前仅 "function"）
    /// Call type (currently only "function")
    #[serde(rename = "type")]
    pub call_type: String,
    /// 函数调用内容
    /// Function call payload
    pub function: FunctionCall,
}

/// 函数描述
/// Function description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// 函数名
    /// Function name
    pub name: String,
    /// 函数描述
    /// Function description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 参数 JSON Schema
    /// Parameters JSON Schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

/// 提供给模型的工具定义
/// A tool definition offered to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// 工具类型
    /// Tool type
    #[serde(rename = "type")]
    pub tool_type: String,
    /// 函数描述
    /// Function description
    pub function: FunctionSpec,
}

impl Tool {
    /// 创建函数工具
    /// Create a function tool
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionSpec {
                name: name.into(),
                description: Some(description.into()),
                parameters: Some(parameters),
            },
        }
    }
}

// ============================================================================
// 请求 / 响应
// Request / Response
// ============================================================================

/// 响应格式
/// Response format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// 自由文本
    /// Free text
    #[default]
    Text,
    /// 严格 JSON 对象
    /// Strict JSON object
    JsonObject,
}

/// Chat Completion 请求
/// Chat Completion request
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatCompletionRequest {
    /// 模型（空则使用 provider 默认模型）
    /// Model (provider default when empty)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// 消息列表
    /// Message list
    pub messages: Vec<ChatMessage>,
    /// 采样温度
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// 最大输出 token 数
    /// Max output tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// 响应格式
    /// Response format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    /// 工具定义
    /// Tool definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
}

impl ChatCompletionRequest {
    /// 创建空请求
    /// Create an empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置模型
    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// 追加系统消息
    /// Append a system message
    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::system(content));
        self
    }

    /// 追加用户消息
    /// Append a user message
    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::user(content));
        self
    }

    /// 追加任意消息
    /// Append any message
    pub fn message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// 追加多条消息
    /// Append several messages
    pub fn extend(mut self, messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// 设置温度
    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// 设置最大输出 token 数
    /// Set max output tokens
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// 要求严格 JSON 输出
    /// Require strict JSON output
    pub fn json_object(mut self) -> Self {
        self.response_format = Some(ResponseFormat::JsonObject);
        self
    }

    /// 设置工具定义
    /// Set tool definitions
    pub fn tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// 是否要求 JSON 输出
    /// Whether strict JSON output is requested
    pub fn is_json_mode(&self) -> bool {
        self.response_format == Some(ResponseFormat::JsonObject)
    }
}

/// Token 用量
/// Token usage
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Chat Completion 响应
/// Chat Completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    /// 产生响应的模型
    /// Model that produced the response
    pub model: String,
    /// 响应消息
    /// Response message
    pub message: ChatMessage,
    /// Token 用量
    /// Token usage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
    /// 响应文本内容
    /// Response text content
    pub fn content(&self) -> Option<&str> {
        self.message.text_content()
    }

    /// 响应中的工具调用
    /// Tool calls in the response
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.message.tool_calls.as_deref().unwrap_or(&[])
    }
}

// ============================================================================
// Embedding
// ============================================================================

/// Embedding 请求
/// Embedding request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// 模型
    /// Model
    pub model: String,
    /// 输入文本
    /// Input texts
    pub input: Vec<String>,
}

/// Embedding 响应
/// Embedding response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    /// 模型
    /// Model
    pub model: String,
    /// 每个输入对应一个向量
    /// One vector per input
    pub embeddings: Vec<Vec<f32>>,
}

// ============================================================================
// 错误类型
// Error Types
// ============================================================================

/// LLM 错误
/// LLM error
#[derive(Debug, Clone, thiserror::Error)]
pub enum LLMError {
    /// API 错误
    /// API error
    #[error("API error: {message} (code: {code:?})")]
    ApiError {
        code: Option<String>,
        message: String,
    },
    /// 认证错误
    /// Authentication error
    #[error("Authentication failed: {0}")]
    AuthError(String),
    /// 速率限制
    /// Rate limit exceeded
    #[error("Rate limited: {0}")]
    RateLimited(String),
    /// 配额超限
    /// Quota exceeded
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),
    /// 模型不存在
    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),
    /// 上下文长度超限
    /// Context length exceeded
    #[error("Context length exceeded: {0}")]
    ContextLengthExceeded(String),
    /// 内容过滤
    /// Content filtered
    #[error("Content filtered: {0}")]
    ContentFiltered(String),
    /// 网络错误
    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),
    /// 超时
    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
    /// 序列化 / 结构化输出错误
    /// Serialization / structured-output error
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// 模型调用了未提供的工具
    /// The model called a tool that was not offered
    #[error("Invalid tool call: {0}")]
    InvalidToolCall(String),
    /// 配置错误
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// 提供商不支持
    /// Provider not supported
    #[error("Provider not supported: {0}")]
    ProviderNotSupported(String),
    /// 其他错误
    /// Other error
    #[error("LLM error: {0}")]
    Other(String),
}

/// LLM 结果类型
/// LLM result type
pub type LLMResult<T> = Result<T, LLMError>;

impl From<LLMError> for PipelineError {
    fn from(err: LLMError) -> Self {
        PipelineError::Llm(err.to_string())
    }
}

// ============================================================================
// Retry Policy and Strategy
// ============================================================================

/// Retry strategy for LLM calls
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RetryStrategy {
    /// Fail immediately without retry
    NoRetry,
    /// Simple retry without prompt modification
    #[default]
    DirectRetry,
    /// Append error context to the system prompt (best for JSON errors)
    PromptRetry,
}

/// Backoff strategy for retry delays
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed { delay_ms: u64 },
    /// Exponential backoff
    Exponential {
        initial_delay_ms: u64,
        max_delay_ms: u64,
    },
    /// Exponential backoff with jitter
    ExponentialWithJitter {
        initial_delay_ms: u64,
        max_delay_ms: u64,
        jitter_ms: u64,
    },
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::Fixed { delay_ms: 3_000 }
    }
}

impl BackoffStrategy {
    /// Calculate delay duration for a given attempt (0-indexed)
    pub fn delay(&self, attempt: u32) -> std::time::Duration {
        match self {
            Self::Fixed { delay_ms } => std::time::Duration::from_millis(*delay_ms),
            Self::Exponential {
                initial_delay_ms,
                max_delay_ms,
            } => {
                let delay = *initial_delay_ms * 2u64.pow(attempt.min(10));
                std::time::Duration::from_millis(delay.min(*max_delay_ms))
            }
            Self::ExponentialWithJitter {
                initial_delay_ms,
                max_delay_ms,
                jitter_ms,
            } => {
                let base_delay = *initial_delay_ms * 2u64.pow(attempt.min(10));
                let capped = base_delay.min(*max_delay_ms);
                let jitter = if *jitter_ms > 0 {
                    use rand::Rng;
                    let mut rng = rand::thread_rng();
                    rng.gen_range(0..*jitter_ms) as i64 - (*jitter_ms as i64 / 2)
                } else {
                    0
                };
                let final_delay = (capped as i64 + jitter).max(0) as u64;
                std::time::Duration::from_millis(final_delay)
            }
        }
    }
}

/// Error types that may trigger retry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RetryableErrorType {
    /// Network-related errors (including timeouts)
    Network,
    /// Rate limit errors
    RateLimit,
    /// Serialization errors (including JSON / shape failures)
    Serialization,
    /// Tool-call validation failures
    ToolCall,
    /// Authentication errors
    Authentication,
    /// Server errors (5xx)
    ServerError,
}

impl RetryableErrorType {
    /// Classify an error; `None` means the error is never retried.
    pub fn from_error(error: &LLMError) -> Option<Self> {
        match error {
            LLMError::NetworkError(_) => Some(Self::Network),
            LLMError::Timeout(_) => Some(Self::Network),
            LLMError::RateLimited(_) => Some(Self::RateLimit),
            LLMError::SerializationError(_) => Some(Self::Serialization),
            LLMError::InvalidToolCall(_) => Some(Self::ToolCall),
            LLMError::AuthError(_) => Some(Self::Authentication),
            LLMError::ApiError { code, .. } => {
                if let Some(c) = code {
                    if c.starts_with('5') {
                        return Some(Self::ServerError);
                    }
                }
                None
            }
            LLMError::QuotaExceeded(_)
            | LLMError::ModelNotFound(_)
            | LLMError::ContextLengthExceeded(_)
            | LLMError::ContentFiltered(_)
            | LLMError::ConfigError(_)
            | LLMError::ProviderNotSupported(_)
            | LLMError::Other(_) => None,
        }
    }
}

/// Retry policy for LLM calls, configured per call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first attempt)
    pub max_attempts: u32,
    /// Backoff strategy for delays
    pub backoff: BackoffStrategy,
    /// Default retry strategy
    pub default_strategy: RetryStrategy,
    /// Per-error-type strategies
    pub error_strategies: HashMap<RetryableErrorType, RetryStrategy>,
    /// Error types that should trigger retry
    pub retry_on: Vec<RetryableErrorType>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: BackoffStrategy::default(),
            default_strategy: RetryStrategy::DirectRetry,
            error_strategies: Self::default_strategies(),
            retry_on: vec![
                RetryableErrorType::Network,
                RetryableErrorType::RateLimit,
                RetryableErrorType::Serialization,
                RetryableErrorType::ToolCall,
                RetryableErrorType::ServerError,
            ],
        }
    }
}

impl RetryPolicy {
    fn default_strategies() -> HashMap<RetryableErrorType, RetryStrategy> {
        let mut map = HashMap::new();
        // PromptRetry is best for structured-output failures: the model
        // sees what was wrong with its previous attempt.
        map.insert(
            RetryableErrorType::Serialization,
            RetryStrategy::PromptRetry,
        );
        map.insert(RetryableErrorType::ToolCall, RetryStrategy::PromptRetry);
        map.insert(RetryableErrorType::Network, RetryStrategy::DirectRetry);
        map.insert(RetryableErrorType::RateLimit, RetryStrategy::DirectRetry);
        map.insert(RetryableErrorType::ServerError, RetryStrategy::DirectRetry);
        map.insert(RetryableErrorType::Authentication, RetryStrategy::NoRetry);
        map
    }

    /// Policy with a fixed sleep between attempts.
    pub fn fixed(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: BackoffStrategy::Fixed { delay_ms },
            ..Default::default()
        }
    }

    /// Policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            backoff: BackoffStrategy::Fixed { delay_ms: 0 },
            default_strategy: RetryStrategy::NoRetry,
            error_strategies: Self::default_strategies(),
            retry_on: vec![],
        }
    }

    /// Set the backoff strategy.
    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// The retry strategy for a specific error.
    pub fn strategy_for_error(&self, error: &LLMError) -> RetryStrategy {
        RetryableErrorType::from_error(error)
            .and_then(|error_type| self.error_strategies.get(&error_type).cloned())
            .unwrap_or_else(|| self.default_strategy.clone())
    }

    /// Whether an error should trigger retry.
    pub fn should_retry_error(&self, error: &LLMError) -> bool {
        if let Some(error_type) = RetryableErrorType::from_error(error) {
            self.retry_on.contains(&error_type)
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let msg = ChatMessage::assistant_named("yuki_tanaka", "What about borrowing?");
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.is_from("yuki_tanaka"));
        assert!(!msg.is_from("subject_matter_expert"));

        let tool = ChatMessage::tool_result("call-1", "{}");
        assert_eq!(tool.role, Role::Tool);
        assert_eq!(tool.tool_call_id.as_deref(), Some("call-1"));
    }

    #[test]
    fn test_request_builder() {
        let request = ChatCompletionRequest::new()
            .system("You are a writer.")
            .user("Write an outline.")
            .temperature(0.0)
            .json_object();

        assert_eq!(request.messages.len(), 2);
        assert!(request.is_json_mode());
        assert_eq!(request.temperature, Some(0.0));
    }

    #[test]
    fn test_backoff_fixed() {
        let strategy = BackoffStrategy::Fixed { delay_ms: 20_000 };
        assert_eq!(strategy.delay(0).as_millis(), 20_000);
        assert_eq!(strategy.delay(4).as_millis(), 20_000);
    }

    #[test]
    fn test_backoff_exponential_capping() {
        let strategy = BackoffStrategy::Exponential {
            initial_delay_ms: 1000,
            max_delay_ms: 5000,
        };
        assert_eq!(strategy.delay(0).as_millis(), 1000);
        assert_eq!(strategy.delay(1).as_millis(), 2000);
        assert_eq!(strategy.delay(2).as_millis(), 4000);
        assert_eq!(strategy.delay(3).as_millis(), 5000);
        assert_eq!(strategy.delay(10).as_millis(), 5000);
    }

    #[test]
    fn test_backoff_jitter_range() {
        let strategy = BackoffStrategy::ExponentialWithJitter {
            initial_delay_ms: 1000,
            max_delay_ms: 10000,
            jitter_ms: 200,
        };
        let delay = strategy.delay(1).as_millis();
        assert!(
            (1800..=2200).contains(&delay),
            "delay {} out of range",
            delay
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert_eq!(
            RetryableErrorType::from_error(&LLMError::NetworkError("down".into())),
            Some(RetryableErrorType::Network)
        );
        assert_eq!(
            RetryableErrorType::from_error(&LLMError::InvalidToolCall("nope".into())),
            Some(RetryableErrorType::ToolCall)
        );
        assert_eq!(
            RetryableErrorType::from_error(&LLMError::QuotaExceeded("broke".into())),
            None
        );
        assert_eq!(
            RetryableErrorType::from_error(&LLMError::ApiError {
                code: Some("503".into()),
                message: "unavailable".into()
            }),
            Some(RetryableErrorType::ServerError)
        );
    }

    #[test]
    fn test_policy_fixed_constructor() {
        let policy = RetryPolicy::fixed(5, 20_000);
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.backoff.delay(2).as_millis(), 20_000);
        assert!(policy.should_retry_error(&LLMError::SerializationError("bad json".into())));
        assert_eq!(
            policy.strategy_for_error(&LLMError::SerializationError("bad json".into())),
            RetryStrategy::PromptRetry
        );
    }

    #[test]
    fn test_no_retry_policy() {
        let policy = RetryPolicy::no_retry();
        assert!(!policy.should_retry_error(&LLMError::NetworkError("down".into())));
    }

    #[test]
    fn test_llm_error_into_pipeline_error() {
        let err: PipelineError = LLMError::RateLimited("slow down".into()).into();
        assert!(matches!(err, PipelineError::Llm(_)));
    }
}
