//! LLM 模块
//! LLM Module
//!
//! 提供模型调用抽象：消息类型、Provider trait、重试执行器、
//! 结构化输出解码边界，以及 OpenAI 兼容实现
//! Model-invocation abstraction: message types, the provider trait, the
//! retry executor, the structured-output decode boundary, and the
//! OpenAI-compatible implementation.
//!
//! # 架构
//! # Architecture
//!
//! ```text
//! pipeline stage ──▶ RetryExecutor ──▶ LLMProvider (trait)
//!                        │                  └─ OpenAIProvider / mocks
//!                        └─ structured::decode (repair → parse → shape)
//! ```
//!
//! The pipelines never construct a vendor client themselves: a provider
//! handle is injected through the run context, and every call goes
//! through a [`RetryExecutor`] configured with the call site's
//! [`RetryPolicy`].

pub mod mock;
pub mod openai;
pub mod provider;
pub mod retry;
pub mod structured;
pub mod types;

pub use mock::ScriptedProvider;
pub use openai::{OpenAIConfig, OpenAIProvider};
pub use provider::{LLMConfig, LLMProvider};
pub use retry::RetryExecutor;
pub use structured::{DecodeError, decode, repair_json};
pub use types::*;
