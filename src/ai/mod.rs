//! AI Integration Layer
//!
//! LLM-backed implementation of the pipeline's content-generation contract.

pub mod generator;
pub mod prompt;
pub mod provider;
pub mod timeout;
pub mod validation;

pub use generator::LlmContentGenerator;
pub use prompt::{PromptBuilder, StagePrompts, StageSchemas};
pub use provider::{
    LlmProvider, LlmResponse, OpenAiProvider, ProviderConfig, SharedProvider, TokenUsage,
    create_provider,
};
pub use timeout::with_timeout;
pub use validation::{extract_json_from_response, parse_response};
