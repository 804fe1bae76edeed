/// Chat orchestrator library
///
/// Provides the tool contract advertised to the language model, the
/// Gemini client, and the conversation orchestrator that ties model,
/// tool and catalog together.

pub mod llm_client;
pub mod orchestrator;
pub mod speech;
pub mod tool_contract;

// Re-export main types
pub use llm_client::{
    GeminiClient, LanguageModel, LlmError, ModelReply, Role, ToolCallRequest, Turn, TurnContent,
    DEFAULT_MODEL,
};
pub use orchestrator::{
    fallback_result_summary, ChatReply, Orchestrator, APOLOGY_TEXT, CLARIFY_TEXT,
    MISSING_KEY_TEXT,
};
pub use speech::text_for_speech;
pub use tool_contract::{
    search_perfumes_declaration, AssistantPolicy, FunctionDeclaration, ParameterSchema,
    SEARCH_PERFUMES,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
