//! Language-model client
//!
//! Defines the `LanguageModel` seam the orchestrator talks through and
//! the Gemini HTTP implementation of it. The model's reply is either
//! plain text or a tool-invocation request; both are surfaced through
//! `ModelReply` and nothing else leaks out of this module.

use crate::tool_contract::FunctionDeclaration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Language-model errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// One exchange unit in conversation history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TurnContent {
    /// Plain conversational text
    Text(String),

    /// The model asked us to invoke a tool
    ToolCall { name: String, args: Value },

    /// The result we fed back after executing a tool
    ToolResult { name: String, response: Value },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn tool_call(name: impl Into<String>, args: Value) -> Self {
        Self {
            role: Role::Model,
            content: TurnContent::ToolCall {
                name: name.into(),
                args,
            },
        }
    }

    /// Tool results travel back to the model as a user turn
    pub fn tool_result(name: impl Into<String>, response: Value) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::ToolResult {
                name: name.into(),
                response,
            },
        }
    }
}

/// A tool-invocation request extracted from a model response
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub name: String,
    pub args: Value,
}

/// What the model answered: free text, a tool call, or both
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    pub text: Option<String>,
    pub tool_call: Option<ToolCallRequest>,
}

/// The seam between the orchestrator and any language-model service
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        tools: &[FunctionDeclaration],
        history: &[Turn],
    ) -> Result<ModelReply, LlmError>;
}

// Wire types for the Generative Language API

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a> {
    contents: Vec<WireContent>,
    tools: Vec<WireToolGroup<'a>>,
    system_instruction: WireSystemInstruction<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireToolGroup<'a> {
    function_declarations: &'a [FunctionDeclaration],
}

#[derive(Debug, Serialize)]
struct WireSystemInstruction<'a> {
    parts: Vec<WireTextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct WireTextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<WireFunctionCall>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<WireFunctionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    content: Option<WireContent>,
}

/// Gemini implementation of `LanguageModel`.
///
/// Construction never fails: a missing API key is reported per call so
/// the conversational surface can degrade instead of crashing.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Build a client from the `GEMINI_API_KEY` environment variable
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            warn!("GEMINI_API_KEY not set; chat requests will fail gracefully");
        }
        Self::new(api_key)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn to_wire_content(turn: &Turn) -> WireContent {
        let role = match turn.role {
            Role::User => "user",
            Role::Model => "model",
        };

        let part = match &turn.content {
            TurnContent::Text(text) => WirePart {
                text: Some(text.clone()),
                ..Default::default()
            },
            TurnContent::ToolCall { name, args } => WirePart {
                function_call: Some(WireFunctionCall {
                    name: name.clone(),
                    args: args.clone(),
                }),
                ..Default::default()
            },
            TurnContent::ToolResult { name, response } => WirePart {
                function_response: Some(WireFunctionResponse {
                    name: name.clone(),
                    response: response.clone(),
                }),
                ..Default::default()
            },
        };

        WireContent {
            role: role.to_string(),
            parts: vec![part],
        }
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(
        &self,
        system_prompt: &str,
        tools: &[FunctionDeclaration],
        history: &[Turn],
    ) -> Result<ModelReply, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let request = WireRequest {
            contents: history.iter().map(Self::to_wire_content).collect(),
            tools: vec![WireToolGroup {
                function_declarations: tools,
            }],
            system_instruction: WireSystemInstruction {
                parts: vec![WireTextPart {
                    text: system_prompt,
                }],
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        debug!("Sending {} turns to {}", history.len(), self.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = wire
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .ok_or_else(|| LlmError::InvalidResponse("no candidates returned".to_string()))?;

        let mut reply = ModelReply::default();
        for part in content.parts {
            if reply.tool_call.is_none() {
                if let Some(call) = part.function_call {
                    reply.tool_call = Some(ToolCallRequest {
                        name: call.name,
                        args: call.args,
                    });
                    continue;
                }
            }
            if reply.text.is_none() {
                if let Some(text) = part.text {
                    reply.text = Some(text);
                }
            }
        }

        Ok(reply)
    }
}
