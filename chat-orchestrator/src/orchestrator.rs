//! Conversation orchestrator
//!
//! Owns the turn history for one session, drives the model/tool
//! round-trip, and converts every failure at this boundary into a
//! user-visible reply. A conversational surface must always get an
//! answer, so nothing here propagates an error to the caller.

use crate::llm_client::{LanguageModel, LlmError, ToolCallRequest, Turn};
use crate::tool_contract::{
    search_perfumes_declaration, AssistantPolicy, FunctionDeclaration, SEARCH_PERFUMES,
};
use scent_catalog::{CatalogItem, Matcher, SearchParams};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

/// Fixed reply when the model call fails
pub const APOLOGY_TEXT: &str =
    "I apologize, but I encountered an issue processing your request. \
     Could you please try again?";

/// Fixed reply when credentials are missing
pub const MISSING_KEY_TEXT: &str =
    "I'm having trouble connecting to my knowledge base. \
     Please check that the API key is configured correctly.";

/// Fallback when the model returns a response with no usable text
pub const CLARIFY_TEXT: &str =
    "I'd be happy to help you find the perfect perfume! \
     Could you tell me more about what kind of scent you're looking for?";

/// One processed user message
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Natural-language text to show (and optionally speak)
    pub text: String,

    /// Full catalog records for rendering result cards
    pub items: Vec<CatalogItem>,

    pub tool_called: bool,

    /// Params the model derived, echoed back when a search ran
    pub search_params: Option<SearchParams>,

    /// Error tag when the reply is a fallback, `None` otherwise
    pub error: Option<String>,
}

impl ChatReply {
    fn text_only(text: String) -> Self {
        Self {
            text,
            items: Vec::new(),
            tool_called: false,
            search_params: None,
            error: None,
        }
    }
}

/// Trimmed item projection fed back to the model. The full record
/// would blow up the payload; the model only needs enough to talk
/// about the results.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemSummary<'a> {
    id: &'a str,
    name: &'a str,
    brand: &'a str,
    scent_type: &'a str,
    price: f64,
    description: &'a str,
}

impl<'a> From<&'a CatalogItem> for ItemSummary<'a> {
    fn from(item: &'a CatalogItem) -> Self {
        Self {
            id: &item.id,
            name: &item.name,
            brand: &item.brand,
            scent_type: &item.scent_type,
            price: item.price,
            description: &item.description,
        }
    }
}

/// Natural-language fallback when the model gives no summary text
pub fn fallback_result_summary(count: usize) -> String {
    if count == 0 {
        return "I couldn't find any perfumes matching your criteria. \
                Would you like to try a different search?"
            .to_string();
    }

    let noun = if count == 1 { "perfume" } else { "perfumes" };
    format!("I found {count} {noun} that match your preferences!")
}

/// One conversation session. Create one instance per active
/// conversation; the turn history is owned here and nowhere else.
pub struct Orchestrator {
    model: Box<dyn LanguageModel>,
    matcher: Matcher,
    policy: AssistantPolicy,
    tools: Vec<FunctionDeclaration>,
    history: Vec<Turn>,
}

impl Orchestrator {
    pub fn new(model: Box<dyn LanguageModel>, matcher: Matcher, policy: AssistantPolicy) -> Self {
        Self {
            model,
            matcher,
            policy,
            tools: vec![search_perfumes_declaration()],
            history: Vec::new(),
        }
    }

    /// Process one user message.
    ///
    /// Appends the user turn, asks the model, executes a
    /// `searchPerfumes` call when requested, and returns the reply.
    /// Callers must serialize invocations: one message in flight per
    /// session at a time.
    pub async fn process_message(&mut self, user_text: &str) -> ChatReply {
        self.history.push(Turn::user_text(user_text));

        let reply = match self
            .model
            .generate(&self.policy.system_prompt, &self.tools, &self.history)
            .await
        {
            Ok(reply) => reply,
            Err(e) => return self.failure_reply(e),
        };

        if let Some(call) = reply.tool_call {
            if call.name == SEARCH_PERFUMES {
                return self.run_search(call).await;
            }
            warn!("Model requested unknown tool: {}", call.name);
        }

        let text = reply
            .text
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| CLARIFY_TEXT.to_string());

        self.history.push(Turn::model_text(&text));
        ChatReply::text_only(text)
    }

    /// Execute the tool call, feed the trimmed results back, and get a
    /// grounded natural-language summary
    async fn run_search(&mut self, call: ToolCallRequest) -> ChatReply {
        let params = SearchParams::from_model_args(&call.args);
        self.history.push(Turn::tool_call(SEARCH_PERFUMES, call.args));

        let result = self.matcher.search(&params);
        info!("searchPerfumes matched {} items", result.count);

        let summaries: Vec<ItemSummary<'_>> = result.items.iter().map(ItemSummary::from).collect();
        self.history.push(Turn::tool_result(
            SEARCH_PERFUMES,
            json!({
                "count": result.count,
                "perfumes": summaries,
            }),
        ));

        let final_reply = match self
            .model
            .generate(&self.policy.system_prompt, &self.tools, &self.history)
            .await
        {
            Ok(reply) => reply,
            Err(e) => return self.failure_reply(e),
        };

        let text = final_reply
            .text
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| fallback_result_summary(result.count));

        self.history.push(Turn::model_text(&text));

        ChatReply {
            text,
            items: result.items,
            tool_called: true,
            search_params: Some(params),
            error: None,
        }
    }

    /// Convert a model failure into a fixed reply. The user turn (and
    /// any tool turns already appended) stay in history.
    fn failure_reply(&self, error: LlmError) -> ChatReply {
        warn!("Language-model call failed: {}", error);

        let (text, tag) = match error {
            LlmError::MissingApiKey => (MISSING_KEY_TEXT, "configuration".to_string()),
            other => (APOLOGY_TEXT, other.to_string()),
        };

        ChatReply {
            text: text.to_string(),
            items: Vec::new(),
            tool_called: false,
            search_params: None,
            error: Some(tag),
        }
    }

    /// Clear the session history
    pub fn reset(&mut self) {
        self.history.clear();
        info!("Conversation reset");
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }
}
