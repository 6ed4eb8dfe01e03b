mod client;
pub(crate) mod schema;
pub(crate) mod types;

pub use schema::StructuredOutput;

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use client::{OpenAiClient, OPENAI_API_URL};
use types::{ChatRequest, FunctionDefinitionWire, WireMessage};

// =============================================================================
// Function calling
// =============================================================================

/// A function the model may call, with its JSON-schema parameters.
#[derive(Debug, Clone)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl FunctionSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }

    /// Derive the parameter schema from a Rust type.
    pub fn with_parameters_of<T: StructuredOutput>(mut self) -> Self {
        self.parameters = T::function_parameters();
        self
    }
}

/// How the model is told to choose between the function and free text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionCallMode {
    /// Name the function in `function_call`, so the model must call it.
    #[default]
    Force,
    /// `function_call: "auto"`; the model may answer in free text instead.
    Auto,
}

impl FunctionCallMode {
    fn directive(self, function_name: &str) -> serde_json::Value {
        match self {
            Self::Force => serde_json::json!({ "name": function_name }),
            Self::Auto => serde_json::json!("auto"),
        }
    }
}

/// What the first completion choice carried back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionCallReply {
    /// Raw JSON-encoded arguments of the function call, if the model made one.
    pub arguments: Option<String>,
    /// Free-text content, present when the model answered without calling.
    pub content: Option<String>,
    pub finish_reason: Option<String>,
}

// =============================================================================
// OpenAi
// =============================================================================

#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    model: String,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for OpenAi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAi")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Bound each request. Without one, a stalled upstream blocks the caller.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(OPENAI_API_URL)
    }

    fn client(&self) -> Result<OpenAiClient> {
        OpenAiClient::new(&self.api_key, self.base_url(), self.timeout)
    }

    /// Send one user message along with a single function declaration and
    /// return what the first choice carried back.
    pub async fn function_call(
        &self,
        prompt: &str,
        function: &FunctionSpec,
        mode: FunctionCallMode,
        max_tokens: u32,
    ) -> Result<FunctionCallReply> {
        let request = ChatRequest::new(&self.model)
            .message(WireMessage::user(prompt))
            .function(FunctionDefinitionWire {
                name: function.name.clone(),
                description: function.description.clone(),
                parameters: function.parameters.clone(),
            })
            .function_call(mode.directive(&function.name))
            .max_tokens(max_tokens);

        let response = self.client()?.chat(&request).await?;

        if let Some(usage) = &response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "OpenAI usage"
            );
        }

        let Some(choice) = response.choices.into_iter().next() else {
            return Ok(FunctionCallReply::default());
        };

        Ok(FunctionCallReply {
            arguments: choice.message.function_call.and_then(|call| call.arguments),
            content: choice.message.content,
            finish_reason: choice.finish_reason,
        })
    }
}
