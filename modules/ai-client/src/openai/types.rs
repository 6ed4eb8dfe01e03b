use serde::{Deserialize, Serialize};

// =============================================================================
// Messages
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    User,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl WireMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Message as returned in a choice. Only `content` and `function_call` are
/// read, and either may be missing; `role` and other fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ReplyMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub function_call: Option<FunctionCallWire>,
}

/// Function call emitted by the model. `arguments` is a JSON-encoded string.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct FunctionCallWire {
    #[serde(default)]
    pub arguments: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct FunctionDefinitionWire {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

// =============================================================================
// Chat Request
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionDefinitionWire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            functions: Vec::new(),
            function_call: None,
            max_tokens: None,
        }
    }

    pub fn message(mut self, message: WireMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn function(mut self, function: FunctionDefinitionWire) -> Self {
        self.functions.push(function);
        self
    }

    pub fn function_call(mut self, directive: serde_json::Value) -> Self {
        self.function_call = Some(directive);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

// =============================================================================
// Chat Response
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Choice {
    #[serde(default)]
    pub message: ReplyMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_unset_fields() {
        let request = ChatRequest::new("gpt-4o-mini").message(WireMessage::user("hi"));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["messages"][0]["role"], "user");
        assert!(json.get("functions").is_none());
        assert!(json.get("function_call").is_none());
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn response_tolerates_missing_choices() {
        let response: ChatResponse = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert!(response.choices.is_empty());
    }

    #[test]
    fn response_reads_function_call_arguments() {
        let response: ChatResponse = serde_json::from_str(
            r#"{
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "function_call": {"name": "f", "arguments": "{\"a\":1}"}
                    },
                    "finish_reason": "function_call"
                }]
            }"#,
        )
        .unwrap();

        let call = response.choices[0].message.function_call.as_ref().unwrap();
        assert_eq!(call.arguments.as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn reply_without_role_or_content_still_decodes() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"function_call": {"arguments": "{}"}}}]}"#,
        )
        .unwrap();

        let message = &response.choices[0].message;
        assert!(message.content.is_none());
        assert_eq!(
            message.function_call.as_ref().and_then(|c| c.arguments.as_deref()),
            Some("{}")
        );
    }

    #[test]
    fn partial_usage_is_accepted() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices": [], "usage": {"prompt_tokens": 12}}"#).unwrap();

        let usage = response.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 12);
        assert_eq!(usage.completion_tokens, 0);
    }
}
