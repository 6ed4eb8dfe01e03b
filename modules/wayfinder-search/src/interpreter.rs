use std::sync::Arc;
use std::time::Duration;

use ai_client::{truncate_to_char_boundary, FunctionCallMode, FunctionSpec, OpenAi};
use async_trait::async_trait;
use tracing::{debug, info};
use wayfinder_core::file_config::InterpreterConfig;
use wayfinder_core::{AppConfig, FileConfig, KeywordRegistry, PromptRegistry};

use crate::error::SearchError;
use crate::params::{ExtractedParameters, ReplyArguments, SearchParametersArgs};

/// Turns a raw search term into structured parameters.
///
/// Keywords come back unfiltered; allow-list validation is a separate step.
#[async_trait]
pub trait QueryInterpreter: Send + Sync {
    async fn interpret(&self, search_term: &str) -> Result<ExtractedParameters, SearchError>;
}

#[derive(Debug, Clone)]
pub struct InterpreterSettings {
    pub function_name: String,
    pub function_call: FunctionCallMode,
    pub max_tokens: u32,
    pub default_limit: u32,
}

impl Default for InterpreterSettings {
    fn default() -> Self {
        Self::from(&InterpreterConfig::default())
    }
}

impl From<&InterpreterConfig> for InterpreterSettings {
    fn from(config: &InterpreterConfig) -> Self {
        Self {
            function_name: config.function_name.clone(),
            function_call: config.function_call,
            max_tokens: config.max_tokens,
            default_limit: config.default_limit,
        }
    }
}

/// [`QueryInterpreter`] backed by an OpenAI-compatible function call.
pub struct FunctionCallInterpreter {
    ai: OpenAi,
    registry: Arc<KeywordRegistry>,
    prompts: Arc<PromptRegistry>,
    settings: InterpreterSettings,
    function: FunctionSpec,
}

impl FunctionCallInterpreter {
    pub fn new(
        ai: OpenAi,
        registry: Arc<KeywordRegistry>,
        prompts: Arc<PromptRegistry>,
        settings: InterpreterSettings,
    ) -> Self {
        let function = FunctionSpec::new(
            settings.function_name.clone(),
            "Set the parameters used to search the content catalog",
        )
        .with_parameters_of::<SearchParametersArgs>();

        Self {
            ai,
            registry,
            prompts,
            settings,
            function,
        }
    }

    /// Wire up the OpenAI client from env secrets and the TOML config.
    pub fn from_config(
        app_config: &AppConfig,
        file_config: &FileConfig,
        registry: Arc<KeywordRegistry>,
        prompts: Arc<PromptRegistry>,
    ) -> Self {
        let mut ai = OpenAi::new(&app_config.openai_api_key, &file_config.models.interpret);
        if let Some(url) = &app_config.openai_base_url {
            ai = ai.with_base_url(url);
        }
        if let Some(secs) = file_config.interpreter.request_timeout_secs {
            ai = ai.with_timeout(Duration::from_secs(secs));
        }

        Self::new(
            ai,
            registry,
            prompts,
            InterpreterSettings::from(&file_config.interpreter),
        )
    }

    pub fn build_prompt(&self, search_term: &str) -> String {
        self.prompts
            .interpret_prompt(&self.registry.prompt_list(), search_term)
    }

    pub fn function(&self) -> &FunctionSpec {
        &self.function
    }
}

#[async_trait]
impl QueryInterpreter for FunctionCallInterpreter {
    async fn interpret(&self, search_term: &str) -> Result<ExtractedParameters, SearchError> {
        let prompt = self.build_prompt(search_term);

        debug!(
            model = %self.ai.model(),
            function = %self.function.name,
            prompt_len = prompt.len(),
            "Interpreting search term"
        );

        let reply = self
            .ai
            .function_call(
                &prompt,
                &self.function,
                self.settings.function_call,
                self.settings.max_tokens,
            )
            .await?;

        let arguments = ReplyArguments::from_raw(reply.arguments.as_deref());
        match &arguments {
            ReplyArguments::Parsed(args) => {
                debug!(keywords = ?args.keywords, "Function call arguments parsed");
            }
            ReplyArguments::Absent => {
                info!(
                    finish_reason = ?reply.finish_reason,
                    content = %truncate_to_char_boundary(reply.content.as_deref().unwrap_or(""), 120),
                    "Model answered without a function call; using default parameters"
                );
            }
            ReplyArguments::Malformed(message) => {
                debug!(error = %message, "Function call arguments malformed");
            }
        }

        arguments.into_parameters(self.settings.default_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpreter() -> FunctionCallInterpreter {
        FunctionCallInterpreter::new(
            OpenAi::new("sk-test", "gpt-4o-mini"),
            Arc::new(KeywordRegistry::new(["mountain", "river"])),
            Arc::new(PromptRegistry::builtin()),
            InterpreterSettings::default(),
        )
    }

    #[test]
    fn prompt_carries_allow_list_and_literal_term() {
        let prompt = interpreter().build_prompt("Rivers NEAR me");
        assert!(prompt.contains("Keywords: mountain, river"));
        assert!(prompt.contains("\"Rivers NEAR me\""));
    }

    #[test]
    fn function_uses_configured_name_and_schema() {
        let interpreter = interpreter();
        let function = interpreter.function();
        assert_eq!(function.name, "set_search_parameters");
        assert_eq!(function.parameters["required"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn default_settings_match_config_defaults() {
        let settings = InterpreterSettings::default();
        assert_eq!(settings.function_call, FunctionCallMode::Force);
        assert_eq!(settings.max_tokens, 550);
        assert_eq!(settings.default_limit, 10);
    }
}
