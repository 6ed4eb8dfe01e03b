use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::file_config::FileConfig;
use crate::template::{resolve_config_vars, resolve_runtime_vars, validate_template};

/// Instruction sent when no prompt file is configured.
pub const DEFAULT_INTERPRET_PROMPT: &str = "Extract keywords from the following search string \
based on the allowed items. Here are the allowed items:
Keywords: {{keywords}}
Search String: \"{{search_term}}\"";

const INTERPRET_RUNTIME_VARS: &[&str] = &["keywords", "search_term"];

/// Pre-resolved prompt templates (config vars resolved, runtime vars intact).
#[derive(Debug, Clone)]
pub struct PromptRegistry {
    interpret: String,
}

impl PromptRegistry {
    /// Load the configured prompt file, or fall back to the built-in one.
    pub fn load(config: &FileConfig, config_dir: &Path, toml_value: &toml::Value) -> Result<Self> {
        let template = match &config.prompts.interpret {
            Some(relative) => {
                let full_path = config_dir.join(relative);
                let content = std::fs::read_to_string(&full_path).with_context(|| {
                    format!("Failed to read interpret prompt file: {}", full_path.display())
                })?;
                if content.trim().is_empty() {
                    anyhow::bail!("Prompt file is empty: {}", full_path.display());
                }
                content
            }
            None => DEFAULT_INTERPRET_PROMPT.to_string(),
        };

        Self::from_template(&template, toml_value)
    }

    /// Resolve and validate a template given inline.
    pub fn from_template(template: &str, toml_value: &toml::Value) -> Result<Self> {
        let interpret = resolve_config_vars(template, toml_value)
            .context("Failed to resolve config variables in interpret prompt")?;
        validate_template(&interpret, toml_value, INTERPRET_RUNTIME_VARS)
            .context("Template validation failed for interpret prompt")?;
        Ok(Self { interpret })
    }

    pub fn builtin() -> Self {
        Self {
            interpret: DEFAULT_INTERPRET_PROMPT.to_string(),
        }
    }

    /// Interpret prompt with the allow-list and the raw search term filled in.
    pub fn interpret_prompt(&self, keywords: &str, search_term: &str) -> String {
        resolve_runtime_vars(
            &self.interpret,
            &HashMap::from([("keywords", keywords), ("search_term", search_term)]),
        )
    }
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
