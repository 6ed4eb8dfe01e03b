use ai_client::FunctionCallMode;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// TOML-backed configuration loaded from disk.
/// Secrets (API key) stay as env vars.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub identity: IdentityConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub interpreter: InterpreterConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    pub name: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelsConfig {
    pub interpret: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            interpret: "gpt-4o-mini".to_string(),
        }
    }
}

/// Knobs for the function-calling request sent per search.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterpreterConfig {
    pub function_name: String,
    pub function_call: FunctionCallMode,
    pub max_tokens: u32,
    /// Limit reported when the model does not call the function.
    pub default_limit: u32,
    /// Unset means no timeout.
    pub request_timeout_secs: Option<u64>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            function_name: "set_search_parameters".to_string(),
            function_call: FunctionCallMode::Force,
            max_tokens: 550,
            default_limit: 10,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptsConfig {
    /// Falls back to the built-in instruction when unset.
    pub interpret: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    pub dataset: PathBuf,
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load the raw TOML value tree (for `{{config.*}}` resolution in prompts).
pub fn load_toml_value(path: &Path) -> Result<toml::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    content
        .parse()
        .with_context(|| format!("Failed to parse config as TOML: {}", path.display()))
}

/// Directory that relative paths inside the config file are resolved against.
pub fn config_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let file = write_config(
            r#"
            [identity]
            name = "Wayfinder"
            region = "Anchorage"

            [data]
            dataset = "data/anchorage.toml"
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.models.interpret, "gpt-4o-mini");
        assert_eq!(config.interpreter.function_name, "set_search_parameters");
        assert_eq!(config.interpreter.function_call, FunctionCallMode::Force);
        assert_eq!(config.interpreter.max_tokens, 550);
        assert_eq!(config.interpreter.default_limit, 10);
        assert!(config.interpreter.request_timeout_secs.is_none());
        assert!(config.prompts.interpret.is_none());
    }

    #[test]
    fn interpreter_overrides() {
        let file = write_config(
            r#"
            [identity]
            name = "Wayfinder"
            region = "Anchorage"

            [interpreter]
            function_call = "auto"
            max_tokens = 200
            request_timeout_secs = 15

            [data]
            dataset = "d.toml"
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.interpreter.function_call, FunctionCallMode::Auto);
        assert_eq!(config.interpreter.max_tokens, 200);
        assert_eq!(config.interpreter.request_timeout_secs, Some(15));
        assert_eq!(config.interpreter.function_name, "set_search_parameters");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let file = write_config(
            r#"
            [identity]
            name = "Wayfinder"
            region = "Anchorage"
            colour = "blue"

            [data]
            dataset = "d.toml"
            "#,
        );

        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn config_dir_of_bare_filename_is_cwd() {
        assert_eq!(config_dir(Path::new("wayfinder.toml")), PathBuf::from(""));
        assert_eq!(
            config_dir(Path::new("config/wayfinder.toml")),
            PathBuf::from("config")
        );
    }
}
