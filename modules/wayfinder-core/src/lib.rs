pub mod config;
pub mod dataset;
pub mod file_config;
pub mod prompt_registry;
pub mod template;
pub mod types;

pub use config::AppConfig;
pub use dataset::{ContentCatalog, Dataset, DatasetError, KeywordRegistry, LocationTable};
pub use file_config::FileConfig;
pub use prompt_registry::PromptRegistry;
pub use types::*;
