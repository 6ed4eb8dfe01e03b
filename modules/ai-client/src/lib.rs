pub mod error;
pub mod openai;
pub mod util;

pub use error::{AiError, Result};
pub use openai::{FunctionCallMode, FunctionCallReply, FunctionSpec, OpenAi, StructuredOutput};
pub use util::{strip_code_blocks, truncate_to_char_boundary};
