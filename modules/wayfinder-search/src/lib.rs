//! Natural-language catalog search.
//!
//! A free-text term goes to the inference service, which answers with a
//! function call carrying structured parameters. Extracted keywords are
//! checked against the allow-list and the catalog is filtered by the
//! survivors:
//!
//! term → [`QueryInterpreter`] → [`validate`] → [`filter`] → results
//!
//! [`SearchSession`] wraps one run of that chain per user search and exposes
//! its lifecycle as a [`RequestState`].

pub mod error;
pub mod filter;
pub mod interpreter;
pub mod params;
pub mod pipeline;
pub mod session;
pub mod validator;

pub use error::SearchError;
pub use filter::filter;
pub use interpreter::{FunctionCallInterpreter, InterpreterSettings, QueryInterpreter};
pub use params::{ExtractedParameters, ReplyArguments, SearchParametersArgs};
pub use pipeline::SearchPipeline;
pub use session::{RequestState, SearchSession, SearchView};
pub use validator::validate;
