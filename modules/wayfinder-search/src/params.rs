use ai_client::strip_code_blocks;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Structured filter parameters extracted from one search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedParameters {
    pub search: String,
    pub keywords: Vec<String>,
    pub limit: u32,
    pub offset: u32,
}

impl ExtractedParameters {
    pub const DEFAULT_LIMIT: u32 = 10;

    /// Parameters used when the model answers without a function call.
    pub fn fallback(limit: u32) -> Self {
        Self {
            search: String::new(),
            keywords: Vec::new(),
            limit,
            offset: 0,
        }
    }
}

impl Default for ExtractedParameters {
    fn default() -> Self {
        Self::fallback(Self::DEFAULT_LIMIT)
    }
}

/// Arguments of the `set_search_parameters` function as the model sends them.
/// Also the source of the function's JSON schema.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct SearchParametersArgs {
    /// Free-text search phrase.
    pub search: String,
    /// Keywords picked from the allowed items.
    pub keywords: Vec<String>,
    /// Maximum number of results.
    pub limit: f64,
    /// Number of results to skip.
    pub offset: f64,
}

/// Whole, non-negative count from a JSON number. Fractions truncate,
/// negatives clamp to zero, huge values saturate.
fn to_count(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value.trunc().min(u32::MAX as f64) as u32
    }
}

impl From<SearchParametersArgs> for ExtractedParameters {
    fn from(args: SearchParametersArgs) -> Self {
        Self {
            search: args.search,
            keywords: args.keywords,
            limit: to_count(args.limit),
            offset: to_count(args.offset),
        }
    }
}

/// What the reply's function-call arguments turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyArguments {
    Parsed(SearchParametersArgs),
    /// No function call, or an empty arguments string.
    Absent,
    /// Arguments present but not decodable; carries the decoder message.
    Malformed(String),
}

impl ReplyArguments {
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(text) = raw.map(strip_code_blocks).filter(|t| !t.is_empty()) else {
            return Self::Absent;
        };

        match serde_json::from_str::<SearchParametersArgs>(text) {
            Ok(args) => Self::Parsed(args),
            Err(e) => Self::Malformed(e.to_string()),
        }
    }

    /// Only `Parsed` produces parameters from the reply; `Absent` degrades to
    /// the fallback and `Malformed` is an error.
    pub fn into_parameters(self, default_limit: u32) -> Result<ExtractedParameters, SearchError> {
        match self {
            Self::Parsed(args) => Ok(args.into()),
            Self::Absent => Ok(ExtractedParameters::fallback(default_limit)),
            Self::Malformed(message) => Err(SearchError::Parse(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_client::StructuredOutput;

    #[test]
    fn default_is_documented_fallback() {
        assert_eq!(
            ExtractedParameters::default(),
            ExtractedParameters {
                search: String::new(),
                keywords: vec![],
                limit: 10,
                offset: 0,
            }
        );
    }

    #[test]
    fn parses_well_formed_arguments() {
        let args = ReplyArguments::from_raw(Some(
            r#"{"search":"salmon","keywords":["River","lake"],"limit":5,"offset":0}"#,
        ));

        let params = args.into_parameters(10).unwrap();
        assert_eq!(params.search, "salmon");
        assert_eq!(params.keywords, ["River", "lake"]);
        assert_eq!(params.limit, 5);
    }

    #[test]
    fn missing_or_empty_arguments_are_absent() {
        assert_eq!(ReplyArguments::from_raw(None), ReplyArguments::Absent);
        assert_eq!(ReplyArguments::from_raw(Some("")), ReplyArguments::Absent);
        assert_eq!(ReplyArguments::from_raw(Some("   ")), ReplyArguments::Absent);

        let params = ReplyArguments::Absent.into_parameters(25).unwrap();
        assert_eq!(params, ExtractedParameters::fallback(25));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let args = ReplyArguments::from_raw(Some("{\"search\": \"unterminated"));
        assert!(matches!(args, ReplyArguments::Malformed(_)));
        assert!(matches!(args.into_parameters(10), Err(SearchError::Parse(_))));
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let missing_keywords = r#"{"search":"x","limit":1,"offset":0}"#;
        let keywords_not_strings = r#"{"search":"x","keywords":[1,2],"limit":1,"offset":0}"#;
        let not_an_object = r#"["river"]"#;

        for raw in [missing_keywords, keywords_not_strings, not_an_object] {
            assert!(
                matches!(ReplyArguments::from_raw(Some(raw)), ReplyArguments::Malformed(_)),
                "{raw} should be malformed"
            );
        }
    }

    #[test]
    fn fenced_arguments_are_accepted() {
        let raw = "```json\n{\"search\":\"\",\"keywords\":[],\"limit\":3,\"offset\":1}\n```";
        let params = ReplyArguments::from_raw(Some(raw)).into_parameters(10).unwrap();
        assert_eq!((params.limit, params.offset), (3, 1));
    }

    #[test]
    fn counts_are_clamped_to_whole_non_negative_numbers() {
        let raw = r#"{"search":"","keywords":[],"limit":7.9,"offset":-4}"#;
        let params = ReplyArguments::from_raw(Some(raw)).into_parameters(10).unwrap();
        assert_eq!(params.limit, 7);
        assert_eq!(params.offset, 0);

        assert_eq!(to_count(1e12), u32::MAX);
    }

    #[test]
    fn schema_declares_four_required_fields() {
        let schema = SearchParametersArgs::function_parameters();

        let mut required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        required.sort_unstable();
        assert_eq!(required, ["keywords", "limit", "offset", "search"]);

        let props = &schema["properties"];
        assert_eq!(props["search"]["type"], "string");
        assert_eq!(props["keywords"]["type"], "array");
        assert_eq!(props["keywords"]["items"]["type"], "string");
        assert_eq!(props["limit"]["type"], "number");
        assert_eq!(props["offset"]["type"], "number");
    }
}
