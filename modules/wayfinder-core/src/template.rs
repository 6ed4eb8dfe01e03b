use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashMap;

/// A parsed piece of a `{{var}}` template.
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    /// `\{{` in the source, rendered as a literal `{{`.
    Escaped,
    Var(&'a str),
}

fn parse(template: &str) -> Result<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        let escaped = open > 0 && rest.as_bytes()[open - 1] == b'\\';
        let text_end = if escaped { open - 1 } else { open };
        if text_end > 0 {
            segments.push(Segment::Text(&rest[..text_end]));
        }

        let after = &rest[open + 2..];
        if escaped {
            segments.push(Segment::Escaped);
            rest = after;
            continue;
        }

        let close = after.find("}}").ok_or_else(|| {
            let name: String = after.chars().take(32).collect();
            anyhow!("Unclosed template variable: {{{{{name}")
        })?;
        segments.push(Segment::Var(after[..close].trim()));
        rest = &after[close + 2..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }

    Ok(segments)
}

/// Resolve `{{config.*}}` variables from the TOML value tree at load time.
/// Runtime variables and `\{{` escapes are carried through untouched.
pub fn resolve_config_vars(template: &str, toml_value: &toml::Value) -> Result<String> {
    let mut result = String::with_capacity(template.len());

    for segment in parse(template)? {
        match segment {
            Segment::Text(text) => result.push_str(text),
            Segment::Escaped => result.push_str("\\{{"),
            Segment::Var(name) => match name.strip_prefix("config.") {
                Some(path) => {
                    let value = lookup_toml_path(toml_value, path)
                        .with_context(|| format!("Config variable not found: {{{{{name}}}}}"))?;
                    result.push_str(&toml_value_to_string(value));
                }
                None => {
                    result.push_str("{{");
                    result.push_str(name);
                    result.push_str("}}");
                }
            },
        }
    }

    Ok(result)
}

/// Fill runtime `{{var}}` placeholders. Substituted values are not re-scanned,
/// so user input containing braces is inserted verbatim.
pub fn resolve_runtime_vars(template: &str, vars: &HashMap<&str, &str>) -> String {
    let Ok(segments) = parse(template) else {
        return template.to_string();
    };

    let mut result = String::with_capacity(template.len());
    for segment in segments {
        match segment {
            Segment::Text(text) => result.push_str(text),
            Segment::Escaped => result.push_str("{{"),
            Segment::Var(name) => match vars.get(name) {
                Some(value) => result.push_str(value),
                None => {
                    result.push_str("{{");
                    result.push_str(name);
                    result.push_str("}}");
                }
            },
        }
    }
    result
}

/// Check that every `{{...}}` is either a resolvable `config.*` path or one of
/// the allowed runtime variables.
pub fn validate_template(
    template: &str,
    toml_value: &toml::Value,
    allowed_runtime: &[&str],
) -> Result<()> {
    for segment in parse(template)? {
        let Segment::Var(name) = segment else {
            continue;
        };

        if let Some(path) = name.strip_prefix("config.") {
            lookup_toml_path(toml_value, path)
                .with_context(|| format!("Config variable not found: {{{{{name}}}}}"))?;
        } else if !allowed_runtime.contains(&name) {
            bail!(
                "Unknown template variable: {{{{{name}}}}}. Allowed runtime vars: {:?}",
                allowed_runtime
            );
        }
    }

    Ok(())
}

/// Walk the TOML value tree by dotted path (e.g., "identity.region").
fn lookup_toml_path<'a>(value: &'a toml::Value, path: &str) -> Option<&'a toml::Value> {
    path.split('.').try_fold(value, |current, key| current.get(key))
}

fn toml_value_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Array(arr) => arr
            .iter()
            .map(toml_value_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        toml::Value::Table(_) => "[table]".to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
    }
}
