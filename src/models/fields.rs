//! Parsers for custom fields whose values are structured strings.
//!
//! Jira Server stores sprint membership as a list of `key=value` strings
//! and the development panel summary as a Java `toString()` of a map whose
//! `devSummaryJson` entry is a JSON document. Both are parsed here with an
//! explicit grammar; anything that does not fit is a
//! [`JiraError::MalformedField`].

use crate::errors::{JiraError, Result};
use serde_json::Value;

pub const SPRINT_FIELD: &str = "customfield_10005";
pub const DEV_SUMMARY_FIELD: &str = "customfield_11100";
pub const EPIC_LINK_FIELD: &str = "customfield_10001";

pub const DEV_SUMMARY_MARKER: &str = "devSummaryJson=";

/// Returns the `name=` component of every sprint entry, in field order.
///
/// Accepted entries:
/// - `"id=1,name=Sprint 7,state=ACTIVE"`
/// - `"com.atlassian.greenhopper.service.sprint.Sprint@1f[id=1,name=Sprint 7]"`
/// - `{"id": 1, "name": "Sprint 7"}` (newer servers)
pub fn parse_sprints(value: Option<&Value>) -> Result<Vec<String>> {
    let entries = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(JiraError::malformed(
                SPRINT_FIELD,
                format!("expected a list of sprints, got {}", kind_of(other)),
            ))
        }
    };

    entries.iter().map(parse_sprint_entry).collect()
}

fn parse_sprint_entry(entry: &Value) -> Result<String> {
    match entry {
        Value::String(raw) => sprint_name_component(raw),
        Value::Object(map) => match map.get("name").and_then(Value::as_str) {
            Some(name) => Ok(format!("name={}", name)),
            None => Err(JiraError::malformed(SPRINT_FIELD, "sprint object has no name")),
        },
        other => Err(JiraError::malformed(
            SPRINT_FIELD,
            format!("unexpected sprint entry of type {}", kind_of(other)),
        )),
    }
}

fn sprint_name_component(raw: &str) -> Result<String> {
    // Strip the optional `Type@hash[` ... `]` wrapper.
    let body = match (raw.find('['), raw.ends_with(']')) {
        (Some(open), true) if is_wrapper_prefix(&raw[..open]) => &raw[open + 1..raw.len() - 1],
        _ => raw,
    };

    body.split(',')
        .map(str::trim)
        .find(|component| {
            component
                .split_once('=')
                .map(|(key, _)| key == "name")
                .unwrap_or(false)
        })
        .map(str::to_string)
        .ok_or_else(|| {
            JiraError::malformed(SPRINT_FIELD, format!("no name= component in '{}'", raw))
        })
}

fn is_wrapper_prefix(prefix: &str) -> bool {
    prefix.contains('@') && !prefix.contains('=')
}

/// Extracts `cachedValue.summary.pullrequest.overall` from the dev summary
/// field. An absent field means the ticket has no development data.
pub fn parse_dev_summary(value: Option<&Value>) -> Result<Option<Value>> {
    let raw = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(raw)) => raw,
        Some(other) => {
            return Err(JiraError::malformed(
                DEV_SUMMARY_FIELD,
                format!("expected a string, got {}", kind_of(other)),
            ))
        }
    };

    let document = embedded_json(raw)?;

    document
        .pointer("/cachedValue/summary/pullrequest/overall")
        .cloned()
        .map(Some)
        .ok_or_else(|| {
            JiraError::malformed(
                DEV_SUMMARY_FIELD,
                "missing cachedValue.summary.pullrequest.overall",
            )
        })
}

/// `{summaryBean=..., devSummaryJson=<json>}`: one JSON document after the
/// marker, then only the closing brace of the wrapper.
fn embedded_json(raw: &str) -> Result<Value> {
    let (_, rest) = raw.split_once(DEV_SUMMARY_MARKER).ok_or_else(|| {
        JiraError::malformed(
            DEV_SUMMARY_FIELD,
            format!("marker '{}' not found", DEV_SUMMARY_MARKER),
        )
    })?;

    let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
    let document = match stream.next() {
        Some(Ok(document)) => document,
        Some(Err(e)) => {
            return Err(JiraError::malformed(
                DEV_SUMMARY_FIELD,
                format!("embedded JSON is invalid: {}", e),
            ))
        }
        None => {
            return Err(JiraError::malformed(
                DEV_SUMMARY_FIELD,
                "nothing follows the marker",
            ))
        }
    };

    let trailing = rest[stream.byte_offset()..].trim();
    if trailing != "}" {
        return Err(JiraError::malformed(
            DEV_SUMMARY_FIELD,
            format!("unexpected text after embedded JSON: '{}'", trailing),
        ));
    }

    Ok(document)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
