//! Best-effort recovery of a JSON object from free-form model output.
//!
//! Models asked for "raw JSON" still wrap it in markdown fences, prepend a
//! sentence, or append a closing remark.  [`recover`] tolerates all of these
//! and never fails: the worst case is an empty [`Recovered`] document, which
//! callers treat as "nothing usable".
//!
//! Order of attempts:
//!
//! 1. strip fences and parse the whole text;
//! 2. parse the greedy span from the first `{` to the last `}`;
//! 3. scan balanced `{...}` candidates left to right and take the first one
//!    that parses.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```json|```").expect("fence pattern"));
static OBJECT_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("span pattern"));

static NULL: Value = Value::Null;

// ---------------------------------------------------------------------------
// Recovered
// ---------------------------------------------------------------------------

/// Open key/value document recovered from a model reply.
///
/// Lookups never fail: any missing key, or any step through a non-object
/// value, yields `Value::Null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recovered(Map<String, Value>);

impl Recovered {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Top-level value for `key`, or `Null`.
    pub fn get(&self, key: &str) -> &Value {
        self.0.get(key).unwrap_or(&NULL)
    }

    /// Nested lookup, e.g. `path(&["classification", "primary_category"])`.
    pub fn path(&self, keys: &[&str]) -> &Value {
        let Some((first, rest)) = keys.split_first() else {
            return &NULL;
        };
        rest.iter().fold(self.get(first), |value, key| match value {
            Value::Object(map) => map.get(*key).unwrap_or(&NULL),
            _ => &NULL,
        })
    }
}

impl From<Map<String, Value>> for Recovered {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ---------------------------------------------------------------------------
// Cleaning and extraction
// ---------------------------------------------------------------------------

/// Trim, and when the text opens with a code fence remove every fence marker
/// (```` ```json ```` or bare ```` ``` ````) before trimming again.
fn clean_output(text: &str) -> String {
    let text = text.trim();
    if text.starts_with("```") {
        FENCE.replace_all(text, "").trim().to_string()
    } else {
        text.to_string()
    }
}

/// Parse `text` into a JSON object using progressively looser strategies.
fn extract_json(text: &str) -> Recovered {
    if let Some(map) = parse_object(text) {
        return map.into();
    }

    if let Some(span) = OBJECT_SPAN.find(text) {
        if let Some(map) = parse_object(span.as_str()) {
            return map.into();
        }
    }

    balanced_objects(text)
        .find_map(parse_object)
        .map(Recovered::from)
        .unwrap_or_default()
}

/// Strip fences, then parse with progressively looser strategies.
pub fn recover(raw: &str) -> Recovered {
    extract_json(&clean_output(raw))
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Every balanced `{...}` span, ordered by where it starts.
///
/// One pass with a stack of open positions.  Braces inside JSON strings are
/// ignored; quotes in prose outside any object do not open a string.
/// Unclosed `{` and unmatched `}` yield nothing.
fn balanced_objects(text: &str) -> impl Iterator<Item = &str> {
    let mut open = Vec::new();
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push(i),
            '}' => {
                if let Some(start) = open.pop() {
                    spans.push((start, i));
                }
            }
            _ => {}
        }
    }

    spans.sort_unstable_by_key(|&(start, _)| start);
    spans.into_iter().map(move |(start, end)| &text[start..=end])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
