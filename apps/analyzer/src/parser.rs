//! Recovers a `ResumeAnalysis` from the extraction service's reply text.
//!
//! The reply is asked to be bare JSON but often is not: it may be wrapped in
//! markdown fences, preceded by prose, or carry small syntax defects. Attempts
//! run in order and each only when the previous one failed:
//!
//! 1. strip code fences and surrounding whitespace
//! 2. slice from the first `{` to the last `}`
//! 3. strict parse
//! 4. repair pass (trailing commas, raw newlines/tabs) and parse again
//! 5. optional escape repair (stray backslashes, unescaped inner quotes)
//!
//! If nothing parses the caller gets a `ParseError` holding the raw reply for
//! diagnostics. Partial structure is never guessed.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::ResumeAnalysis;

#[derive(Debug, Error)]
#[error("could not recover a resume record from the service reply: {reason}")]
pub struct ParseError {
    reason: String,
    raw: String,
}

impl ParseError {
    fn new(reason: impl Into<String>, raw: &str) -> Self {
        Self {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The unmodified reply. For logs only; never show it to the user.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser {
    /// Enables the last-resort escape repair. It can misjudge a legitimate
    /// quote, so it stays off unless configured.
    pub aggressive_repair: bool,
}

impl ResponseParser {
    pub fn new(aggressive_repair: bool) -> Self {
        Self { aggressive_repair }
    }

    pub fn parse(&self, raw: &str) -> Result<ResumeAnalysis, ParseError> {
        let candidate = slice_object(strip_json_fences(raw));

        let value = match serde_json::from_str::<Value>(candidate) {
            Ok(value) => value,
            Err(strict_err) => {
                debug!("Strict parse failed ({strict_err}), attempting repair");
                self.parse_repaired(candidate, raw)?
            }
        };

        into_analysis(value, raw)
    }

    fn parse_repaired(&self, candidate: &str, raw: &str) -> Result<Value, ParseError> {
        let repaired = collapse_control_whitespace(&remove_trailing_commas(candidate));
        match serde_json::from_str::<Value>(&repaired) {
            Ok(value) => Ok(value),
            Err(e) if self.aggressive_repair => {
                debug!("Repair pass failed ({e}), attempting escape repair");
                serde_json::from_str::<Value>(&repair_escapes(&repaired)).map_err(|e| {
                    warn!("Escape repair failed: {e}");
                    ParseError::new(format!("malformed JSON after escape repair: {e}"), raw)
                })
            }
            Err(e) => {
                warn!("Repair pass failed: {e}");
                Err(ParseError::new(format!("malformed JSON after repair: {e}"), raw))
            }
        }
    }
}

fn into_analysis(value: Value, raw: &str) -> Result<ResumeAnalysis, ParseError> {
    let kind = match &value {
        Value::Object(_) => None,
        Value::Null => Some("null"),
        Value::Bool(_) => Some("a boolean"),
        Value::Number(_) => Some("a number"),
        Value::String(_) => Some("a string"),
        Value::Array(_) => Some("an array"),
    };
    if let Some(kind) = kind {
        return Err(ParseError::new(format!("expected a JSON object, got {kind}"), raw));
    }

    serde_json::from_value(value)
        .map_err(|e| ParseError::new(format!("unexpected record shape: {e}"), raw))
}

/// Strips a leading ```` ```json ```` (or bare ```` ``` ````) fence line and a
/// trailing ```` ``` ````.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (`json`, `JSON`, ...) that shares the fence line.
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let rest = rest.trim_start();
    rest.strip_suffix("```").map(str::trim).unwrap_or(rest)
}

/// Narrows to the outermost `{ ... }` span, discarding surrounding prose.
fn slice_object(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}

/// Removes commas that directly precede `}` or `]`. String contents are left
/// untouched.
fn remove_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Raw newlines and tabs become spaces. Inside strings they are invalid JSON;
/// outside they are insignificant.
fn collapse_control_whitespace(text: &str) -> String {
    text.chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
        .collect()
}

/// Last-resort repair inside string literals:
/// - a backslash that does not start a valid escape is doubled
/// - a quote not followed by `,`, `:`, `}`, `]` or end of input is escaped
/// - remaining control characters are written as `\u00XX`
fn repair_escapes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            i += 1;
            continue;
        }

        match c {
            '\\' => match chars.get(i + 1) {
                Some('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't') => {
                    out.push(c);
                    out.push(chars[i + 1]);
                    i += 2;
                    continue;
                }
                Some('u') if is_unicode_escape(&chars[i + 1..]) => {
                    out.push(c);
                }
                _ => out.push_str("\\\\"),
            },
            '"' => {
                let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
                if matches!(next, None | Some(',' | ':' | '}' | ']')) {
                    in_string = false;
                    out.push(c);
                } else {
                    out.push_str("\\\"");
                }
            }
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(c),
        }
        i += 1;
    }
    out
}

/// `rest` starts at the `u` of a `\u` escape.
fn is_unicode_escape(rest: &[char]) -> bool {
    rest.len() >= 5 && rest[1..5].iter().all(|c| c.is_ascii_hexdigit())
}
