//! Salvage parser for structured model output
//!
//! The external media-understanding service is asked for JSON but answers
//! with free text: code fences, leading prose, responses cut off
//! mid-string or mid-array. This module attempts a fixed ladder of
//! repairs, cheapest and safest first; only the last rung discards data.

use serde_json::Value;
use thiserror::Error;

/// How much of the offending text to keep for diagnostics
const DIAGNOSTIC_PREVIEW_CHARS: usize = 500;

/// Raised only after every recovery strategy is exhausted
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("unrecoverable structured payload: {preview}")]
    UnrecoverableFormat { preview: String },
}

/// Which rung of the repair ladder produced the parsed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The trimmed text parsed as-is
    Direct,
    /// Parsed after fence/preamble stripping
    FenceStrip,
    /// Parsed after control-character and trailing-comma cleanup
    Cleanup,
    /// Parsed after closing an unterminated string literal
    StringClosure,
    /// Parsed after appending missing closing delimiters
    DelimiterBalance,
    /// Parsed after truncating to the last structural boundary
    TruncationSalvage,
}

/// Recover a JSON value from possibly-malformed model output
pub fn recover(raw: &str) -> Result<Value, RecoveryError> {
    recover_traced(raw).map(|(value, _)| value)
}

/// Like [`recover`], also reporting which strategy succeeded
///
/// Valid JSON always takes [`Strategy::Direct`]; the repair rungs never
/// run for well-formed input.
pub fn recover_traced(raw: &str) -> Result<(Value, Strategy), RecoveryError> {
    let trimmed = raw.trim();

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok((value, Strategy::Direct));
    }

    let stripped = strip_fences_and_prose(trimmed);
    if let Ok(value) = serde_json::from_str(&stripped) {
        return Ok((value, Strategy::FenceStrip));
    }

    let cleaned = strip_trailing_commas(&strip_control_chars(&stripped));
    if let Ok(value) = serde_json::from_str(&cleaned) {
        return Ok((value, Strategy::Cleanup));
    }

    let closed = close_unterminated_string(&cleaned);
    if let Ok(value) = serde_json::from_str(&closed) {
        return Ok((value, Strategy::StringClosure));
    }

    let balanced = append_missing_closers(&closed);
    if let Ok(value) = serde_json::from_str(&balanced) {
        return Ok((value, Strategy::DelimiterBalance));
    }

    if let Some(salvaged) = salvage_truncation(&closed) {
        if let Ok(value) = serde_json::from_str(&salvaged) {
            return Ok((value, Strategy::TruncationSalvage));
        }
    }

    Err(RecoveryError::UnrecoverableFormat {
        preview: trimmed.chars().take(DIAGNOSTIC_PREVIEW_CHARS).collect(),
    })
}

/// Remove markdown fences and any prose around the outermost JSON object
fn strip_fences_and_prose(text: &str) -> String {
    let mut s = text.trim();

    if let Some(rest) = s.strip_prefix("```") {
        // Drop an optional language tag ("json", "JSON", ...)
        let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
        s = rest.trim_start();
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim_end();
    }

    // Prose around the payload: keep first '{' through last '}'
    match (s.find('{'), s.rfind('}')) {
        (Some(start), Some(end)) if start < end => s[start..=end].to_string(),
        // Truncated payloads may have an opening brace but no closer;
        // keep from the brace onward and let later rungs repair it.
        (Some(start), _) => s[start..].to_string(),
        _ => s.to_string(),
    }
}

/// Strip C0/C1 control characters, keeping ordinary JSON whitespace
fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| !c.is_control() || c == '\n' || c == '\r' || c == '\t')
        .collect()
}

/// Remove commas that directly precede a closing `}` or `]`
///
/// String-aware: commas inside string literals are untouched.
fn strip_trailing_commas(text: &str) -> String {
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
                let mut j = i + 1;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                let dangling = j < chars.len() && (chars[j] == '}' || chars[j] == ']');
                if !dangling {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Append one closing quote if the text ends inside a string literal
fn close_unterminated_string(text: &str) -> String {
    let mut out = text.to_string();
    if ends_inside_string(text) {
        out.push('"');
    }
    out
}

fn ends_inside_string(text: &str) -> bool {
    let mut in_string = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        }
    }
    in_string
}

/// Close every `{`/`[` left open at end-of-text, innermost first
///
/// The scan ignores delimiters inside string literals; stray closers pop
/// the stack without complaint so that mismatched input still yields a
/// parse attempt.
fn append_missing_closers(text: &str) -> String {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
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
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                stack.pop();
            }
            _ => {}
        }
    }

    let mut out = text.to_string();
    while let Some(closer) = stack.pop() {
        out.push(closer);
    }
    out
}

/// Last resort: cut back to the final structural boundary and re-balance
///
/// Only boundaries past the midpoint are considered, so at most half the
/// payload is sacrificed.
fn salvage_truncation(text: &str) -> Option<String> {
    let midpoint = text.len() / 2;
    let cut = [text.rfind(','), text.rfind(']'), text.rfind('}')]
        .into_iter()
        .flatten()
        .max()?;
    if cut <= midpoint {
        return None;
    }

    // Keep a closing delimiter, drop a trailing comma
    let keep_end = if text[cut..].starts_with(',') { cut } else { cut + 1 };
    let truncated = close_unterminated_string(&text[..keep_end]);
    Some(append_missing_closers(&truncated))
}
