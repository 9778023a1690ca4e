//! Locating a JSON payload inside raw model output.
//!
//! Providers are asked for bare JSON, but replies sometimes arrive wrapped in
//! a markdown fence or with a sentence before or after the object.

use serde::de::DeserializeOwned;
use std::ops::Range;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("no JSON object found in response")]
    NoJson,
    #[error("JSON object does not match the expected shape: {0}")]
    Invalid(#[source] serde_json::Error),
}

/// Byte ranges of every top-level `{...}` object in `text`, in order.
///
/// Braces inside string literals are ignored. Unbalanced closers are skipped
/// and an object still open at the end of input is not reported.
#[instrument(target = "strengths_quiz::json", skip(text), fields(text_len = text.len()))]
pub fn find_json_objects(text: &str) -> Vec<Range<usize>> {
    let mut results = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (i, &b) in text.as_bytes().iter().enumerate() {
        if in_string {
            if escape {
                escape = false;
                continue;
            }
            match b {
                b'\\' => escape = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            // Strings only matter once we are inside an object.
            b'"' if depth > 0 => in_string = true,
            b'{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    results.push(start..i + 1);
                }
            }
            _ => {}
        }
    }

    debug!(target: "strengths_quiz::json", count = results.len(), "found root objects");
    results
}

/// Deserialize the first JSON object in `text` that matches `T`.
///
/// The whole trimmed text is tried first. When objects are present but none
/// match, the error from the first candidate is returned.
pub fn extract_first<T: DeserializeOwned>(text: &str) -> Result<T, ExtractError> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<T>(trimmed) {
            return Ok(value);
        }
    }

    let mut first_error = None;
    for range in find_json_objects(text) {
        match serde_json::from_str::<T>(&text[range]) {
            Ok(value) => return Ok(value),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    Err(first_error.map_or(ExtractError::NoJson, ExtractError::Invalid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        x: i32,
    }

    #[test]
    fn finds_objects_around_prose() {
        let s = r#"Here you go: {"x":1} and also {"y":{"z":2}} done"#;
        let ranges = find_json_objects(s);
        assert_eq!(ranges.len(), 2);
        assert_eq!(&s[ranges[1].clone()], r#"{"y":{"z":2}}"#);
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let s = r#"{"x":1,"note":"a } brace"}"#;
        assert_eq!(find_json_objects(s), vec![0..s.len()]);
    }

    #[test]
    fn extracts_from_code_fence() {
        let s = "```json\n{\"x\": 42}\n```";
        assert_eq!(extract_first::<Item>(s).unwrap(), Item { x: 42 });
    }

    #[test]
    fn skips_non_matching_objects() {
        let s = r#"{"y":1} {"x":5}"#;
        assert_eq!(extract_first::<Item>(s).unwrap(), Item { x: 5 });
    }

    #[test]
    fn reports_missing_and_invalid_json() {
        assert!(matches!(extract_first::<Item>("no json here"), Err(ExtractError::NoJson)));
        assert!(matches!(extract_first::<Item>(r#"{"x":"str"}"#), Err(ExtractError::Invalid(_))));
        assert!(matches!(extract_first::<Item>(r#"{"x":1"#), Err(ExtractError::NoJson)));
    }
}
