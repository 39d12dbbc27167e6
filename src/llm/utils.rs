/// Removes a markdown code fence (```json ... ``` or ``` ... ```) wrapped around model output.
///
/// Text without a fence comes back trimmed and otherwise untouched.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const BODY: &str = r#"{"period":"January 2026","highlights":[{"value":"$1"},{"value":"$2"}]}"#;

    #[test]
    fn test_fenced_and_bare_bodies_parse_identically() {
        let bare: Value = serde_json::from_str(BODY).unwrap();
        for wrapped in [
            format!("```json\n{}\n```", BODY),
            format!("```JSON {}```", BODY),
            format!("```\n{}\n```", BODY),
            format!("  \n{}\n", BODY),
        ] {
            let parsed: Value = serde_json::from_str(strip_code_fences(&wrapped)).unwrap();
            assert_eq!(parsed, bare, "input: {}", wrapped);
        }
    }

    #[test]
    fn test_stripping_is_idempotent() {
        let once = strip_code_fences("```json\n{\"a\":1}\n```");
        assert_eq!(strip_code_fences(once), once);
        assert_eq!(strip_code_fences(BODY), BODY);
    }

    #[test]
    fn test_prose_is_left_for_the_parser_to_reject() {
        let text = strip_code_fences("Here is your data: {}");
        assert_eq!(text, "Here is your data: {}");
        assert!(serde_json::from_str::<Value>(text).is_err());
    }
}
