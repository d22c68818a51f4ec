//! Lenient JSON for hand-written metadata.
//!
//! Frontmatter blocks and inclusion arguments are typed by people, not
//! serializers, so they are accepted in a JSON superset:
//!
//! - unquoted identifier keys: `{ title: "Home" }`
//! - single-quoted strings: `{ 'title': 'Home' }`
//! - trailing commas: `[1, 2, ]`
//! - `//` line comments and `/* */` block comments
//!
//! Input is first tried as strict JSON. If that fails, it is normalized to
//! strict JSON and parsed again, so error positions refer to the normalized
//! text only when the relaxed syntax was actually needed.

use serde_json::Value;

/// Parse relaxed JSON text into a value.
pub fn parse(text: &str) -> Result<Value, serde_json::Error> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(_) => serde_json::from_str(&normalize(text)),
    }
}

/// Parse relaxed JSON that must be an object; anything else is an error
/// message suitable for a diagnostic.
pub fn parse_object(text: &str) -> Result<serde_json::Map<String, Value>, String> {
    match parse(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected an object, found {}", type_name(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Rewrite the relaxed syntax into strict JSON.
fn normalize(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                i = copy_double_quoted(&chars, i, &mut out);
            }
            '\'' => {
                i = convert_single_quoted(&chars, i, &mut out);
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i = (i + 2).min(chars.len());
            }
            '}' | ']' => {
                drop_trailing_comma(&mut out);
                out.push(c);
                i += 1;
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
                {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                if next_significant(&chars, i) == Some(':') {
                    out.push('"');
                    out.push_str(&ident);
                    out.push('"');
                } else {
                    out.push_str(&ident);
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

fn copy_double_quoted(chars: &[char], start: usize, out: &mut String) -> usize {
    out.push('"');
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        i += 1;
        match c {
            '\\' if i < chars.len() => {
                out.push(chars[i]);
                i += 1;
            }
            '"' => return i,
            _ => {}
        }
    }
    i
}

fn convert_single_quoted(chars: &[char], start: usize, out: &mut String) -> usize {
    out.push('"');
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '\\' if i < chars.len() => {
                let escaped = chars[i];
                i += 1;
                if escaped == '\'' {
                    out.push('\'');
                } else {
                    out.push('\\');
                    out.push(escaped);
                }
            }
            '"' => out.push_str("\\\""),
            '\'' => {
                out.push('"');
                return i;
            }
            _ => out.push(c),
        }
    }
    out.push('"');
    i
}

fn next_significant(chars: &[char], from: usize) -> Option<char> {
    chars[from..].iter().copied().find(|c| !c.is_whitespace())
}

fn drop_trailing_comma(out: &mut String) {
    let trimmed_len = out.trim_end().len();
    if out[..trimmed_len].ends_with(',') {
        out.truncate(trimmed_len - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strict_json_passes_through() {
        let v = parse(r#"{"title": "Home", "n": 3}"#).unwrap();
        assert_eq!(v, json!({"title": "Home", "n": 3}));
    }

    #[test]
    fn unquoted_keys() {
        let v = parse(r#"{ title: "Home", og: { image: "/og.png" } }"#).unwrap();
        assert_eq!(v["title"], "Home");
        assert_eq!(v["og"]["image"], "/og.png");
    }

    #[test]
    fn single_quoted_strings() {
        let v = parse(r#"{ 'title': 'It\'s "here"' }"#).unwrap();
        assert_eq!(v["title"], r#"It's "here""#);
    }

    #[test]
    fn trailing_commas() {
        let v = parse("{ tags: ['a', 'b',], }").unwrap();
        assert_eq!(v, json!({"tags": ["a", "b"]}));
    }

    #[test]
    fn comments_are_ignored() {
        let v = parse(
            r#"{
                // the page title
                title: "Home", /* inline */ layout: "wide"
            }"#,
        )
        .unwrap();
        assert_eq!(v, json!({"title": "Home", "layout": "wide"}));
    }

    #[test]
    fn literals_stay_literals() {
        let v = parse("{ draft: true, cover: null }").unwrap();
        assert_eq!(v["draft"], true);
        assert!(v["cover"].is_null());
    }

    #[test]
    fn urls_inside_strings_are_not_comments() {
        let v = parse("{ url: 'https://example.com/a' }").unwrap();
        assert_eq!(v["url"], "https://example.com/a");
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse("{ title: ").is_err());
    }

    #[test]
    fn parse_object_rejects_arrays() {
        let err = parse_object("[1, 2]").unwrap_err();
        assert!(err.contains("an array"));
    }
}
