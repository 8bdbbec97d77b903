//! Scalar codec: single leaf values to and from text tokens.
//!
//! | Value | Token |
//! |-------|-------|
//! | `Null` | empty |
//! | `Bool` | `true` / `false` |
//! | `Number` | shortest exact literal (`42`, `3.0`, `1e21`, `NaN`) |
//! | `String` | raw, or `"quoted"` when raw text would be ambiguous |
//!
//! Strings are quoted when they are empty, start or end with whitespace,
//! contain `,` `:` `"` `\` or a control character, start with `{`, or read
//! as a boolean or number literal. Quoted strings use the escapes
//! `\" \\ \n \r \t \b \f \0 \uXXXX`.
//!
//! ```rust
//! use toon_legend::scalar::{decode_scalar, encode_scalar};
//! use toon_legend::Value;
//!
//! let place = Value::from("Shibpur (Diglipur, A&N Islands)");
//! let token = encode_scalar(&place).unwrap();
//! assert_eq!(token, "\"Shibpur (Diglipur, A&N Islands)\"");
//! assert_eq!(decode_scalar(&token, None).unwrap(), place);
//!
//! assert_eq!(decode_scalar("", None).unwrap(), Value::Null);
//! ```

use crate::{Error, Number, Result, Value};
use num_bigint::BigInt;
use std::fmt::Write as _;

/// Field delimiter inside rows, inline arrays, headers and the legend.
pub const DELIMITER: char = ',';

/// Separates a key from its value.
pub const KEY_SEPARATOR: char = ':';

const QUOTE: char = '"';
const ESCAPE: char = '\\';

const RESERVED: [&str; 5] = ["true", "false", "Infinity", "-Infinity", "NaN"];

/// The kind a scalar token is expected to decode to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    Null,
    Bool,
    Number,
    String,
}

impl ScalarKind {
    /// Returns the kind of a scalar value, or `None` for containers.
    #[must_use]
    pub const fn of(value: &Value) -> Option<ScalarKind> {
        match value {
            Value::Null => Some(ScalarKind::Null),
            Value::Bool(_) => Some(ScalarKind::Bool),
            Value::Number(_) => Some(ScalarKind::Number),
            Value::String(_) => Some(ScalarKind::String),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            ScalarKind::Null => "null",
            ScalarKind::Bool => "bool",
            ScalarKind::Number => "number",
            ScalarKind::String => "string",
        }
    }
}

/// Returns `true` if `s` must be quoted to survive as a value token.
#[must_use]
pub fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.starts_with(char::is_whitespace)
        || s.ends_with(char::is_whitespace)
        || s.starts_with('{')
        || s
            .chars()
            .any(|c| matches!(c, DELIMITER | KEY_SEPARATOR | QUOTE | ESCAPE) || c.is_control())
        || RESERVED.contains(&s)
        || looks_numeric(s)
}

/// Returns `true` if `key` must be quoted in a key or column position.
#[must_use]
pub fn key_needs_quotes(key: &str) -> bool {
    key.is_empty()
        || key.starts_with(char::is_whitespace)
        || key.ends_with(char::is_whitespace)
        || key.chars().any(|c| {
            matches!(
                c,
                DELIMITER | KEY_SEPARATOR | QUOTE | ESCAPE | '[' | ']' | '{' | '}'
            ) || c.is_control()
        })
}

/// Matches `-?digits(.digits)?([eE][+-]?digits)?`.
pub(crate) fn looks_numeric(s: &str) -> bool {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let digits_from = |mut i: usize| {
        while i < len && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = usize::from(bytes.first() == Some(&b'-'));
    let end = digits_from(i);
    if end == i {
        return false;
    }
    i = end;

    if i < len && bytes[i] == b'.' {
        let end = digits_from(i + 1);
        if end == i + 1 {
            return false;
        }
        i = end;
    }

    if i < len && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < len && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let end = digits_from(i);
        if end == i {
            return false;
        }
        i = end;
    }

    i == len
}

/// Writes `s` wrapped in quotes with every special character escaped.
pub fn write_quoted(out: &mut String, s: &str) {
    out.push(QUOTE);
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(QUOTE);
}

/// Writes a key or column identifier, quoting it when needed.
pub fn write_key(out: &mut String, key: &str) {
    if key_needs_quotes(key) {
        write_quoted(out, key);
    } else {
        out.push_str(key);
    }
}

/// Appends the token for a scalar value.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for arrays and objects.
pub fn write_scalar(out: &mut String, value: &Value) -> Result<()> {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => {
            let _ = write!(out, "{}", n);
        }
        Value::String(s) => {
            if needs_quotes(s) {
                write_quoted(out, s);
            } else {
                out.push_str(s);
            }
        }
        Value::Array(_) | Value::Object(_) => {
            return Err(Error::unsupported_type(&format!(
                "{} is not a scalar",
                value.kind_name()
            )))
        }
    }
    Ok(())
}

/// Encodes a scalar value as a token.
///
/// ```rust
/// use toon_legend::scalar::encode_scalar;
/// use toon_legend::Value;
///
/// assert_eq!(encode_scalar(&Value::Null).unwrap(), "");
/// assert_eq!(encode_scalar(&Value::from(2.0)).unwrap(), "2.0");
/// assert_eq!(encode_scalar(&Value::from("42")).unwrap(), "\"42\"");
/// assert!(encode_scalar(&Value::Array(vec![])).is_err());
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for arrays and objects.
pub fn encode_scalar(value: &Value) -> Result<String> {
    let mut out = String::new();
    write_scalar(&mut out, value)?;
    Ok(out)
}

/// Parses a quoted string at the start of `s`.
///
/// Returns the unescaped content and the number of bytes consumed, including
/// both quotes.
pub fn parse_quoted(s: &str) -> std::result::Result<(String, usize), String> {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, QUOTE)) => {}
        _ => return Err("expected opening quote".to_string()),
    }

    let mut result = String::new();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            QUOTE => return Ok((result, idx + 1)),
            ESCAPE => match chars.next().map(|(_, c)| c) {
                Some('"') => result.push('"'),
                Some('\\') => result.push('\\'),
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('b') => result.push('\u{0008}'),
                Some('f') => result.push('\u{000C}'),
                Some('0') => result.push('\0'),
                Some(',') => result.push(','),
                Some('u') => {
                    let mut code = 0u32;
                    for _ in 0..4 {
                        let digit = chars
                            .next()
                            .and_then(|(_, c)| c.to_digit(16))
                            .ok_or("invalid unicode escape (expected 4 hex digits)")?;
                        code = code * 16 + digit;
                    }
                    let ch = char::from_u32(code).ok_or("invalid unicode code point")?;
                    result.push(ch);
                }
                Some(other) => return Err(format!("unknown escape sequence '\\{}'", other)),
                None => break,
            },
            other => result.push(other),
        }
    }
    Err("unterminated quoted string".to_string())
}

fn unescape_bare(token: &str) -> std::result::Result<String, String> {
    let mut result = String::with_capacity(token.len());
    let mut chars = token.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            QUOTE => return Err("stray quote in unquoted field".to_string()),
            DELIMITER => return Err("unescaped delimiter in unquoted field".to_string()),
            ESCAPE => match chars.peek() {
                Some(&c @ (DELIMITER | ESCAPE)) => {
                    result.push(c);
                    chars.next();
                }
                _ => result.push(ESCAPE),
            },
            other => result.push(other),
        }
    }
    Ok(result)
}

fn parse_number(token: &str) -> Value {
    if token.contains(['.', 'e', 'E']) {
        match token.parse::<f64>() {
            Ok(f) => Value::Number(Number::from(f)),
            Err(_) => Value::String(token.to_string()),
        }
    } else if let Ok(i) = token.parse::<i64>() {
        Value::Number(Number::Integer(i))
    } else {
        match token.parse::<BigInt>() {
            Ok(b) => Value::Number(Number::from(b)),
            Err(_) => Value::String(token.to_string()),
        }
    }
}

/// Infers a value from a token; the error is a message without location.
pub(crate) fn parse_token(token: &str) -> std::result::Result<Value, String> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(Value::Null);
    }
    if token.starts_with(QUOTE) {
        let (s, used) = parse_quoted(token)?;
        if used != token.len() {
            return Err("unexpected text after closing quote".to_string());
        }
        return Ok(Value::String(s));
    }
    match token {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        "Infinity" => return Ok(Value::Number(Number::Infinity)),
        "-Infinity" => return Ok(Value::Number(Number::NegativeInfinity)),
        "NaN" => return Ok(Value::Number(Number::NaN)),
        _ => {}
    }
    if looks_numeric(token) {
        return Ok(parse_number(token));
    }
    unescape_bare(token).map(Value::String)
}

/// Decodes a token, optionally requiring a kind.
///
/// With `Some(ScalarKind::String)` an unquoted token is taken verbatim, so a
/// type-schema leaf like `123` or `true` stays a string. Other kinds must
/// match the inferred value. An empty token is always `Null`.
///
/// ```rust
/// use toon_legend::scalar::{decode_scalar, ScalarKind};
/// use toon_legend::{Error, Value};
///
/// assert_eq!(decode_scalar("42", None).unwrap(), Value::from(42));
/// assert_eq!(decode_scalar("42", Some(ScalarKind::String)).unwrap(), Value::from("42"));
/// assert!(matches!(decode_scalar("a,b", None), Err(Error::MalformedRow { .. })));
/// ```
///
/// # Errors
///
/// [`Error::MalformedRow`] for broken quoting or an unescaped delimiter,
/// [`Error::TypeMismatch`] when `expected` does not match.
pub fn decode_scalar(token: &str, expected: Option<ScalarKind>) -> Result<Value> {
    let value = parse_token(token).map_err(|msg| Error::malformed_row("", 0, &msg))?;
    let Some(kind) = expected else {
        return Ok(value);
    };

    let trimmed = token.trim();
    match (kind, &value) {
        (_, Value::Null) => Ok(value),
        (ScalarKind::String, Value::String(_)) => Ok(value),
        (ScalarKind::String, _) => unescape_bare(trimmed)
            .map(Value::String)
            .map_err(|msg| Error::malformed_row("", 0, &msg)),
        (ScalarKind::Bool, Value::Bool(_)) | (ScalarKind::Number, Value::Number(_)) => Ok(value),
        (kind, other) => Err(Error::type_mismatch(kind.name(), other.kind_name())),
    }
}

/// Scans `text` left to right, skipping quoted sections and escaped
/// characters, calling `hit` at every unquoted occurrence of `target`.
/// Stops early when `hit` returns `false`.
fn scan_unquoted(text: &str, target: char, mut hit: impl FnMut(usize) -> bool) {
    let mut in_quotes = false;
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            ESCAPE => escaped = true,
            QUOTE => in_quotes = !in_quotes,
            c if c == target && !in_quotes => {
                if !hit(idx) {
                    return;
                }
            }
            _ => {}
        }
    }
}

/// Byte offset of the first `target` outside quotes and escapes.
#[must_use]
pub fn find_unquoted(text: &str, target: char) -> Option<usize> {
    let mut found = None;
    scan_unquoted(text, target, |idx| {
        found = Some(idx);
        false
    });
    found
}

/// Splits `text` on unquoted delimiters, keeping raw tokens.
///
/// A trailing delimiter yields a trailing empty field, so `"a,b,"` has three
/// fields. Tokens are not validated here; [`decode_scalar`] does that.
#[must_use]
pub fn split_fields(text: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    scan_unquoted(text, DELIMITER, |idx| {
        fields.push(&text[start..idx]);
        start = idx + DELIMITER.len_utf8();
        true
    });
    fields.push(&text[start..]);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: Value) {
        let token = encode_scalar(&value).unwrap();
        assert_eq!(decode_scalar(&token, None).unwrap(), value, "token {:?}", token);
    }

    #[test]
    fn test_plain_strings_stay_raw() {
        assert_eq!(encode_scalar(&Value::from("VABB")).unwrap(), "VABB");
        assert_eq!(
            encode_scalar(&Value::from("DateTime (ISO 8601)")).unwrap(),
            "DateTime (ISO 8601)"
        );
        assert_eq!(encode_scalar(&Value::from("Null")).unwrap(), "Null");
        assert_eq!(encode_scalar(&Value::from("null")).unwrap(), "null");
    }

    #[test]
    fn test_ambiguous_strings_are_quoted() {
        for s in [
            "", " lead", "trail ", "a,b", "10:30", "say \"hi\"", "C:\\path", "true", "false",
            "NaN", "-Infinity", "42", "-3.5", "1e6", "{}", "{x}", "line\nbreak", "tab\tin",
        ] {
            assert!(needs_quotes(s), "{:?} should need quotes", s);
            roundtrip(Value::from(s));
        }
    }

    #[test]
    fn test_numbers_round_trip() {
        roundtrip(Value::from(0));
        roundtrip(Value::from(-17));
        roundtrip(Value::from(i64::MAX));
        roundtrip(Value::from(u64::MAX));
        roundtrip(Value::from(3.0));
        roundtrip(Value::from(0.1));
        roundtrip(Value::from(-1.5e-9));
        roundtrip(Value::from(1e300));
        roundtrip(Value::Number(Number::Infinity));
        roundtrip(Value::Number(Number::NaN));
    }

    #[test]
    fn test_integer_and_float_are_distinct() {
        assert_eq!(decode_scalar("3", None).unwrap(), Value::from(3));
        assert_eq!(decode_scalar("3.0", None).unwrap(), Value::from(3.0));
        assert_ne!(decode_scalar("3", None).unwrap(), Value::from(3.0));
    }

    #[test]
    fn test_numeric_grammar() {
        assert!(looks_numeric("0"));
        assert!(looks_numeric("-12.50"));
        assert!(looks_numeric("6.02E+23"));
        assert!(looks_numeric("007"));
        assert!(!looks_numeric("-"));
        assert!(!looks_numeric("1."));
        assert!(!looks_numeric(".5"));
        assert!(!looks_numeric("1e"));
        assert!(!looks_numeric("inf"));
        assert!(!looks_numeric("27010KT"));
        // Strings rust would parse as floats but the grammar rejects stay raw.
        assert_eq!(decode_scalar("inf", None).unwrap(), Value::from("inf"));
    }

    #[test]
    fn test_control_characters_escape() {
        let s = "bell\u{7}nul\0";
        let token = encode_scalar(&Value::from(s)).unwrap();
        assert_eq!(token, "\"bell\\u0007nul\\0\"");
        roundtrip(Value::from(s));
    }

    #[test]
    fn test_malformed_tokens() {
        for bad in ["a,b", "ab\"c", "\"open", "\"x\"y", "\"bad \\q escape\""] {
            assert!(
                matches!(decode_scalar(bad, None), Err(Error::MalformedRow { .. })),
                "{:?} should be malformed",
                bad
            );
        }
    }

    #[test]
    fn test_legacy_escaped_delimiter() {
        assert_eq!(
            decode_scalar("Shibpur (Diglipur\\, A&N Islands)", None).unwrap(),
            Value::from("Shibpur (Diglipur, A&N Islands)")
        );
    }

    #[test]
    fn test_expected_kind() {
        assert_eq!(
            decode_scalar("true", Some(ScalarKind::String)).unwrap(),
            Value::from("true")
        );
        assert_eq!(
            decode_scalar("", Some(ScalarKind::Number)).unwrap(),
            Value::Null
        );
        assert_eq!(
            decode_scalar("12", Some(ScalarKind::Number)).unwrap(),
            Value::from(12)
        );
        assert!(matches!(
            decode_scalar("yes", Some(ScalarKind::Bool)),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_split_fields_keeps_trailing_empty_field() {
        assert_eq!(split_fields("VAAM,Amravati,Amravati Airport,"), vec![
            "VAAM",
            "Amravati",
            "Amravati Airport",
            ""
        ]);
        assert_eq!(split_fields(""), vec![""]);
        assert_eq!(split_fields(",,"), vec!["", "", ""]);
    }

    #[test]
    fn test_split_fields_respects_quotes_and_escapes() {
        assert_eq!(
            split_fields("VODX,\"Shibpur (Diglipur, A&N Islands)\",x"),
            vec!["VODX", "\"Shibpur (Diglipur, A&N Islands)\"", "x"]
        );
        assert_eq!(
            split_fields("VODX,Shibpur (Diglipur\\, A&N Islands),x"),
            vec!["VODX", "Shibpur (Diglipur\\, A&N Islands)", "x"]
        );
        assert_eq!(split_fields("\"a\\\",b\",c"), vec!["\"a\\\",b\"", "c"]);
    }

    #[test]
    fn test_find_unquoted() {
        assert_eq!(find_unquoted("key:value", ':'), Some(3));
        assert_eq!(find_unquoted("\"a:b\":c", ':'), Some(5));
        assert_eq!(find_unquoted("\"10:30\",x", ':'), None);
    }

    #[test]
    fn test_key_quoting() {
        assert!(!key_needs_quotes("stationICAO"));
        assert!(!key_needs_quotes("0"));
        assert!(!key_needs_quotes("_id"));
        for k in ["", "a:b", "a[0]", "{x}", "a,b", " pad", "q\"k"] {
            assert!(key_needs_quotes(k), "{:?}", k);
        }
        let mut out = String::new();
        write_key(&mut out, "a:b");
        assert_eq!(out, "\"a:b\"");
    }
}
