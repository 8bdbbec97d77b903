//! Decoding: text to documents, and documents to Rust values.
//!
//! [`Deserializer`] reads the text line by line. Indentation decides nesting,
//! and the child indentation of a block is whatever its first child line
//! uses, so text written with any indent width decodes the same way.
//!
//! Line shapes:
//!
//! | Line | Meaning |
//! |------|---------|
//! | `legend:{a:key,...}` | alias table, first line only |
//! | `key:token` | scalar entry |
//! | `key:` | nested object when deeper lines follow, otherwise `null` |
//! | `key:{}` | empty object |
//! | `key[N]{c1,c2}:` | tabular block, N rows follow |
//! | `key[N]:t1,t2` | array of scalars |
//! | `key[N]:` | indexed block, entries `0` to `N-1` follow one level deeper |
//!
//! ```rust
//! use toon_legend::{decode, toon};
//!
//! let text = "legend:{i:icao,t:iata}\nairports[2]{i,t}:\nVABB,BOM\nVAAM,";
//! assert_eq!(
//!     decode(text).unwrap(),
//!     toon!({
//!         "airports": [
//!             { "icao": "VABB", "iata": "BOM" },
//!             { "icao": "VAAM", "iata": null }
//!         ]
//!     })
//! );
//! ```

use crate::legend::{parse_id, Legend};
use crate::options::DEFAULT_MAX_DEPTH;
use crate::scalar::{find_unquoted, parse_quoted, parse_token, split_fields, KEY_SEPARATOR};
use crate::tabular::{read_rows, TabularHeader};
use crate::{Error, Number, Result, ToonMap, Value};
use serde::de::IntoDeserializer;
use serde::{de, forward_to_deserialize_any};

/// One input line, split into indentation and content.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Line<'a> {
    /// 1-based line number.
    pub number: usize,
    /// Leading spaces.
    pub indent: usize,
    /// Content with indentation and trailing whitespace removed.
    pub text: &'a str,
}

impl<'a> Line<'a> {
    pub(crate) fn parse(number: usize, raw: &'a str) -> Result<Line<'a>> {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let content = raw.trim_start_matches(' ');
        let indent = raw.len() - content.len();
        let text = content.trim_end();
        if content.starts_with('\t') && !text.is_empty() {
            let found = raw.len() - raw.trim_start().len();
            return Err(Error::indentation_error(number, indent + 1, indent, found, raw));
        }
        Ok(Line {
            number,
            indent,
            text,
        })
    }

    #[inline]
    pub(crate) fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// What a non-row line declares.
#[derive(Debug, PartialEq)]
pub(crate) enum LineKind<'a> {
    /// `key:rest`
    Field { key: String, rest: &'a str },
    /// `key[count]{columns}:rest`; `key` is `None` for a root array.
    Header {
        key: Option<String>,
        count: usize,
        columns: Option<Vec<String>>,
        rest: &'a str,
    },
    /// No unquoted `:`; a root scalar or a table row.
    Scalar,
}

/// Classifies a line by its key part.
pub(crate) fn classify(text: &str) -> std::result::Result<LineKind<'_>, String> {
    let Some(colon) = find_unquoted(text, KEY_SEPARATOR) else {
        return Ok(LineKind::Scalar);
    };

    if text.starts_with('"') {
        let (key, used) = parse_quoted(text)?;
        let rest = &text[used..];
        return if let Some(rest) = rest.strip_prefix(KEY_SEPARATOR) {
            Ok(LineKind::Field { key, rest })
        } else if rest.starts_with('[') {
            parse_header(Some(key), rest)
        } else {
            Err("expected ':' or '[' after quoted key".to_string())
        };
    }

    match text[..colon].find('[') {
        Some(0) => parse_header(None, text),
        Some(bracket) => parse_header(Some(text[..bracket].trim_end().to_string()), &text[bracket..]),
        None => {
            let key = text[..colon].trim_end();
            if key.is_empty() {
                return Err("missing key before ':'".to_string());
            }
            Ok(LineKind::Field {
                key: key.to_string(),
                rest: &text[colon + 1..],
            })
        }
    }
}

/// Parses `[count]{columns}:rest`, starting at `[`.
fn parse_header(key: Option<String>, text: &str) -> std::result::Result<LineKind<'_>, String> {
    let close = text
        .find(']')
        .ok_or_else(|| "unclosed '[' in array header".to_string())?;
    let count = text[1..close]
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid array length '{}'", &text[1..close]))?;

    let mut after = &text[close + 1..];
    let columns = if after.starts_with('{') {
        let end = find_unquoted(after, '}').ok_or_else(|| "unclosed '{' in header".to_string())?;
        let columns = split_fields(&after[1..end])
            .into_iter()
            .map(parse_id)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        after = &after[end + 1..];
        Some(columns)
    } else {
        None
    };

    let rest = after
        .strip_prefix(KEY_SEPARATOR)
        .ok_or_else(|| "expected ':' after array header".to_string())?;
    if columns.is_some() && !rest.trim().is_empty() {
        return Err("unexpected text after tabular header".to_string());
    }
    Ok(LineKind::Header {
        key,
        count,
        columns,
        rest,
    })
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// Line-based TOON decoder.
pub struct Deserializer<'de> {
    lines: Vec<Line<'de>>,
    pos: usize,
    legend: Legend,
    max_depth: usize,
}

impl<'de> Deserializer<'de> {
    /// Splits `input` into lines.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndentationError`] for a tab in indentation.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'de str) -> Result<Self> {
        let lines = input
            .split('\n')
            .enumerate()
            .map(|(i, raw)| Line::parse(i + 1, raw))
            .collect::<Result<Vec<_>>>()?;
        Ok(Deserializer {
            lines,
            pos: 0,
            legend: Legend::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    /// Sets the nesting bound.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The legend read from the input, empty until a document is decoded.
    #[must_use]
    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    /// Skips blank lines and returns the next content line without consuming it.
    fn next_content(&mut self) -> Option<Line<'de>> {
        while self.lines.get(self.pos).is_some_and(Line::is_blank) {
            self.pos += 1;
        }
        self.lines.get(self.pos).copied()
    }

    fn syntax(line: &Line<'_>, msg: &str) -> Error {
        Error::syntax_with_context(line.number, line.indent + 1, msg, line.text, None)
    }

    fn check_depth(&self, depth: usize, line: &Line<'_>) -> Result<()> {
        if depth >= self.max_depth {
            return Err(Self::syntax(
                line,
                &format!("nesting exceeds {} levels", self.max_depth),
            ));
        }
        Ok(())
    }

    /// Decodes the whole input.
    ///
    /// # Errors
    ///
    /// Any decode error; nothing is returned for partially valid input.
    pub fn decode_document(&mut self) -> Result<Value> {
        let Some(first) = self.next_content() else {
            return Ok(Value::Null);
        };
        if first.indent == 0 && Legend::is_legend_line(first.text) {
            self.legend = Legend::parse(first.text, first.number)?;
            self.pos += 1;
        }

        let Some(first) = self.next_content() else {
            return Ok(Value::Null);
        };
        if first.indent != 0 {
            return Err(Error::indentation_error(
                first.number,
                first.indent + 1,
                0,
                first.indent,
                first.text,
            ));
        }

        let value = if first.text == "{}" {
            self.pos += 1;
            Value::Object(ToonMap::new())
        } else {
            match classify(first.text).map_err(|msg| Self::syntax(&first, &msg))? {
                LineKind::Scalar => {
                    self.pos += 1;
                    parse_token(first.text)
                        .map_err(|msg| Error::malformed_row("", first.number, &msg))?
                }
                LineKind::Header {
                    key: None,
                    count,
                    columns,
                    rest,
                } => {
                    self.pos += 1;
                    self.decode_array("", &first, count, columns, rest, 0)?
                }
                _ => self.decode_object(0, "", 0)?,
            }
        };

        if let Some(extra) = self.next_content() {
            return Err(Error::syntax_with_context(
                extra.number,
                extra.indent + 1,
                "unexpected content after the document",
                extra.text,
                Some("a document has a single root value"),
            ));
        }
        Ok(value)
    }

    /// Decodes the entries of one object whose lines sit at `indent`.
    fn decode_object(&mut self, indent: usize, path: &str, depth: usize) -> Result<Value> {
        let mut map = ToonMap::new();
        if let Some(line) = self.next_content() {
            self.check_depth(depth, &line)?;
        }

        while let Some(line) = self.next_content() {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(Error::indentation_error(
                    line.number,
                    line.indent + 1,
                    indent,
                    line.indent,
                    line.text,
                ));
            }
            let (key, value) = self.decode_entry(line, path, depth)?;
            if map.contains_key(&key) {
                return Err(Self::syntax(&line, &format!("duplicate key '{}'", key)));
            }
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }

    /// Decodes one `key...` entry. `depth` is the depth of the enclosing
    /// container.
    fn decode_entry(&mut self, line: Line<'de>, parent: &str, depth: usize) -> Result<(String, Value)> {
        let kind = classify(line.text).map_err(|msg| Self::syntax(&line, &msg))?;
        self.pos += 1;
        match kind {
            LineKind::Field { key, rest } => {
                let path = child_path(parent, &key);
                let value = self.decode_field_value(&line, &path, rest, depth + 1)?;
                Ok((key, value))
            }
            LineKind::Header {
                key: Some(key),
                count,
                columns,
                rest,
            } => {
                let path = child_path(parent, &key);
                let value = self.decode_array(&path, &line, count, columns, rest, depth + 1)?;
                Ok((key, value))
            }
            LineKind::Header { key: None, .. } => Err(Error::syntax_with_context(
                line.number,
                line.indent + 1,
                "array header without a key",
                line.text,
                Some("only the root value may be a bare '[N]' array"),
            )),
            LineKind::Scalar => Err(Error::syntax_with_context(
                line.number,
                line.indent + 1,
                "expected 'key:value'",
                line.text,
                Some("object entries are written as key:value"),
            )),
        }
    }

    fn decode_field_value(
        &mut self,
        line: &Line<'de>,
        path: &str,
        rest: &str,
        depth: usize,
    ) -> Result<Value> {
        let rest = rest.trim();
        if rest.is_empty() {
            return match self.next_content() {
                Some(next) if next.indent > line.indent => self.decode_object(next.indent, path, depth),
                _ => Ok(Value::Null),
            };
        }
        if rest == "{}" {
            return Ok(Value::Object(ToonMap::new()));
        }
        parse_token(rest).map_err(|msg| Error::malformed_row(path, line.number, &msg))
    }

    fn decode_array(
        &mut self,
        path: &str,
        line: &Line<'de>,
        count: usize,
        columns: Option<Vec<String>>,
        rest: &str,
        depth: usize,
    ) -> Result<Value> {
        self.check_depth(depth, line)?;

        if let Some(columns) = columns {
            self.check_depth(depth + 1, line)?;
            let header = TabularHeader {
                path: None,
                count,
                columns,
            };
            let keys = header.resolve_columns(&self.legend, line.number)?;
            let (records, consumed) = read_rows(&self.lines[self.pos..], line, path, &keys, count)?;
            self.pos += consumed;
            return Ok(Value::Array(records));
        }

        let rest = rest.trim();
        if rest.is_empty() {
            if count == 0 {
                return Ok(Value::Array(Vec::new()));
            }
            return match self.next_content() {
                Some(next) if next.indent > line.indent => {
                    self.decode_indexed(path, line, count, next.indent, depth)
                }
                _ if count == 1 => Ok(Value::Array(vec![Value::Null])),
                _ => Err(Error::UnterminatedBlock {
                    path: path.to_string(),
                    line: line.number,
                    expected: count,
                    found: 0,
                }),
            };
        }

        let fields = split_fields(rest);
        if count == 0 || fields.len() != count {
            return Err(Error::ColumnCountMismatch {
                path: path.to_string(),
                line: line.number,
                expected: count,
                found: fields.len(),
            });
        }
        fields
            .into_iter()
            .map(|field| {
                parse_token(field).map_err(|msg| Error::malformed_row(path, line.number, &msg))
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn decode_indexed(
        &mut self,
        path: &str,
        header: &Line<'de>,
        count: usize,
        child_indent: usize,
        depth: usize,
    ) -> Result<Value> {
        let mut items = Vec::with_capacity(count.min(self.lines.len() - self.pos));
        while items.len() < count {
            let Some(line) = self.next_content() else {
                break;
            };
            if line.indent < child_indent {
                break;
            }
            if line.indent > child_indent {
                return Err(Error::indentation_error(
                    line.number,
                    line.indent + 1,
                    child_indent,
                    line.indent,
                    line.text,
                ));
            }
            let expected = items.len().to_string();
            let (key, value) = self.decode_entry(line, path, depth)?;
            if key != expected {
                return Err(Self::syntax(
                    &line,
                    &format!("expected entry '{}' of '{}', found '{}'", expected, path, key),
                ));
            }
            items.push(value);
        }

        if items.len() < count {
            return Err(Error::UnterminatedBlock {
                path: path.to_string(),
                line: header.number,
                expected: count,
                found: items.len(),
            });
        }
        if let Some(next) = self.next_content() {
            if next.indent == child_indent {
                return Err(Self::syntax(
                    &next,
                    &format!("'{}' declares {} entries, found more", path, count),
                ));
            }
        }
        Ok(Value::Array(items))
    }
}

/// Decodes the object whose entries start at `lines[0]`, indented by
/// `indent` spaces, and returns it with the number of lines consumed.
///
/// Decoding stops at the first line indented less than `indent`.
///
/// ```rust
/// use toon_legend::de::decode_node;
/// use toon_legend::legend::Legend;
/// use toon_legend::toon;
///
/// let lines = ["  visibility:3000", "  weather:", "next:1"];
/// let (value, consumed) = decode_node(&lines, 2, &Legend::new()).unwrap();
/// assert_eq!(value, toon!({ "visibility": 3000, "weather": null }));
/// assert_eq!(consumed, 2);
/// ```
///
/// # Errors
///
/// Any decode error.
pub fn decode_node(lines: &[&str], indent: usize, legend: &Legend) -> Result<(Value, usize)> {
    let lines = lines
        .iter()
        .enumerate()
        .map(|(i, raw)| Line::parse(i + 1, raw))
        .collect::<Result<Vec<_>>>()?;
    let mut de = Deserializer {
        lines,
        pos: 0,
        legend: legend.clone(),
        max_depth: DEFAULT_MAX_DEPTH,
    };
    let value = de.decode_object(indent, "", 0)?;
    Ok((value, de.pos))
}

impl<'de> de::Deserializer<'de> for &mut Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        ValueDeserializer::new(self.decode_document()?).deserialize_any(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        ValueDeserializer::new(self.decode_document()?).deserialize_option(visitor)
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        ValueDeserializer::new(self.decode_document()?).deserialize_newtype_struct(name, visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        ValueDeserializer::new(self.decode_document()?).deserialize_enum(name, variants, visitor)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(map: ToonMap) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(Value::String(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(Value::String(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(Value::Null) | None => Ok(()),
            _ => Err(Error::custom("expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Array(arr)) => visitor.visit_seq(SeqDeserializer::new(arr)),
            _ => Err(Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Object(obj)) => visitor.visit_map(MapDeserializer::new(obj)),
            _ => Err(Error::custom("expected struct variant")),
        }
    }
}

/// Deserializes Rust values out of an owned [`Value`].
pub(crate) struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    pub(crate) fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(Number::Integer(i)) => visitor.visit_i64(i),
            Value::Number(Number::Float(f)) => visitor.visit_f64(f),
            Value::Number(Number::BigInt(b)) => {
                if let Ok(i) = i128::try_from(&b) {
                    visitor.visit_i128(i)
                } else if let Ok(u) = u128::try_from(&b) {
                    visitor.visit_u128(u)
                } else {
                    visitor.visit_string(b.to_string())
                }
            }
            Value::Number(Number::Infinity) => visitor.visit_f64(f64::INFINITY),
            Value::Number(Number::NegativeInfinity) => visitor.visit_f64(f64::NEG_INFINITY),
            Value::Number(Number::NaN) => visitor.visit_f64(f64::NAN),
            Value::String(s) => visitor.visit_string(s),
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr)),
            Value::Object(obj) => visitor.visit_map(MapDeserializer::new(obj)),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            value => visitor.visit_some(ValueDeserializer::new(value)),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_enum(s.into_deserializer()),
            Value::Object(obj) if obj.len() == 1 => {
                let mut entries = obj.into_iter();
                match entries.next() {
                    Some((variant, value)) => visitor.visit_enum(EnumDeserializer {
                        variant,
                        value: Some(value),
                    }),
                    None => Err(Error::custom("expected enum variant")),
                }
            }
            other => Err(Error::type_mismatch("enum", other.kind_name())),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}
