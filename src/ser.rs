//! Encoding: documents to text, and Rust values to documents.
//!
//! [`Encoder`] lays out a [`Value`] line by line:
//!
//! - `key:token` for scalars,
//! - `key:` followed by deeper lines for objects (`key:{}` when empty),
//! - a tabular block for arrays of same-shaped records,
//! - `key[N]:a,b,c` for arrays of scalars,
//! - `key[N]:` followed by entries `0` to `N-1` for every other array.
//!
//! [`ToonValueSerializer`] turns any `T: Serialize` into a [`Value`] so the
//! same encoder handles derived types.
//!
//! ```rust
//! use toon_legend::{encode, toon};
//!
//! let doc = toon!({
//!     "stationICAO": "VABB",
//!     "metar": {
//!         "decodedData": {
//!             "observation": { "cloudLayers": ["FEW018", "SCT100"] }
//!         }
//!     }
//! });
//!
//! assert_eq!(
//!     encode(&doc).unwrap(),
//!     "stationICAO:VABB\nmetar:\n  decodedData:\n    observation:\n      cloudLayers[2]:FEW018,SCT100"
//! );
//! ```

use crate::legend::Legend;
use crate::options::DEFAULT_MAX_DEPTH;
use crate::scalar::{write_key, write_scalar, DELIMITER, KEY_SEPARATOR};
use crate::tabular::TabularBlock;
use crate::{Error, Number, Result, ToonMap, ToonOptions, Value};
use serde::{ser, Serialize};

/// Writes a document as indented lines.
///
/// One encoder is used per document; the legend must have been built from
/// the same document (or be empty).
pub struct Encoder<'a> {
    output: String,
    indent_width: usize,
    max_depth: usize,
    legend: &'a Legend,
    tables: usize,
    started: bool,
}

impl<'a> Encoder<'a> {
    pub fn new(options: &ToonOptions, legend: &'a Legend) -> Self {
        Encoder {
            output: String::with_capacity(256),
            indent_width: options.indent.max(1),
            max_depth: options.max_depth,
            legend,
            tables: 0,
            started: false,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Tabular blocks written so far.
    #[must_use]
    pub fn tables(&self) -> usize {
        self.tables
    }

    /// Writes the legend line (when non-empty) and the root value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CyclicStructure`] if the document nests deeper than
    /// the configured bound.
    pub fn encode_document(&mut self, doc: &Value) -> Result<()> {
        if !self.legend.is_empty() {
            self.legend.write(&mut self.output);
            self.started = true;
        }
        self.write_entry(None, doc, 0, 0)
    }

    fn start_line(&mut self, indent: usize) {
        if self.started {
            self.output.push('\n');
        }
        self.started = true;
        self.output.extend(std::iter::repeat(' ').take(indent));
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth >= self.max_depth {
            return Err(Error::CyclicStructure {
                depth: self.max_depth,
            });
        }
        Ok(())
    }

    fn write_label(&mut self, key: Option<&str>) {
        if let Some(key) = key {
            write_key(&mut self.output, key);
        }
    }

    /// Writes one entry. `key` is `None` only for the root value, whose
    /// object entries stay at `indent` instead of nesting.
    ///
    /// `depth` counts the containers enclosing `value`.
    pub fn write_entry(
        &mut self,
        key: Option<&str>,
        value: &Value,
        indent: usize,
        depth: usize,
    ) -> Result<()> {
        match value {
            Value::Array(items) => self.write_array(key, items, indent, depth),
            Value::Object(map) => {
                self.check_depth(depth)?;
                if map.is_empty() {
                    self.start_line(indent);
                    self.write_label(key);
                    if key.is_some() {
                        self.output.push(KEY_SEPARATOR);
                    }
                    self.output.push_str("{}");
                    return Ok(());
                }
                match key {
                    Some(key) => {
                        self.start_line(indent);
                        write_key(&mut self.output, key);
                        self.output.push(KEY_SEPARATOR);
                        self.write_entries(map, indent + self.indent_width, depth + 1)
                    }
                    None => self.write_entries(map, indent, depth + 1),
                }
            }
            scalar => {
                self.start_line(indent);
                if key.is_some() {
                    self.write_label(key);
                    self.output.push(KEY_SEPARATOR);
                }
                write_scalar(&mut self.output, scalar)
            }
        }
    }

    fn write_entries(&mut self, map: &ToonMap, indent: usize, depth: usize) -> Result<()> {
        for (key, value) in map {
            self.write_entry(Some(key), value, indent, depth)?;
        }
        Ok(())
    }

    fn write_array(
        &mut self,
        key: Option<&str>,
        items: &[Value],
        indent: usize,
        depth: usize,
    ) -> Result<()> {
        self.check_depth(depth)?;

        if let Some(block) = TabularBlock::from_array(key, items) {
            self.check_depth(depth + 1)?;
            self.start_line(indent);
            block.write(&mut self.output, indent, self.legend)?;
            self.tables += 1;
            return Ok(());
        }

        self.start_line(indent);
        self.write_label(key);
        self.output.push('[');
        self.output.push_str(&items.len().to_string());
        self.output.push_str("]:");

        if items.iter().all(Value::is_scalar) {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    self.output.push(DELIMITER);
                }
                write_scalar(&mut self.output, item)?;
            }
            return Ok(());
        }

        let child_indent = indent + self.indent_width;
        for (i, item) in items.iter().enumerate() {
            self.write_entry(Some(&i.to_string()), item, child_indent, depth + 1)?;
        }
        Ok(())
    }
}

/// Encodes a single entry at `indent` spaces with the default layout.
///
/// ```rust
/// use toon_legend::legend::Legend;
/// use toon_legend::ser::encode_node;
/// use toon_legend::toon;
///
/// let tempo = toon!({ "visibility": 3000, "weather": null });
/// let text = encode_node(Some("tempoSection"), &tempo, 2, &Legend::new()).unwrap();
/// assert_eq!(text, "  tempoSection:\n    visibility:3000\n    weather:");
/// ```
///
/// # Errors
///
/// Returns [`Error::CyclicStructure`] past the default depth bound.
pub fn encode_node(
    key: Option<&str>,
    value: &Value,
    indent: usize,
    legend: &Legend,
) -> Result<String> {
    let options = ToonOptions::default();
    let mut encoder = Encoder::new(&options, legend);
    encoder.write_entry(key, value, indent, 0)?;
    Ok(encoder.into_inner())
}

/// Serializer whose output is a [`Value`].
///
/// Nesting is bounded; a `Serialize` impl that recurses without end fails
/// with [`Error::CyclicStructure`] instead of exhausting the stack.
#[derive(Clone, Copy, Debug)]
pub struct ToonValueSerializer {
    depth: usize,
    max_depth: usize,
}

impl Default for ToonValueSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl ToonValueSerializer {
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        ToonValueSerializer {
            depth: 0,
            max_depth,
        }
    }

    fn nested(self) -> Result<Self> {
        if self.depth >= self.max_depth {
            return Err(Error::CyclicStructure {
                depth: self.max_depth,
            });
        }
        Ok(ToonValueSerializer {
            depth: self.depth + 1,
            max_depth: self.max_depth,
        })
    }
}

pub struct SerializeVec {
    vec: Vec<Value>,
    variant: Option<&'static str>,
    child: ToonValueSerializer,
}

pub struct SerializeMap {
    map: ToonMap,
    current_key: Option<String>,
    variant: Option<&'static str>,
    child: ToonValueSerializer,
}

fn tagged(variant: Option<&'static str>, value: Value) -> Value {
    match variant {
        Some(name) => {
            let mut map = ToonMap::with_capacity(1);
            map.insert(name.to_string(), value);
            Value::Object(map)
        }
        None => value,
    }
}

impl ser::Serializer for ToonValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Array(v.iter().map(|&b| Value::from(b)).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let inner = value.serialize(self.nested()?)?;
        Ok(tagged(Some(variant), inner))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        SerializeVec::new(self, len.unwrap_or(0), None)
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        SerializeVec::new(self, len, None)
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        SerializeVec::new(self, len, None)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        SerializeVec::new(self.nested()?, len, Some(variant))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        SerializeMap::new(self, len.unwrap_or(0), None)
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        SerializeMap::new(self, len, None)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeMap> {
        SerializeMap::new(self.nested()?, len, Some(variant))
    }
}

impl SerializeVec {
    fn new(
        parent: ToonValueSerializer,
        len: usize,
        variant: Option<&'static str>,
    ) -> Result<Self> {
        Ok(SerializeVec {
            vec: Vec::with_capacity(len),
            variant,
            child: parent.nested()?,
        })
    }

    fn push<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(value.serialize(self.child)?);
        Ok(())
    }

    fn finish(self) -> Value {
        tagged(self.variant, Value::Array(self.vec))
    }
}

impl SerializeMap {
    fn new(
        parent: ToonValueSerializer,
        len: usize,
        variant: Option<&'static str>,
    ) -> Result<Self> {
        Ok(SerializeMap {
            map: ToonMap::with_capacity(len),
            current_key: None,
            variant,
            child: parent.nested()?,
        })
    }

    fn finish(self) -> Value {
        tagged(self.variant, Value::Object(self.map))
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = match key.serialize(self.child)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(Error::custom(format!(
                    "map keys must be strings, numbers or booleans, found {}",
                    other.kind_name()
                )))
            }
        };
        self.current_key = Some(key);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, value.serialize(self.child)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), value.serialize(self.child)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), value.serialize(self.child)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}
