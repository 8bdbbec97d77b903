//! # toon_legend
//!
//! A reversible, token-efficient text codec for putting structured data into
//! LLM prompts.
//!
//! ## What it does
//!
//! Query results are mostly lists of records that share one layout, plus some
//! nesting around them. JSON repeats every key for every record; this codec
//! writes the keys once:
//!
//! - **Tabular blocks**: an array of same-shaped records becomes one header
//!   line and one comma-separated row per record.
//! - **Legend**: column keys are shortened to aliases declared once on the
//!   first line.
//! - **Indentation nesting**: objects nest by indentation, with no braces or
//!   quotes unless a value would otherwise be ambiguous.
//! - **Exact round trip**: `decode(encode(d)) == d` for every document,
//!   including embedded commas, empty trailing fields and `null` leaves.
//!
//! ## Quick Start
//!
//! ```rust
//! use toon_legend::{decode, encode, toon};
//!
//! let doc = toon!({
//!     "airports": [
//!         { "icao": "VABB", "city": "Mumbai", "iata": "BOM" },
//!         { "icao": "VODX", "city": "Shibpur (Diglipur, A&N Islands)", "iata": null }
//!     ]
//! });
//!
//! let text = encode(&doc).unwrap();
//! assert_eq!(
//!     text,
//!     "legend:{i:icao,c:city,ia:iata}\n\
//!      airports[2]{i,c,ia}:\n\
//!      VABB,Mumbai,BOM\n\
//!      VODX,\"Shibpur (Diglipur, A&N Islands)\","
//! );
//! assert_eq!(decode(&text).unwrap(), doc);
//! ```
//!
//! ### Serde types
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use toon_legend::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Station {
//!     #[serde(rename = "stationICAO")]
//!     icao: String,
//!     #[serde(rename = "hasMetarData")]
//!     has_metar: bool,
//!     visibility: Option<u32>,
//! }
//!
//! let station = Station { icao: "VABB".into(), has_metar: true, visibility: None };
//! let text = to_string(&station).unwrap();
//! assert_eq!(text, "stationICAO:VABB\nhasMetarData:true\nvisibility:");
//! assert_eq!(from_str::<Station>(&text).unwrap(), station);
//! ```
//!
//! ## Logging
//!
//! Encoding and decoding emit `tracing` events: `debug` for each call with
//! sizes and counts, `trace` for each legend alias and tabular block. No
//! subscriber is installed by the library.
//!
//! ## Modules
//!
//! - [`scalar`]: single values to tokens and back
//! - [`legend`]: alias table for column keys
//! - [`tabular`]: tabular blocks
//! - [`ser`] / [`de`]: nested documents
//! - [`format`]: the wire format, line by line

pub mod de;
pub mod error;
pub mod format;
pub mod legend;
pub mod macros;
pub mod map;
pub mod options;
pub mod scalar;
pub mod ser;
pub mod tabular;
pub mod value;

pub use de::Deserializer;
pub use error::{Error, Result};
pub use legend::Legend;
pub use map::ToonMap;
pub use options::ToonOptions;
pub use ser::{Encoder, ToonValueSerializer};
pub use value::{Number, Value};

use legend::build_legend;
use serde::{Deserialize, Serialize};
use std::io;
use tracing::debug;

/// Encodes a document with the default options.
///
/// # Examples
///
/// ```rust
/// use toon_legend::{encode, toon};
///
/// let doc = toon!({ "tafor": { "rawData": "TAF VABB 0606/0712 27010KT" } });
/// assert_eq!(encode(&doc).unwrap(), "tafor:\n  rawData:TAF VABB 0606/0712 27010KT");
/// ```
///
/// # Errors
///
/// Returns [`Error::CyclicStructure`] if the document nests deeper than the
/// default bound.
pub fn encode(doc: &Value) -> Result<String> {
    encode_with_options(doc, ToonOptions::default())
}

/// Encodes a document with custom options.
///
/// # Errors
///
/// Returns [`Error::CyclicStructure`] if the document nests deeper than
/// `options.max_depth`.
pub fn encode_with_options(doc: &Value, options: ToonOptions) -> Result<String> {
    debug!(
        kind = doc.kind_name(),
        indent = options.indent,
        legend = options.legend,
        "encoding document"
    );

    let legend = if options.legend {
        build_legend(doc)
    } else {
        Legend::new()
    };
    let mut encoder = Encoder::new(&options, &legend);
    encoder.encode_document(doc)?;

    let tables = encoder.tables();
    let text = encoder.into_inner();
    debug!(
        bytes = text.len(),
        tables,
        aliases = legend.len(),
        "encoded document"
    );
    Ok(text)
}

/// Decodes text produced by [`encode`] (or written by hand in the same
/// format).
///
/// # Examples
///
/// ```rust
/// use toon_legend::{decode, toon};
///
/// let doc = decode("stationICAO:VABB\nmetar:\n  firRegion:Mumbai").unwrap();
/// assert_eq!(doc, toon!({ "stationICAO": "VABB", "metar": { "firRegion": "Mumbai" } }));
/// ```
///
/// # Errors
///
/// Any of the decode errors in [`Error`]; each carries the line it refers to.
pub fn decode(text: &str) -> Result<Value> {
    decode_with_options(text, ToonOptions::default())
}

/// Decode TOON text with the nesting bound from `options`.
///
/// Only `max_depth` applies; indentation is inferred from the text and the
/// legend line is read when present. Text written by
/// [`encode_with_options`] decodes with the same options.
///
/// ```rust
/// use toon_legend::{decode_with_options, encode_with_options, toon, ToonOptions};
///
/// let doc = toon!({ "a": { "b": { "c": 1 } } });
/// let options = ToonOptions::new().with_max_depth(2);
/// assert!(encode_with_options(&doc, options.clone()).is_err());
///
/// let text = encode_with_options(&doc, ToonOptions::new()).unwrap();
/// assert!(decode_with_options(&text, options).is_err());
/// assert_eq!(decode_with_options(&text, ToonOptions::new()).unwrap(), doc);
/// ```
///
/// # Errors
///
/// Any of the decode errors in [`Error`]; each carries the line it refers to.
pub fn decode_with_options(text: &str, options: ToonOptions) -> Result<Value> {
    debug!(bytes = text.len(), max_depth = options.max_depth, "decoding document");
    let result = Deserializer::from_str(text)
        .map(|de| de.with_max_depth(options.max_depth))
        .and_then(|mut de| de.decode_document());
    match &result {
        Ok(doc) => debug!(kind = doc.kind_name(), "decoded document"),
        Err(err) => debug!(error = %err, line = ?err.line(), "decode failed"),
    }
    result
}

/// Serialize any `T: Serialize` to TOON text.
///
/// # Examples
///
/// ```rust
/// use toon_legend::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Airport { icao: &'static str, iata: Option<&'static str> }
///
/// let airports = vec![
///     Airport { icao: "VABB", iata: Some("BOM") },
///     Airport { icao: "VAAM", iata: None },
/// ];
/// let toon = to_string(&airports).unwrap();
/// assert_eq!(toon, "legend:{i:icao,ia:iata}\n[2]{i,ia}:\nVABB,BOM\nVAAM,");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, ToonOptions::default())
}

/// Serialize any `T: Serialize` with four-space indentation.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, ToonOptions::pretty())
}

/// Serialize any `T: Serialize` to TOON text with custom options.
///
/// # Examples
///
/// ```rust
/// use toon_legend::{to_string_with_options, ToonOptions};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Row { icao: &'static str }
///
/// let rows = vec![Row { icao: "VABB" }];
/// let toon = to_string_with_options(&rows, ToonOptions::new().with_legend(false)).unwrap();
/// assert_eq!(toon, "[1]{icao}:\nVABB");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized or nests deeper than
/// `options.max_depth`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: ToonOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let doc = value.serialize(ToonValueSerializer::with_max_depth(options.max_depth))?;
    encode_with_options(&doc, options)
}

/// Convert any `T: Serialize` to a [`Value`].
///
/// # Examples
///
/// ```rust
/// use toon_legend::{to_value, Value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value: Value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert!(value.is_object());
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ToonValueSerializer::new())
}

/// Serialize any `T: Serialize` to a writer.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, ToonOptions::default())
}

/// Serialize any `T: Serialize` to a writer with custom options.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: ToonOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let toon_string = to_string_with_options(value, options)?;
    writer
        .write_all(toon_string.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Convert a [`Value`] into any `T: Deserialize`.
///
/// # Examples
///
/// ```rust
/// use toon_legend::{from_value, toon};
///
/// let layers: Vec<String> = from_value(toon!(["FEW018", "SCT100"])).unwrap();
/// assert_eq!(layers, vec!["FEW018", "SCT100"]);
/// ```
///
/// # Errors
///
/// Returns an error if the value does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    T::deserialize(de::ValueDeserializer::new(value))
}

/// Deserialize an instance of type `T` from TOON text.
///
/// # Examples
///
/// ```rust
/// use toon_legend::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x:1\ny:2").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the text is not valid or does not fit `T`. Decode
/// errors carry the offending line.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<'a, T>(s: &'a str) -> Result<T>
where
    T: Deserialize<'a>,
{
    from_str_with_options(s, ToonOptions::default())
}

/// Deserialize an instance of type `T` from TOON text with the nesting
/// bound from `options`.
///
/// # Errors
///
/// Returns an error if the text is not valid, nests deeper than
/// `options.max_depth`, or does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options<'a, T>(s: &'a str, options: ToonOptions) -> Result<T>
where
    T: Deserialize<'a>,
{
    let mut deserializer = Deserializer::from_str(s)?.with_max_depth(options.max_depth);
    T::deserialize(&mut deserializer)
}

/// Deserialize an instance of type `T` from an I/O stream of TOON text.
///
/// # Examples
///
/// ```rust
/// use toon_legend::from_reader;
/// use serde::Deserialize;
/// use std::io::Cursor;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_reader(Cursor::new(b"x:1\ny:2")).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the text is not valid, or it does not
/// fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: for<'de> Deserialize<'de>,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// Deserialize an instance of type `T` from bytes of TOON text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, not valid TOON text,
/// or do not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<'a, T>(v: &'a [u8]) -> Result<T>
where
    T: Deserialize<'a>,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Airport {
        icao: String,
        city: String,
        airport_name: String,
        iata: Option<String>,
    }

    fn airports() -> Vec<Airport> {
        vec![
            Airport {
                icao: "VABB".into(),
                city: "Mumbai".into(),
                airport_name: "Chhatrapati Shivaji Maharaj International Airport".into(),
                iata: Some("BOM".into()),
            },
            Airport {
                icao: "VAAM".into(),
                city: "Amravati".into(),
                airport_name: "Amravati Airport".into(),
                iata: None,
            },
        ]
    }

    #[test]
    fn test_struct_table_round_trip() {
        let rows = airports();
        let toon = to_string(&rows).unwrap();
        assert!(toon.starts_with("legend:{i:icao,c:city,a:airport_name,ia:iata}\n[2]{i,c,a,ia}:"));
        let back: Vec<Airport> = from_str(&toon).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_pretty_and_compact_decode_alike() {
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct Wrapper {
            region: Region,
        }
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct Region {
            name: String,
            airports: Vec<Airport>,
        }

        let value = Wrapper {
            region: Region {
                name: "west".into(),
                airports: airports(),
            },
        };
        let pretty = to_string_pretty(&value).unwrap();
        let compact = to_string_with_options(&value, ToonOptions::compact()).unwrap();
        assert_ne!(pretty, compact);
        assert_eq!(from_str::<Wrapper>(&pretty).unwrap(), value);
        assert_eq!(from_str::<Wrapper>(&compact).unwrap(), value);
    }

    #[test]
    fn test_to_value_and_back() {
        let value = to_value(&airports()).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
        let back: Vec<Airport> = from_value(value).unwrap();
        assert_eq!(back, airports());
    }

    #[test]
    fn test_writer_and_reader() {
        let mut buffer = Vec::new();
        to_writer(&mut buffer, &airports()).unwrap();
        let back: Vec<Airport> = from_reader(buffer.as_slice()).unwrap();
        assert_eq!(back, airports());
        let back: Vec<Airport> = from_slice(&buffer).unwrap();
        assert_eq!(back, airports());
    }

    #[test]
    fn test_display_matches_encode() {
        let doc = to_value(&airports()).unwrap();
        assert_eq!(doc.to_string(), encode(&doc).unwrap());
    }

    #[test]
    fn test_legend_disabled_writes_full_keys() {
        let doc = to_value(&airports()).unwrap();
        let text = encode_with_options(&doc, ToonOptions::new().with_legend(false)).unwrap();
        assert!(text.starts_with("[2]{icao,city,airport_name,iata}:"));
        assert_eq!(decode(&text).unwrap(), doc);
    }

    #[test]
    fn test_enums_round_trip() {
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        enum Sky {
            Clear,
            Layers(Vec<String>),
            Vertical { feet: u32 },
        }

        for sky in [
            Sky::Clear,
            Sky::Layers(vec!["FEW018".into(), "SCT100".into()]),
            Sky::Vertical { feet: 300 },
        ] {
            let toon = to_string(&sky).unwrap();
            assert_eq!(from_str::<Sky>(&toon).unwrap(), sky);
        }
    }
}
