//! Wire format reference
//!
//! This module documents the text layout written by [`encode`](crate::encode)
//! and accepted by [`decode`](crate::decode).
//!
//! # Overview
//!
//! A document is a tree of objects, arrays and scalars. The text is a list of
//! lines; nesting is expressed by leading spaces only. Arrays of same-shaped
//! records collapse into tabular blocks, and the keys of those blocks are
//! shortened through a legend declared on the first line.
//!
//! ```text
//! legend:{i:icao,c:city,a:airport_name,ia:iata}
//! airports[3]{i,c,a,ia}:
//! VABB,Mumbai,Chhatrapati Shivaji Maharaj International Airport,BOM
//! VAAM,Amravati,Amravati Airport,
//! VODX,"Shibpur (Diglipur, A&N Islands)",Shibpur Airport,
//! ```
//!
//! # Lines
//!
//! - Lines end in `\n`; `\r\n` is accepted.
//! - Indentation is spaces only. A tab in the indentation is an
//!   [`IndentationError`](crate::Error::IndentationError).
//! - The encoder uses [`ToonOptions::indent`](crate::ToonOptions) spaces per
//!   level (2 by default). The decoder only compares indents, so any
//!   consistent width decodes.
//! - Blank lines between entries are ignored.
//!
//! # Scalars
//!
//! | Value | Token | Example |
//! |-------|-------|---------|
//! | Null | empty | `weather:` |
//! | Boolean | `true` / `false` | `hasMetarData:true` |
//! | Integer | decimal digits, optional `-` | `visibility:3000` |
//! | Float | shortest exact form, always with `.` or an exponent | `altimeter:1013.0` |
//! | Special numbers | `Infinity`, `-Infinity`, `NaN` | `ceiling:Infinity` |
//! | String | raw, or `"quoted"` | `city:Mumbai` |
//!
//! Integers outside the 64-bit range are written in full and decode back to
//! the same big integer.
//!
//! Strings are written raw unless the raw text would read back differently.
//! They are quoted when they:
//!
//! - are empty, or start or end with whitespace,
//! - contain `,` `:` `"` `\` or a control character,
//! - start with `{`,
//! - read as `true`, `false`, `Infinity`, `-Infinity`, `NaN` or a number.
//!
//! `null`, `Null` and `DateTime (ISO 8601)` are ordinary strings and stay
//! raw.
//!
//! **Escapes** inside quotes:
//!
//! ```text
//! \"  quote
//! \\  backslash
//! \n  newline
//! \r  carriage return
//! \t  tab
//! \b  backspace
//! \f  form feed
//! \0  NUL
//! \,  comma
//! \uXXXX  code point, 4 hex digits
//! ```
//!
//! Outside quotes, `\,` stands for a literal comma. The encoder never writes
//! it, but older payloads use it in table rows:
//!
//! ```rust
//! use toon_legend::decode;
//!
//! let doc = decode("[1]{icao,city}:\nVODX,Shibpur (Diglipur\\, A&N Islands)").unwrap();
//! assert_eq!(
//!     doc.pointer("0.city").and_then(|v| v.as_str()),
//!     Some("Shibpur (Diglipur, A&N Islands)")
//! );
//! ```
//!
//! # Keys
//!
//! A key is written raw unless it is empty, has leading or trailing
//! whitespace, or contains one of `, : " \ [ ] { }` or a control character;
//! then it is quoted with the escapes above.
//!
//! # Objects
//!
//! ```text
//! stationICAO:VABB
//! metar:
//!   firRegion:Mumbai
//!   decodedData:
//!     observation:
//!       visibility:3000
//!       weather:
//! remarks:{}
//! ```
//!
//! - `key:token` is a scalar entry; there is no space after the colon.
//! - `key:` followed by deeper lines is a nested object.
//! - `key:` with nothing deeper is `Null`.
//! - `key:{}` is an empty object.
//! - Keys within one object are unique; a repeated key is a
//!   [`Syntax`](crate::Error::Syntax) error.
//!
//! # Arrays
//!
//! Every array header carries its length in brackets. The length is checked
//! on decode.
//!
//! ## Inline arrays
//!
//! Arrays whose items are all scalars:
//!
//! ```text
//! cloudLayers[2]:FEW018,SCT100
//! gaps[3]:,1,
//! none[0]:
//! ```
//!
//! `key[1]:` with nothing deeper holds a single `Null`.
//!
//! ## Indexed blocks
//!
//! Every other non-tabular array lists its items one level deeper, keyed by
//! position:
//!
//! ```text
//! mixed[3]:
//!   0:1
//!   1:
//!     a:2
//!   2[2]:3,4
//! ```
//!
//! Entries must appear in order `0` to `N-1`. A missing entry is an
//! [`UnterminatedBlock`](crate::Error::UnterminatedBlock) error.
//!
//! ## Tabular blocks
//!
//! An array is tabular when it is non-empty, every item is an object with the
//! same keys in the same order, that key list is not empty, and every value is
//! a scalar.
//!
//! ```text
//! airports[2]{icao,iata}:
//! VABB,BOM
//! VAAM,
//! ```
//!
//! - The header is `path[N]{columns}:`. Columns are legend aliases when a
//!   legend is present.
//! - Exactly `N` rows follow, one per record, at the header's indentation.
//! - A row has one field per column. An empty field is `Null`, including a
//!   trailing one.
//! - A row never contains an unquoted `:`; that is how a row is told apart
//!   from the next keyed entry.
//!
//! Fewer rows than declared is a
//! [`RowCountMismatch`](crate::Error::RowCountMismatch); a row with the wrong
//! number of fields is a
//! [`ColumnCountMismatch`](crate::Error::ColumnCountMismatch).
//!
//! # Legend
//!
//! ```text
//! legend:{i:icao,c:city,ia:iata}
//! ```
//!
//! - Only the first line of a document can be a legend, and only when it has
//!   at least one entry. `legend:{}` is the key `legend` holding an empty
//!   object.
//! - Only tabular column keys are aliased.
//! - Each alias is the shortest prefix of its key not already used as an
//!   alias, another column key, or an ordinary key of the same document.
//! - A header id that is neither an alias nor a legend key is an
//!   [`UnknownAlias`](crate::Error::UnknownAlias) error.
//!
//! # Root values
//!
//! | Root | Text |
//! |------|------|
//! | Object | its entries at indent 0 |
//! | Empty object | `{}` |
//! | Array | a header with no key: `[3]:1,2,3`, `[2]{a}:` |
//! | Scalar | the token alone |
//! | Null | empty text |
//!
//! ```rust
//! use toon_legend::{decode, encode, toon};
//!
//! assert_eq!(encode(&toon!([1, 2, 3])).unwrap(), "[3]:1,2,3");
//! assert_eq!(encode(&toon!({})).unwrap(), "{}");
//! assert_eq!(decode("").unwrap(), toon!(null));
//! ```
//!
//! # Limits
//!
//! Nesting is bounded by [`ToonOptions::max_depth`](crate::ToonOptions)
//! (128 by default). Deeper documents are rejected with
//! [`CyclicStructure`](crate::Error::CyclicStructure) when encoding, and with
//! a [`Syntax`](crate::Error::Syntax) error when decoding.
//!
//! # Rust types
//!
//! Through serde:
//!
//! - Unit variants are strings: `sky:Clear`.
//! - Newtype, tuple and struct variants are single-key objects:
//!   `Layers[2]:FEW018,SCT100`.
//! - `Option::None` and `()` are `Null`.
//! - Map keys may be strings, integers or booleans; they are written as
//!   strings.

// Documentation only.
