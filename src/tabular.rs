//! Tabular blocks: arrays of same-shaped records written as one header plus
//! one comma-separated row per record.
//!
//! ```text
//! airports[2]{i,c,a,t}:
//! VABB,Mumbai,Chhatrapati Shivaji Maharaj International Airport,BOM
//! VAAM,Amravati,Amravati Airport,
//! ```
//!
//! The header declares the row count and the column ids (aliases when a
//! legend is active). Rows sit at the header's indentation; a `null` cell is
//! an empty field, so the trailing comma above is the fourth field.
//!
//! An array is written this way only when it is non-empty, every element is
//! an object, all objects have the same keys in the same order, and every
//! value is a scalar. Anything else is written as a nested block.
//!
//! ```rust
//! use toon_legend::tabular::try_encode_array;
//! use toon_legend::legend::Legend;
//! use toon_legend::toon;
//!
//! let rows = toon!([
//!     { "sku": "A1", "qty": 2 },
//!     { "sku": "B2", "qty": 1 }
//! ]);
//! let text = try_encode_array(Some("items"), rows.as_array().unwrap(), &Legend::new());
//! assert_eq!(text.as_deref(), Some("items[2]{sku,qty}:\nA1,2\nB2,1"));
//!
//! let mixed = toon!([{ "sku": "A1" }, 7]);
//! assert!(try_encode_array(Some("items"), mixed.as_array().unwrap(), &Legend::new()).is_none());
//! ```

use crate::de::{classify, Line, LineKind};
use crate::legend::Legend;
use crate::scalar::{find_unquoted, parse_token, split_fields, write_key, write_scalar, DELIMITER};
use crate::{Error, Result, ToonMap, Value};
use std::collections::HashSet;
use tracing::trace;

/// Returns `true` when `items` can be written as a tabular block.
#[must_use]
pub fn is_tabular(items: &[Value]) -> bool {
    let Some(Value::Object(first)) = items.first() else {
        return false;
    };
    !first.is_empty()
        && items.iter().all(|item| match item {
            Value::Object(map) => map.same_layout(first) && map.values().all(Value::is_scalar),
            _ => false,
        })
}

/// An array of records split into shared columns and per-record cells.
#[derive(Clone, Debug, PartialEq)]
pub struct TabularBlock {
    path: Option<String>,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl TabularBlock {
    /// Splits `items` into columns and rows, or returns `None` if the array
    /// is not tabular.
    #[must_use]
    pub fn from_array(path: Option<&str>, items: &[Value]) -> Option<TabularBlock> {
        if !is_tabular(items) {
            return None;
        }
        let columns: Vec<String> = match items.first() {
            Some(Value::Object(first)) => first.keys().cloned().collect(),
            _ => return None,
        };
        let rows = items
            .iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map.values().cloned().collect()),
                _ => None,
            })
            .collect();
        Some(TabularBlock {
            path: path.map(str::to_string),
            columns,
            rows,
        })
    }

    /// Key the block is stored under; `None` for a root array.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Full column keys in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row cells, one `Vec` per record.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends the header and rows. The header starts at the current end of
    /// `out`; each row goes on its own line indented by `indent` spaces.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] if a cell is not a scalar, which
    /// cannot happen for a block built by [`TabularBlock::from_array`].
    pub fn write(&self, out: &mut String, indent: usize, legend: &Legend) -> Result<()> {
        trace!(
            path = self.path.as_deref().unwrap_or(""),
            rows = self.rows.len(),
            columns = self.columns.len(),
            "tabular block"
        );

        if let Some(path) = &self.path {
            write_key(out, path);
        }
        out.push('[');
        out.push_str(&self.rows.len().to_string());
        out.push_str("]{");
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                out.push(DELIMITER);
            }
            write_key(out, legend.alias_for(column));
        }
        out.push_str("}:");

        for row in &self.rows {
            out.push('\n');
            out.extend(std::iter::repeat(' ').take(indent));
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    out.push(DELIMITER);
                }
                write_scalar(out, cell)?;
            }
        }
        Ok(())
    }

    /// Rebuilds the records.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| Value::Object(columns.iter().cloned().zip(row).collect()))
            .collect()
    }
}

/// Encodes `items` as a tabular block at indentation zero, or returns `None`
/// so the caller falls back to nested encoding.
#[must_use]
pub fn try_encode_array(path: Option<&str>, items: &[Value], legend: &Legend) -> Option<String> {
    let block = TabularBlock::from_array(path, items)?;
    let mut out = String::new();
    block.write(&mut out, 0, legend).ok()?;
    Some(out)
}

/// A parsed `path[N]{c1,c2,...}:` line. Column ids are as written, before
/// legend resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct TabularHeader {
    pub path: Option<String>,
    pub count: usize,
    pub columns: Vec<String>,
}

impl TabularHeader {
    /// Parses a header line (without indentation).
    ///
    /// ```rust
    /// use toon_legend::tabular::TabularHeader;
    ///
    /// let header = TabularHeader::parse("airports[139]{i,c,a,t}:", 2).unwrap();
    /// assert_eq!(header.path.as_deref(), Some("airports"));
    /// assert_eq!(header.count, 139);
    /// assert_eq!(header.columns, vec!["i", "c", "a", "t"]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] if the line is not a tabular header.
    pub fn parse(text: &str, line: usize) -> Result<TabularHeader> {
        match classify(text) {
            Ok(LineKind::Header {
                key,
                count,
                columns: Some(columns),
                ..
            }) => Ok(TabularHeader {
                path: key,
                count,
                columns,
            }),
            Ok(_) => Err(Error::syntax_with_context(
                line,
                1,
                "expected a tabular header",
                text,
                Some("write 'name[count]{col1,col2}:'"),
            )),
            Err(msg) => Err(Error::syntax_with_context(line, 1, &msg, text, None)),
        }
    }

    /// Maps column ids to full keys through `legend`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownAlias`] for an id missing from a non-empty legend and
    /// [`Error::Syntax`] when two ids resolve to the same key.
    pub fn resolve_columns(&self, legend: &Legend, line: usize) -> Result<Vec<String>> {
        let mut seen = HashSet::with_capacity(self.columns.len());
        self.columns
            .iter()
            .map(|id| {
                let key = legend.resolve(id, line)?;
                if !seen.insert(key.clone()) {
                    return Err(Error::syntax(
                        line,
                        1,
                        &format!("column '{}' appears twice in header", key),
                    ));
                }
                Ok(key)
            })
            .collect()
    }
}

/// Reads `count` rows that follow a header.
///
/// Returns the records and how many lines were consumed. A line is a row when
/// it is at least as indented as the header and has no unquoted `:`; a blank
/// line is a row only for a single-column block, where it is the all-null
/// record.
pub(crate) fn read_rows(
    lines: &[Line<'_>],
    header: &Line<'_>,
    path: &str,
    columns: &[String],
    count: usize,
) -> Result<(Vec<Value>, usize)> {
    let mut records = Vec::with_capacity(count.min(lines.len()));
    let mut row_indent = None;
    let mut consumed = 0;

    while records.len() < count {
        let Some(line) = lines.get(consumed) else {
            break;
        };
        let is_row = if line.is_blank() {
            columns.len() == 1
        } else {
            line.indent >= header.indent && find_unquoted(line.text, ':').is_none()
        };
        if !is_row {
            break;
        }

        if !line.is_blank() {
            match row_indent {
                None => row_indent = Some(line.indent),
                Some(expected) if expected != line.indent => {
                    return Err(Error::indentation_error(
                        line.number,
                        line.indent + 1,
                        expected,
                        line.indent,
                        line.text,
                    ));
                }
                Some(_) => {}
            }
        }

        let fields = split_fields(line.text);
        if fields.len() != columns.len() {
            return Err(Error::ColumnCountMismatch {
                path: path.to_string(),
                line: line.number,
                expected: columns.len(),
                found: fields.len(),
            });
        }

        let mut record = ToonMap::with_capacity(columns.len());
        for (column, field) in columns.iter().zip(fields) {
            let cell = parse_token(field)
                .map_err(|msg| Error::malformed_row(path, line.number, &msg))?;
            record.insert(column.clone(), cell);
        }
        records.push(Value::Object(record));
        consumed += 1;
    }

    if records.len() < count {
        return Err(Error::RowCountMismatch {
            path: path.to_string(),
            line: header.number,
            expected: count,
            found: records.len(),
        });
    }

    trace!(path, rows = records.len(), "decoded tabular block");
    Ok((records, consumed))
}

/// Decodes one tabular block: `lines[0]` is the header, the rest are rows.
///
/// Lines after the declared row count are ignored.
///
/// ```rust
/// use toon_legend::legend::Legend;
/// use toon_legend::tabular::decode_tabular_block;
/// use toon_legend::Value;
///
/// let legend = Legend::parse("legend:{i:icao,t:iata}", 1).unwrap();
/// let records = decode_tabular_block(&["airports[2]{i,t}:", "VABB,BOM", "VAAM,"], &legend).unwrap();
/// assert_eq!(records[0].pointer("icao").and_then(Value::as_str), Some("VABB"));
/// assert_eq!(records[1].pointer("iata"), Some(&Value::Null));
/// ```
///
/// # Errors
///
/// Any of the row and header errors described in [`crate::Error`].
pub fn decode_tabular_block(lines: &[&str], legend: &Legend) -> Result<Vec<Value>> {
    let lines = lines
        .iter()
        .enumerate()
        .map(|(i, raw)| Line::parse(i + 1, raw))
        .collect::<Result<Vec<_>>>()?;
    let Some((header_line, rows)) = lines.split_first() else {
        return Err(Error::syntax(1, 1, "missing tabular header"));
    };

    let header = TabularHeader::parse(header_line.text, header_line.number)?;
    let columns = header.resolve_columns(legend, header_line.number)?;
    let path = header.path.as_deref().unwrap_or("");
    let (records, _) = read_rows(rows, header_line, path, &columns, header.count)?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toon;

    fn decode(lines: &[&str]) -> Result<Vec<Value>> {
        decode_tabular_block(lines, &Legend::new())
    }

    #[test]
    fn test_eligibility() {
        assert!(is_tabular(toon!([{ "a": 1 }, { "a": null }]).as_array().unwrap()));
        // empty
        assert!(!is_tabular(&[]));
        // empty records
        assert!(!is_tabular(toon!([{}, {}]).as_array().unwrap()));
        // key order differs
        assert!(!is_tabular(
            toon!([{ "a": 1, "b": 2 }, { "b": 2, "a": 1 }]).as_array().unwrap()
        ));
        // missing field
        assert!(!is_tabular(toon!([{ "a": 1, "b": 2 }, { "a": 1 }]).as_array().unwrap()));
        // nested cell
        assert!(!is_tabular(toon!([{ "a": [1] }]).as_array().unwrap()));
        // not all objects
        assert!(!is_tabular(toon!([{ "a": 1 }, "x"]).as_array().unwrap()));
    }

    #[test]
    fn test_write_uses_aliases_and_indent() {
        let rows = toon!([
            { "icao": "VABB", "iata": "BOM" },
            { "icao": "VAAM", "iata": null }
        ]);
        let legend = Legend::parse("legend:{i:icao,ia:iata}", 1).unwrap();
        let block = TabularBlock::from_array(Some("airports"), rows.as_array().unwrap()).unwrap();
        let mut out = String::new();
        block.write(&mut out, 2, &legend).unwrap();
        assert_eq!(out, "airports[2]{i,ia}:\n  VABB,BOM\n  VAAM,");
    }

    #[test]
    fn test_into_values_restores_records() {
        let rows = toon!([{ "a": 1, "b": "x" }, { "a": 2, "b": null }]);
        let block = TabularBlock::from_array(None, rows.as_array().unwrap()).unwrap();
        assert_eq!(block.len(), 2);
        assert_eq!(block.path(), None);
        assert_eq!(Value::Array(block.into_values()), rows);
    }

    #[test]
    fn test_trailing_empty_field_is_null() {
        let records = decode(&["airports[1]{i,c,a,t}:", "VAAM,Amravati,Amravati Airport,"]).unwrap();
        let record = records[0].as_object().unwrap();
        assert_eq!(record.len(), 4);
        assert_eq!(record.get("t"), Some(&Value::Null));
    }

    #[test]
    fn test_row_count_mismatch() {
        let err = decode(&["rows[3]{a,b}:", "1,2", "3,4"]).unwrap_err();
        assert!(matches!(
            err,
            Error::RowCountMismatch { expected: 3, found: 2, line: 1, .. }
        ));

        // a key line ends the rows
        let err = decode(&["rows[3]{a,b}:", "1,2", "3,4", "next:1"]).unwrap_err();
        assert!(matches!(err, Error::RowCountMismatch { found: 2, .. }));
    }

    #[test]
    fn test_column_count_mismatch() {
        let err = decode(&["rows[2]{a,b}:", "1,2", "3"]).unwrap_err();
        assert!(matches!(
            err,
            Error::ColumnCountMismatch { expected: 2, found: 1, line: 3, .. }
        ));
    }

    #[test]
    fn test_malformed_row() {
        let err = decode(&["rows[1]{a,b}:", "1,\"open"]).unwrap_err();
        assert!(matches!(err, Error::MalformedRow { line: 2, .. }));
    }

    #[test]
    fn test_rows_share_one_indent() {
        let err = decode(&["rows[2]{a,b}:", "  1,2", "    3,4"]).unwrap_err();
        assert!(matches!(
            err,
            Error::IndentationError { expected: 2, found: 4, .. }
        ));
        assert_eq!(decode(&["rows[2]{a,b}:", "  1,2", "  3,4"]).unwrap().len(), 2);
    }

    #[test]
    fn test_single_column_null_rows() {
        let records = decode(&["rows[3]{a}:", "x", "", "y"]).unwrap();
        assert_eq!(records[1], toon!({ "a": null }));
        assert_eq!(records[2], toon!({ "a": "y" }));
    }

    #[test]
    fn test_unknown_alias_in_header() {
        let legend = Legend::parse("legend:{i:icao}", 1).unwrap();
        let err = decode_tabular_block(&["rows[1]{i,q}:", "a,b"], &legend).unwrap_err();
        assert!(matches!(err, Error::UnknownAlias { ref alias, .. } if alias == "q"));
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = decode(&["rows[1]{a,a}:", "1,2"]).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn test_header_parse_errors() {
        assert!(TabularHeader::parse("rows[2]:1,2", 1).is_err());
        assert!(TabularHeader::parse("rows[x]{a}:", 1).is_err());
        assert!(TabularHeader::parse("rows[1]{a}", 1).is_err());
    }
}
